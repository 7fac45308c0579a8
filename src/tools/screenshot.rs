//! Browser screenshot tool - saves the viewport as a PNG file

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::Tool;
use crate::outcome::ActionOutcome;
use crate::session::BrowserSession;
use crate::utils::ActionResult;

pub const BROWSER_SCREENSHOT: &str = "browser_screenshot";

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct BrowserScreenshotArgs {
    /// File name hint; ".png" is added if missing
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct BrowserScreenshotTool {
    session: BrowserSession,
}

impl BrowserScreenshotTool {
    pub fn new(session: BrowserSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for BrowserScreenshotTool {
    type Args = BrowserScreenshotArgs;

    fn name() -> &'static str {
        BROWSER_SCREENSHOT
    }

    fn description() -> &'static str {
        "Capture the visible viewport as a PNG and return the saved file path. \
         Existing files are never overwritten."
    }

    fn read_only() -> bool {
        true
    }

    async fn execute(&self, args: Self::Args) -> ActionResult<ActionOutcome> {
        Ok(self
            .session
            .executor()
            .screenshot(args.name.as_deref())
            .await)
    }
}
