//! Mouse-wheel scrolling at the viewport centre

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::Tool;
use crate::outcome::ActionOutcome;
use crate::session::BrowserSession;
use crate::utils::ActionResult;

pub const BROWSER_SCROLL: &str = "browser_scroll";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BrowserScrollArgs {
    /// Vertical pixels; positive scrolls down
    pub delta_y: f64,

    /// Horizontal pixels; positive scrolls right
    #[serde(default)]
    pub delta_x: f64,
}

#[derive(Clone)]
pub struct BrowserScrollTool {
    session: BrowserSession,
}

impl BrowserScrollTool {
    pub fn new(session: BrowserSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for BrowserScrollTool {
    type Args = BrowserScrollArgs;

    fn name() -> &'static str {
        BROWSER_SCROLL
    }

    fn description() -> &'static str {
        "Scroll the page with the mouse wheel. Each delta is clamped to 10000 pixels."
    }

    fn read_only() -> bool {
        false
    }

    async fn execute(&self, args: Self::Args) -> ActionResult<ActionOutcome> {
        Ok(self
            .session
            .executor()
            .scroll(args.delta_x, args.delta_y)
            .await)
    }
}
