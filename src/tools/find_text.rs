//! Finds rendered elements containing a piece of text

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{Tool, require_text};
use crate::outcome::ActionOutcome;
use crate::session::BrowserSession;
use crate::utils::ActionResult;

pub const BROWSER_FIND_TEXT: &str = "browser_find_text";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BrowserFindTextArgs {
    /// Text to look for, case-insensitive
    pub text: String,
}

#[derive(Clone)]
pub struct BrowserFindTextTool {
    session: BrowserSession,
}

impl BrowserFindTextTool {
    pub fn new(session: BrowserSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for BrowserFindTextTool {
    type Args = BrowserFindTextArgs;

    fn name() -> &'static str {
        BROWSER_FIND_TEXT
    }

    fn description() -> &'static str {
        "Find visible elements whose text contains the given string (case-insensitive), \
         in document order, with a selector hint and centre coordinates for each."
    }

    fn read_only() -> bool {
        true
    }

    async fn execute(&self, args: Self::Args) -> ActionResult<ActionOutcome> {
        let text = require_text("text", &args.text)?;
        let matches = self.session.state().find_elements_containing_text(text).await;
        if matches.is_empty() {
            return Ok(ActionOutcome::success(format!(
                "No visible elements contain '{}'",
                text
            )));
        }

        let listing = serde_json::to_string_pretty(&matches)?;
        Ok(ActionOutcome::success(format!(
            "Found {} elements containing '{}':\n{}",
            matches.len(),
            text,
            listing
        )))
    }
}
