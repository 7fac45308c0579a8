//! Lists visible interactive elements so the planner can pick a target

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::Tool;
use crate::outcome::ActionOutcome;
use crate::session::BrowserSession;
use crate::utils::ActionResult;

pub const BROWSER_LIST_ELEMENTS: &str = "browser_list_elements";

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct BrowserListElementsArgs {}

#[derive(Clone)]
pub struct BrowserListElementsTool {
    session: BrowserSession,
}

impl BrowserListElementsTool {
    pub fn new(session: BrowserSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for BrowserListElementsTool {
    type Args = BrowserListElementsArgs;

    fn name() -> &'static str {
        BROWSER_LIST_ELEMENTS
    }

    fn description() -> &'static str {
        "List the visible links, buttons and other clickable elements on the current page, \
         with their text, role, a selector and centre coordinates."
    }

    fn read_only() -> bool {
        true
    }

    async fn execute(&self, _args: Self::Args) -> ActionResult<ActionOutcome> {
        let elements = self.session.state().list_interactive_elements().await;
        if elements.is_empty() {
            return Ok(ActionOutcome::success("No visible interactive elements found"));
        }

        let listing = serde_json::to_string_pretty(&elements)?;
        Ok(ActionOutcome::success(format!(
            "Found {} interactive elements:\n{}",
            elements.len(),
            listing
        )))
    }
}
