//! Sets a form field's value in one step

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{Tool, require_text};
use crate::outcome::ActionOutcome;
use crate::session::BrowserSession;
use crate::utils::ActionResult;

pub const BROWSER_FILL: &str = "browser_fill";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BrowserFillArgs {
    /// CSS selector of an input, textarea or contenteditable element
    pub selector: String,

    /// Replaces the field's current value; may be empty to clear it
    pub text: String,
}

#[derive(Clone)]
pub struct BrowserFillTool {
    session: BrowserSession,
}

impl BrowserFillTool {
    pub fn new(session: BrowserSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for BrowserFillTool {
    type Args = BrowserFillArgs;

    fn name() -> &'static str {
        BROWSER_FILL
    }

    fn description() -> &'static str {
        "Set the value of a form field found by CSS selector, firing input and change events. \
         Faster than browser_type_text, but skips per-key handlers such as autocomplete."
    }

    fn read_only() -> bool {
        false
    }

    async fn execute(&self, args: Self::Args) -> ActionResult<ActionOutcome> {
        let selector = require_text("selector", &args.selector)?;
        Ok(self.session.executor().fill(selector, &args.text).await)
    }
}
