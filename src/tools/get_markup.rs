//! Returns the page's serialized markup, truncated

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::Tool;
use crate::outcome::ActionOutcome;
use crate::session::BrowserSession;
use crate::utils::{ActionError, ActionResult};

pub const BROWSER_GET_MARKUP: &str = "browser_get_markup";

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct BrowserGetMarkupArgs {
    /// Maximum characters to return (default from config)
    #[serde(default)]
    pub max_length: Option<usize>,
}

#[derive(Clone)]
pub struct BrowserGetMarkupTool {
    session: BrowserSession,
}

impl BrowserGetMarkupTool {
    pub fn new(session: BrowserSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for BrowserGetMarkupTool {
    type Args = BrowserGetMarkupArgs;

    fn name() -> &'static str {
        BROWSER_GET_MARKUP
    }

    fn description() -> &'static str {
        "Return the current page's HTML, cut at max_length characters with a truncation marker."
    }

    fn read_only() -> bool {
        true
    }

    async fn execute(&self, args: Self::Args) -> ActionResult<ActionOutcome> {
        let max_length = args
            .max_length
            .unwrap_or(self.session.settings().markup_max_length);
        if max_length == 0 {
            return Err(ActionError::validation("max_length must be greater than 0"));
        }

        let markup = self.session.state().get_markup(max_length).await?;
        Ok(ActionOutcome::success(markup))
    }
}
