//! Browser click tool - clicks an element by text, selector or coordinates

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{TargetArgs, Tool};
use crate::outcome::ActionOutcome;
use crate::session::BrowserSession;
use crate::utils::{ActionResult, validate_interaction_timeout};

pub const BROWSER_CLICK: &str = "browser_click";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BrowserClickArgs {
    #[serde(flatten)]
    pub target: TargetArgs,

    /// Deadline for each browser call in milliseconds (max 30000)
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Clone)]
pub struct BrowserClickTool {
    session: BrowserSession,
}

impl BrowserClickTool {
    pub fn new(session: BrowserSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for BrowserClickTool {
    type Args = BrowserClickArgs;

    fn name() -> &'static str {
        BROWSER_CLICK
    }

    fn description() -> &'static str {
        "Click an element. Give visible text (\"target\": \"Sign in\"), a CSS selector \
         (\"selector\": \"#submit\") or viewport coordinates (\"x\", \"y\"). \
         Text is matched against buttons first, then links, then exact text."
    }

    fn read_only() -> bool {
        false
    }

    async fn execute(&self, args: Self::Args) -> ActionResult<ActionOutcome> {
        let target = args.target.to_descriptor()?;
        let executor = self.session.executor();

        // Only a caller-supplied deadline is checked against the cap
        match args.timeout_ms {
            Some(ms) => {
                let timeout = validate_interaction_timeout(Some(ms), ms)?;
                Ok(executor.with_timeout(timeout).click(&target).await)
            }
            None => Ok(executor.click(&target).await),
        }
    }
}
