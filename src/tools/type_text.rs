//! Types text key by key, optionally into a resolved target

use std::time::Duration;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{TargetArgs, Tool};
use crate::outcome::ActionOutcome;
use crate::session::BrowserSession;
use crate::utils::constants::MAX_TYPE_DELAY_MS;
use crate::utils::{ActionError, ActionResult};

pub const BROWSER_TYPE_TEXT: &str = "browser_type_text";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BrowserTypeTextArgs {
    /// Element to focus first; omit to type into the focused element
    #[serde(flatten)]
    pub target: TargetArgs,

    /// Text to type, one key press per character
    pub text: String,

    /// Pause between key presses in milliseconds (max 1000)
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

#[derive(Clone)]
pub struct BrowserTypeTextTool {
    session: BrowserSession,
}

impl BrowserTypeTextTool {
    pub fn new(session: BrowserSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for BrowserTypeTextTool {
    type Args = BrowserTypeTextArgs;

    fn name() -> &'static str {
        BROWSER_TYPE_TEXT
    }

    fn description() -> &'static str {
        "Type text one key at a time, like a user would. Optionally give a target \
         (\"target\", \"selector\" or \"x\"/\"y\") to focus first. Triggers key handlers \
         such as autocomplete; use browser_fill to set a value directly."
    }

    fn read_only() -> bool {
        false
    }

    async fn execute(&self, args: Self::Args) -> ActionResult<ActionOutcome> {
        if args.text.is_empty() {
            return Err(ActionError::validation("text cannot be empty"));
        }
        let delay = match args.delay_ms {
            Some(ms) if ms > MAX_TYPE_DELAY_MS => {
                return Err(ActionError::validation(format!(
                    "delay_ms cannot exceed {}ms. Received: {}ms",
                    MAX_TYPE_DELAY_MS, ms
                )));
            }
            Some(ms) => Duration::from_millis(ms),
            None => self.session.settings().type_delay,
        };
        let target = args.target.to_optional_descriptor()?;

        Ok(self
            .session
            .executor()
            .type_text(target.as_ref(), &args.text, delay)
            .await)
    }
}
