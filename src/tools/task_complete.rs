//! Signals the planner loop that the task is done

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{Tool, require_text};
use crate::outcome::ActionOutcome;
use crate::utils::ActionResult;

pub const BROWSER_TASK_COMPLETE: &str = "browser_task_complete";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BrowserTaskCompleteArgs {
    /// What was accomplished
    pub summary: String,
}

#[derive(Clone, Copy, Default)]
pub struct BrowserTaskCompleteTool;

#[async_trait]
impl Tool for BrowserTaskCompleteTool {
    type Args = BrowserTaskCompleteArgs;

    fn name() -> &'static str {
        BROWSER_TASK_COMPLETE
    }

    fn description() -> &'static str {
        "Finish the task and report a summary. No further actions run after this."
    }

    fn read_only() -> bool {
        true
    }

    fn terminal() -> bool {
        true
    }

    async fn execute(&self, args: Self::Args) -> ActionResult<ActionOutcome> {
        let summary = require_text("summary", &args.summary)?;
        Ok(ActionOutcome::success(format!("Task complete: {}", summary)))
    }
}
