//! Drags one element (or point) onto another

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{TargetArgs, Tool};
use crate::outcome::ActionOutcome;
use crate::session::BrowserSession;
use crate::utils::{ActionError, ActionResult};

pub const BROWSER_DRAG_AND_DROP: &str = "browser_drag_and_drop";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BrowserDragAndDropArgs {
    /// What to pick up
    pub source: TargetArgs,

    /// Where to release it
    pub destination: TargetArgs,
}

/// Name the side a validation error belongs to
fn for_side(side: &str, err: ActionError) -> ActionError {
    match err {
        ActionError::Validation(message) => ActionError::validation(format!("{}: {}", side, message)),
        other => other,
    }
}

#[derive(Clone)]
pub struct BrowserDragAndDropTool {
    session: BrowserSession,
}

impl BrowserDragAndDropTool {
    pub fn new(session: BrowserSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for BrowserDragAndDropTool {
    type Args = BrowserDragAndDropArgs;

    fn name() -> &'static str {
        BROWSER_DRAG_AND_DROP
    }

    fn description() -> &'static str {
        "Press the mouse on a source, move it to a destination and release. \
         Each side is a target object: {\"target\": text}, {\"selector\": css} or {\"x\", \"y\"}."
    }

    fn read_only() -> bool {
        false
    }

    async fn execute(&self, args: Self::Args) -> ActionResult<ActionOutcome> {
        let source = args
            .source
            .to_descriptor()
            .map_err(|e| for_side("source", e))?;
        let destination = args
            .destination
            .to_descriptor()
            .map_err(|e| for_side("destination", e))?;

        Ok(self
            .session
            .executor()
            .drag_and_drop(&source, &destination)
            .await)
    }
}
