//! Uniform result of every action

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resolver::Strategy;
use crate::utils::ActionError;

/// Prefix every failure string starts with
pub const FAILURE_PREFIX: &str = "Error: ";

/// What the planner gets back from one action
///
/// Built once per invocation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_used: Option<Strategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<String>,
}

impl ActionOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            strategy_used: None,
            artifact_path: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            strategy_used: None,
            artifact_path: None,
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy_used = Some(strategy);
        self
    }

    pub fn with_artifact(mut self, path: impl Into<String>) -> Self {
        self.artifact_path = Some(path.into());
        self
    }
}

impl From<ActionError> for ActionOutcome {
    fn from(err: ActionError) -> Self {
        ActionOutcome::failure(err.to_string())
    }
}

impl<E: Into<ActionError>> From<Result<ActionOutcome, E>> for ActionOutcome {
    fn from(result: Result<ActionOutcome, E>) -> Self {
        result.unwrap_or_else(|err| ActionOutcome::from(err.into()))
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.success {
            return write!(f, "{}{}", FAILURE_PREFIX, self.message);
        }
        f.write_str(&self.message)?;
        if let Some(strategy) = self.strategy_used {
            write!(f, " [strategy: {}]", strategy)?;
        }
        if let Some(path) = &self.artifact_path {
            write!(f, " (saved to {})", path)?;
        }
        Ok(())
    }
}
