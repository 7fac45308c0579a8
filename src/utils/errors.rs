use std::path::PathBuf;

use thiserror::Error;

use crate::page::DriverError;
use crate::resolver::ResolutionError;

/// Every way an action can fail before it reaches the planner
///
/// The dispatcher turns each variant into a failed `ActionOutcome`; none of
/// them escape as a panic or a raised error.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Invalid arguments: {0}")]
    Validation(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("{action} on '{target}' failed: {cause}")]
    Execution {
        action: &'static str,
        target: String,
        cause: String,
    },

    #[error("Failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ActionError {
    pub fn validation(message: impl Into<String>) -> Self {
        ActionError::Validation(message.into())
    }

    pub fn execution(action: &'static str, target: impl Into<String>, cause: DriverError) -> Self {
        ActionError::Execution {
            action,
            target: target.into(),
            cause: cause.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ActionError::Io {
            path: path.into(),
            source,
        }
    }

    /// Short machine-readable kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ActionError::Validation(_) => "validation",
            ActionError::Resolution(_) => "resolution",
            ActionError::Execution { .. } => "execution",
            ActionError::Encode(_) => "encode",
            ActionError::Io { .. } => "io",
        }
    }
}

pub type ActionResult<T> = Result<T, ActionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_message_names_target_and_cause() {
        let err = ActionError::execution(
            "click",
            "Submit",
            DriverError::Detached("[data-kodegen-ref=\"3\"]".into()),
        );
        let message = err.to_string();
        assert!(message.contains("'Submit'"));
        assert!(message.contains("no longer attached"));
        assert_eq!(err.kind(), "execution");
    }

    #[test]
    fn encode_failures_convert_with_question_mark() {
        fn encode() -> ActionResult<String> {
            let keyed_by_point = std::collections::BTreeMap::from([((1u8, 2u8), 3u8)]);
            Ok(serde_json::to_string_pretty(&keyed_by_point)?)
        }
        let err = encode().unwrap_err();
        assert_eq!(err.kind(), "encode");
        assert!(err.to_string().starts_with("Failed to encode result: "));
    }

    #[test]
    fn io_message_includes_path() {
        let err = ActionError::io(
            "/tmp/shots/a.png",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/shots/a.png"));
    }
}
