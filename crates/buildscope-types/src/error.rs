use std::fmt;

use crate::event::ErrorType;
use crate::tree::NodeId;

/// Result type for buildscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared by the types and engine layers
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// A record could not be decoded from JSON
    Json(serde_json::Error),

    /// Configuration error
    Config(String),

    /// Unknown data was encountered while `UnknownDataBehavior::ThrowException` is active
    UnknownData {
        error_type: ErrorType,
        record_kind: String,
        message: String,
    },

    /// A target id was looked up that no prior start event registered
    TargetNotFound { project: i32, id: i32 },

    /// An event referenced a project that was never started
    ProjectNotFound(i32),

    /// A node that already has a parent was attached again
    AlreadyParented { child: NodeId, parent: NodeId },

    /// A node id does not belong to the tree it was used with
    InvalidNode(NodeId),

    /// Unevaluated and evaluated conditions parsed to different shapes
    ConditionShapeMismatch {
        unevaluated: String,
        evaluated: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::UnknownData {
                error_type,
                record_kind,
                message,
            } => write!(
                f,
                "Unknown data ({}) in record '{}': {}",
                error_type, record_kind, message
            ),
            Error::TargetNotFound { project, id } => {
                write!(f, "Target with id {} not found in project {}", id, project)
            }
            Error::ProjectNotFound(id) => write!(f, "Project with id {} was never started", id),
            Error::AlreadyParented { child, parent } => write!(
                f,
                "Node {} already belongs to parent {}",
                child.index(),
                parent.index()
            ),
            Error::InvalidNode(id) => write!(f, "Node {} does not exist", id.index()),
            Error::ConditionShapeMismatch {
                unevaluated,
                evaluated,
            } => write!(
                f,
                "Condition structure mismatch between '{}' and '{}'",
                unevaluated, evaluated
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
