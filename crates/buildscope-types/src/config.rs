use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Policy for records the reader could not fully interpret.
///
/// Logs written by a newer producer may contain record kinds this reader
/// does not know. The policy decides how loudly that is reported:
/// - `Error` / `Warning` / `Message`: keep reading, then add one summary node
///   of that severity to the build root
/// - `Ignore`: keep reading, leave no trace in the tree
/// - `ThrowException`: abort on the first unknown record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownDataBehavior {
    Error,
    #[default]
    Warning,
    Message,
    Ignore,
    ThrowException,
}

impl fmt::Display for UnknownDataBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownDataBehavior::Error => write!(f, "error"),
            UnknownDataBehavior::Warning => write!(f, "warning"),
            UnknownDataBehavior::Message => write!(f, "message"),
            UnknownDataBehavior::Ignore => write!(f, "ignore"),
            UnknownDataBehavior::ThrowException => write!(f, "throw_exception"),
        }
    }
}

impl FromStr for UnknownDataBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "error" => Ok(UnknownDataBehavior::Error),
            "warning" => Ok(UnknownDataBehavior::Warning),
            "message" => Ok(UnknownDataBehavior::Message),
            "ignore" => Ok(UnknownDataBehavior::Ignore),
            "throw_exception" | "throw" => Ok(UnknownDataBehavior::ThrowException),
            other => Err(format!("unknown data behavior: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_behavior() {
        assert_eq!(
            "Warning".parse::<UnknownDataBehavior>(),
            Ok(UnknownDataBehavior::Warning)
        );
        assert_eq!(
            "throw-exception".parse::<UnknownDataBehavior>(),
            Ok(UnknownDataBehavior::ThrowException)
        );
        assert!("loud".parse::<UnknownDataBehavior>().is_err());
    }

    #[test]
    fn test_behavior_serde_roundtrip_names() {
        let json = serde_json::to_string(&UnknownDataBehavior::ThrowException).unwrap();
        assert_eq!(json, "\"throw_exception\"");
        let parsed: UnknownDataBehavior = serde_json::from_str("\"ignore\"").unwrap();
        assert_eq!(parsed, UnknownDataBehavior::Ignore);
    }
}
