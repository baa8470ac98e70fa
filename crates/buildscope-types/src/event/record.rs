use serde::{Deserialize, Serialize};
use std::fmt;

use super::event::BuildEvent;

/// Format version from which producers deduplicate strings and normalize
/// line endings themselves.
pub const NORMALIZED_STRINGS_FORMAT_VERSION: u32 = 10;

/// Category of a record the decoder could not fully interpret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The container declares a format version newer than the decoder
    UnsupportedFileFormatVersion,
    /// The record kind itself is unknown
    UnknownEventData,
    /// The record kind is known but its layout is not
    UnknownFormatOfEventData,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorType::UnsupportedFileFormatVersion => write!(f, "unsupported file format version"),
            ErrorType::UnknownEventData => write!(f, "unknown event data"),
            ErrorType::UnknownFormatOfEventData => write!(f, "unknown format of event data"),
        }
    }
}

/// Report of a record that was skipped while decoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverableReadError {
    pub error_type: ErrorType,
    pub record_kind: String,
    pub message: String,
}

impl RecoverableReadError {
    pub fn new(
        error_type: ErrorType,
        record_kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error_type,
            record_kind: record_kind.into(),
            message: message.into(),
        }
    }
}

/// One item of the decoder output stream.
///
/// Besides build events the decoder reports its own progress: the producer's
/// format version, the complete string dictionary, and records it skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "record")]
#[serde(rename_all = "snake_case")]
pub enum LogRecord {
    Event(BuildEvent),
    FormatVersion { version: u32 },
    Strings { strings: Vec<String> },
    RecoverableError(RecoverableReadError),
}

impl From<BuildEvent> for LogRecord {
    fn from(event: BuildEvent) -> Self {
        LogRecord::Event(event)
    }
}

impl From<RecoverableReadError> for LogRecord {
    fn from(err: RecoverableReadError) -> Self {
        LogRecord::RecoverableError(err)
    }
}

/// Values of the `record` tag this reader understands
pub const RECORD_KINDS: &[&str] = &["event", "format_version", "strings", "recoverable_error"];

/// Parse a JSON Lines document into records. Blank lines are skipped.
///
/// Only text that is not JSON at all is an error. A line whose `record` tag
/// is unknown, or whose fields do not match the known layout, becomes a
/// `RecoverableError` so the unknown-data policy decides what happens to it.
pub fn parse_records(input: &str) -> crate::Result<Vec<LogRecord>> {
    input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_record_line)
        .collect()
}

fn parse_record_line(line: &str) -> crate::Result<LogRecord> {
    let value: serde_json::Value = serde_json::from_str(line)?;
    let record = LogRecord::deserialize(&value)
        .unwrap_or_else(|err| LogRecord::RecoverableError(classify_unreadable(&value, &err)));
    Ok(record)
}

fn classify_unreadable(value: &serde_json::Value, err: &serde_json::Error) -> RecoverableReadError {
    let tag = value.get("record").and_then(serde_json::Value::as_str);
    match tag {
        Some(kind) if RECORD_KINDS.contains(&kind) => {
            // Known record: name the event type when there is one
            let kind = match kind {
                "event" => value
                    .get("type")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or(kind),
                other => other,
            };
            RecoverableReadError::new(ErrorType::UnknownFormatOfEventData, kind, err.to_string())
        }
        Some(kind) => RecoverableReadError::new(
            ErrorType::UnknownEventData,
            kind,
            format!("record kind {} is not known to this reader", kind),
        ),
        None => RecoverableReadError::new(ErrorType::UnknownEventData, "", err.to_string()),
    }
}
