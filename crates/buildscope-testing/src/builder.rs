//! Fluent builder for decoder record streams.

use buildscope_types::*;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

/// Builds a `Vec<LogRecord>` the way a decoder would deliver it.
///
/// Every event advances a virtual clock by a fixed step so durations in
/// rendered trees are stable.
///
/// # Example
/// ```
/// use buildscope_testing::EventStreamBuilder;
///
/// let records = EventStreamBuilder::new()
///     .build_started()
///     .project_started(1, "App.csproj")
///     .target_started(1, 1, "Build")
///     .target_finished(1, 1, "Build", true)
///     .project_finished(1, true)
///     .build_finished(true)
///     .build();
/// assert_eq!(records.len(), 6);
/// ```
pub struct EventStreamBuilder {
    records: Vec<LogRecord>,
    clock: DateTime<Utc>,
    step: Duration,
}

impl Default for EventStreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStreamBuilder {
    /// Clock starts at 2024-01-01T00:00:00Z and advances 100 ms per event.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            clock: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            step: Duration::milliseconds(100),
        }
    }

    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    /// Move the clock without emitting anything
    pub fn advance(mut self, by: Duration) -> Self {
        self.clock += by;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock
    }

    /// Append an event with an explicit context
    pub fn event(mut self, context: impl Into<Option<EventContext>>, payload: EventPayload) -> Self {
        let mut event = BuildEvent::new(self.clock, payload);
        event.context = context.into();
        self.records.push(LogRecord::Event(event));
        self.clock += self.step;
        self
    }

    pub fn record(mut self, record: LogRecord) -> Self {
        self.records.push(record);
        self
    }

    // ==========================================
    // Decoder bookkeeping
    // ==========================================

    pub fn format_version(self, version: u32) -> Self {
        self.record(LogRecord::FormatVersion { version })
    }

    pub fn strings<I, S>(self, strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record(LogRecord::Strings {
            strings: strings.into_iter().map(Into::into).collect(),
        })
    }

    /// A record the decoder could not interpret
    pub fn unknown_record(self, record_kind: &str) -> Self {
        self.record(LogRecord::RecoverableError(RecoverableReadError::new(
            ErrorType::UnknownEventData,
            record_kind,
            format!("record kind {} is not known to this reader", record_kind),
        )))
    }

    // ==========================================
    // Scopes
    // ==========================================

    pub fn build_started(self) -> Self {
        self.event(None, EventPayload::BuildStarted)
    }

    pub fn build_finished(self, succeeded: bool) -> Self {
        self.event(
            None,
            EventPayload::BuildFinished(BuildFinishedPayload { succeeded }),
        )
    }

    pub fn project_started(self, project: i32, name: &str) -> Self {
        self.project_started_in(project, None, name)
    }

    /// Project started by another project
    pub fn project_started_in(self, project: i32, parent: Option<i32>, name: &str) -> Self {
        self.event(
            EventContext::project(project),
            EventPayload::ProjectStarted(ProjectStartedPayload {
                name: name.to_string(),
                project_file: format!("/src/{}", name),
                parent_project_id: parent,
                target_names: None,
            }),
        )
    }

    pub fn project_finished(self, project: i32, succeeded: bool) -> Self {
        self.event(
            EventContext::project(project),
            EventPayload::ProjectFinished(ProjectFinishedPayload { succeeded }),
        )
    }

    pub fn target_started(self, project: i32, target: i32, name: &str) -> Self {
        self.event(
            EventContext::target(project, target),
            EventPayload::TargetStarted(TargetStartedPayload {
                name: name.to_string(),
                parent_target: None,
            }),
        )
    }

    pub fn target_finished(self, project: i32, target: i32, name: &str, succeeded: bool) -> Self {
        self.event(
            EventContext::target(project, target),
            EventPayload::TargetFinished(TargetFinishedPayload {
                name: name.to_string(),
                succeeded,
            }),
        )
    }

    pub fn target_skipped(self, project: i32, name: &str, reason: &str) -> Self {
        self.event(
            EventContext::project(project),
            EventPayload::TargetSkipped(TargetSkippedPayload {
                name: name.to_string(),
                reason: Some(reason.to_string()),
            }),
        )
    }

    pub fn task_started(self, project: i32, target: i32, task: i32, name: &str) -> Self {
        self.event(
            EventContext::task(project, target, task),
            EventPayload::TaskStarted(TaskStartedPayload {
                name: name.to_string(),
                from_assembly: None,
            }),
        )
    }

    pub fn task_command_line(self, project: i32, target: i32, task: i32, command_line: &str) -> Self {
        self.event(
            EventContext::task(project, target, task),
            EventPayload::TaskCommandLine(TaskCommandLinePayload {
                command_line: command_line.to_string(),
            }),
        )
    }

    pub fn task_finished(self, project: i32, target: i32, task: i32, name: &str, succeeded: bool) -> Self {
        self.event(
            EventContext::task(project, target, task),
            EventPayload::TaskFinished(TaskFinishedPayload {
                name: name.to_string(),
                succeeded,
            }),
        )
    }

    // ==========================================
    // Diagnostics
    // ==========================================

    pub fn message(self, context: impl Into<Option<EventContext>>, text: &str) -> Self {
        self.event(context, EventPayload::Message(DiagnosticPayload::text(text)))
    }

    pub fn low_message(self, context: impl Into<Option<EventContext>>, text: &str) -> Self {
        let payload = DiagnosticPayload {
            importance: Some(MessageImportance::Low),
            ..DiagnosticPayload::text(text)
        };
        self.event(context, EventPayload::Message(payload))
    }

    pub fn warning(self, context: impl Into<Option<EventContext>>, text: &str) -> Self {
        self.event(context, EventPayload::Warning(DiagnosticPayload::text(text)))
    }

    pub fn error(self, context: impl Into<Option<EventContext>>, text: &str) -> Self {
        self.event(context, EventPayload::Error(DiagnosticPayload::text(text)))
    }

    pub fn custom(self, data: Value) -> Self {
        self.event(None, EventPayload::Custom(OpaquePayload { data }))
    }

    // ==========================================
    // Output
    // ==========================================

    pub fn build(self) -> Vec<LogRecord> {
        self.records
    }

    /// One JSON object per line, as read by the CLI
    pub fn to_jsonl(&self) -> String {
        self.records
            .iter()
            .filter_map(|r| serde_json::to_string(r).ok())
            .map(|line| line + "\n")
            .collect()
    }
}
