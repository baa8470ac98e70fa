use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use super::render::duration_text;
use crate::event::MessageImportance;

/// Id given to targets that were referenced by name but never seen starting.
pub const UNSTARTED_ID: i32 = -1;

/// Common data of Build, Project, Target and Task nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedNode {
    /// Correlation id, only unique inside the enclosing scope
    pub id: i32,
    /// Worker node that produced the start event
    pub node_id: i32,
    pub name: Arc<str>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl TimedNode {
    pub fn new(id: i32, name: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            node_id: 0,
            name: name.into(),
            start_time: None,
            end_time: None,
        }
    }

    pub fn is_started(&self) -> bool {
        self.id != UNSTARTED_ID
    }

    /// A node without an end time has not finished (or the log was cut short)
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn duration(&self) -> Option<Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if end >= start => Some(end - start),
            _ => None,
        }
    }

    pub fn duration_text(&self) -> Option<String> {
        self.duration().map(duration_text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildNode {
    pub timed: TimedNode,
    pub succeeded: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectNode {
    pub timed: TimedNode,
    pub project_file: Arc<str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_names: Option<Arc<str>>,
    pub succeeded: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetNode {
    pub timed: TimedNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_target: Option<Arc<str>>,
    pub succeeded: Option<bool>,
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskNode {
    pub timed: TimedNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_assembly: Option<Arc<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_line: Option<Arc<str>>,
    pub succeeded: Option<bool>,
}

/// Message, warning or error leaf
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticNode {
    pub text: Arc<str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Arc<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<Arc<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub importance: MessageImportance,
    pub timestamp: Option<DateTime<Utc>>,
}

impl DiagnosticNode {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            code: None,
            file: None,
            line: None,
            column: None,
            importance: MessageImportance::Normal,
            timestamp: None,
        }
    }

    /// `file(line,column): severity code: text`, the canonical compiler form
    fn canonical(&self, severity: &str) -> String {
        let mut out = String::new();
        if let Some(file) = &self.file {
            out.push_str(file);
            match (self.line, self.column) {
                (Some(line), Some(column)) => out.push_str(&format!("({},{})", line, column)),
                (Some(line), None) => out.push_str(&format!("({})", line)),
                _ => {}
            }
            out.push_str(": ");
        }
        out.push_str(severity);
        if let Some(code) = &self.code {
            out.push(' ');
            out.push_str(code);
        }
        out.push_str(": ");
        out.push_str(&self.text);
        out
    }
}

/// Closed set of node kinds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Build(BuildNode),
    Project(ProjectNode),
    Target(TargetNode),
    Task(TaskNode),
    Message(DiagnosticNode),
    Warning(DiagnosticNode),
    Error(DiagnosticNode),
}

impl NodeKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::Build(_) => "Build",
            NodeKind::Project(_) => "Project",
            NodeKind::Target(_) => "Target",
            NodeKind::Task(_) => "Task",
            NodeKind::Message(_) => "Message",
            NodeKind::Warning(_) => "Warning",
            NodeKind::Error(_) => "Error",
        }
    }

    pub fn timed(&self) -> Option<&TimedNode> {
        match self {
            NodeKind::Build(n) => Some(&n.timed),
            NodeKind::Project(n) => Some(&n.timed),
            NodeKind::Target(n) => Some(&n.timed),
            NodeKind::Task(n) => Some(&n.timed),
            NodeKind::Message(_) | NodeKind::Warning(_) | NodeKind::Error(_) => None,
        }
    }

    pub fn timed_mut(&mut self) -> Option<&mut TimedNode> {
        match self {
            NodeKind::Build(n) => Some(&mut n.timed),
            NodeKind::Project(n) => Some(&mut n.timed),
            NodeKind::Target(n) => Some(&mut n.timed),
            NodeKind::Task(n) => Some(&mut n.timed),
            NodeKind::Message(_) | NodeKind::Warning(_) | NodeKind::Error(_) => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&DiagnosticNode> {
        match self {
            NodeKind::Message(d) | NodeKind::Warning(d) | NodeKind::Error(d) => Some(d),
            _ => None,
        }
    }

    /// Name of timed nodes; diagnostics have none
    pub fn name(&self) -> Option<&str> {
        self.timed().map(|t| t.name.as_ref())
    }

    pub fn is_open(&self) -> bool {
        self.timed().is_some_and(TimedNode::is_open)
    }

    pub fn duration_text(&self) -> Option<String> {
        self.timed().and_then(TimedNode::duration_text)
    }

    /// Short label used by tree views and breadcrumbs
    pub fn title(&self) -> String {
        match self {
            NodeKind::Build(b) => match b.succeeded {
                Some(true) => "Build succeeded".to_string(),
                Some(false) => "Build failed".to_string(),
                None => "Build".to_string(),
            },
            NodeKind::Project(p) => p.timed.name.to_string(),
            NodeKind::Target(t) if t.skipped => format!("{} (skipped)", t.timed.name),
            NodeKind::Target(t) => t.timed.name.to_string(),
            NodeKind::Task(t) => t.timed.name.to_string(),
            NodeKind::Message(m) => m.text.to_string(),
            NodeKind::Warning(w) => w.canonical("warning"),
            NodeKind::Error(e) => e.canonical("error"),
        }
    }

    /// Calls `f` on every string held by the node
    pub fn for_each_string_mut(&mut self, f: &mut dyn FnMut(&mut Arc<str>)) {
        fn opt(value: &mut Option<Arc<str>>, f: &mut dyn FnMut(&mut Arc<str>)) {
            if let Some(s) = value {
                f(s);
            }
        }

        match self {
            NodeKind::Build(b) => f(&mut b.timed.name),
            NodeKind::Project(p) => {
                f(&mut p.timed.name);
                f(&mut p.project_file);
                opt(&mut p.target_names, f);
            }
            NodeKind::Target(t) => {
                f(&mut t.timed.name);
                opt(&mut t.parent_target, f);
                opt(&mut t.skip_reason, f);
            }
            NodeKind::Task(t) => {
                f(&mut t.timed.name);
                opt(&mut t.from_assembly, f);
                opt(&mut t.command_line, f);
            }
            NodeKind::Message(d) | NodeKind::Warning(d) | NodeKind::Error(d) => {
                f(&mut d.text);
                opt(&mut d.code, f);
                opt(&mut d.file, f);
            }
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Build(_) => write!(f, "{}", self.title()),
            NodeKind::Project(p) => {
                write!(f, "Project Name={} File={}", p.timed.name, p.project_file)
            }
            NodeKind::Target(t) => write!(f, "Target Name={}", t.timed.name),
            NodeKind::Task(t) => write!(f, "Task Name={}", t.timed.name),
            NodeKind::Message(_) | NodeKind::Warning(_) | NodeKind::Error(_) => {
                write!(f, "{}", self.title())
            }
        }
    }
}
