use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payload::EventPayload;

#[cfg(test)]
use super::payload::DiagnosticPayload;

// NOTE: Correlation model
//
// Events carry no pointers to each other. Everything is tied together through
// small integer ids in `EventContext`:
// - project_id is unique per build (one per project instance)
// - target_id / task_id are only unique inside their project
// - node_id names the worker process that produced the event
//
// A started event of a scope owns the id in the matching context slot:
// project_started -> project_id, target_started -> target_id,
// task_started -> task_id. Finished events and diagnostics reuse the ids of
// the scopes they belong to.

/// Correlation ids attached to an event by the producer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    /// Worker node (process) that produced the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i32>,
}

impl EventContext {
    pub fn project(project_id: i32) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    pub fn target(project_id: i32, target_id: i32) -> Self {
        Self {
            project_id: Some(project_id),
            target_id: Some(target_id),
            ..Self::default()
        }
    }

    pub fn task(project_id: i32, target_id: i32, task_id: i32) -> Self {
        Self {
            project_id: Some(project_id),
            target_id: Some(target_id),
            task_id: Some(task_id),
            ..Self::default()
        }
    }

    pub fn with_node(mut self, node_id: i32) -> Self {
        self.node_id = Some(node_id);
        self
    }
}

/// One build lifecycle event, as delivered by the log decoder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildEvent {
    /// Event timestamp (UTC)
    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<EventContext>,

    /// Event type and content (flattened enum)
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl BuildEvent {
    pub fn new(timestamp: DateTime<Utc>, payload: EventPayload) -> Self {
        Self {
            timestamp,
            context: None,
            payload,
        }
    }

    pub fn with_context(mut self, context: EventContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn project_id(&self) -> Option<i32> {
        self.context.and_then(|c| c.project_id)
    }

    pub fn target_id(&self) -> Option<i32> {
        self.context.and_then(|c| c.target_id)
    }

    pub fn task_id(&self) -> Option<i32> {
        self.context.and_then(|c| c.task_id)
    }

    pub fn node_id(&self) -> Option<i32> {
        self.context.and_then(|c| c.node_id)
    }
}
