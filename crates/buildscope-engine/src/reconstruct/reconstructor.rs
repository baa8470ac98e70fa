use buildscope_types::*;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use super::ReconstructOptions;
use super::unknown::UnknownDataTally;
use crate::registry::IdentifierRegistry;
use crate::strings::StringTable;

/// Event-routing state machine that folds a flat event stream into a tree.
///
/// Started events open nodes and register them with their project's
/// `IdentifierRegistry`; finished events resolve their ids and stamp end
/// times; diagnostics attach to the narrowest scope their context names.
/// The partially built tree is valid at any point (`tree()`).
pub struct Reconstructor {
    options: ReconstructOptions,
    tree: Tree,
    strings: StringTable,
    /// Keyed by project id, in start order
    registries: HashMap<i32, IdentifierRegistry>,
    project_order: Vec<i32>,
    /// Nodes started but not finished, innermost last
    open: Vec<NodeId>,
    unknown: UnknownDataTally,
    format_version: Option<u32>,
    events: usize,
}

impl Default for Reconstructor {
    fn default() -> Self {
        Self::new(ReconstructOptions::default())
    }
}

impl Reconstructor {
    pub fn new(options: ReconstructOptions) -> Self {
        let root = NodeKind::Build(BuildNode {
            timed: TimedNode::new(0, "Build"),
            succeeded: None,
        });
        Self {
            options,
            tree: Tree::new(root),
            strings: StringTable::new(),
            registries: HashMap::new(),
            project_order: Vec::new(),
            open: Vec::new(),
            unknown: UnknownDataTally::default(),
            format_version: None,
            events: 0,
        }
    }

    /// The tree as reconstructed so far
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn registry(&self, project_id: i32) -> Option<&IdentifierRegistry> {
        self.registries.get(&project_id)
    }

    pub fn unknown_data(&self) -> &UnknownDataTally {
        &self.unknown
    }

    pub fn format_version(&self) -> Option<u32> {
        self.format_version
    }

    /// Dispatch one decoder record
    pub fn feed(&mut self, record: LogRecord) -> Result<()> {
        match record {
            LogRecord::Event(event) => self.process(&event),
            LogRecord::FormatVersion { version } => {
                self.on_format_version(version);
                Ok(())
            }
            LogRecord::Strings { strings } => {
                self.on_strings(strings);
                Ok(())
            }
            LogRecord::RecoverableError(err) => self.on_recoverable_error(err),
        }
    }

    pub fn on_format_version(&mut self, version: u32) {
        log::debug!("Producer format version {}", version);
        self.format_version = Some(version);
        self.strings.set_format_version(version);
    }

    /// Bulk-load the producer's string dictionary
    pub fn on_strings<I, S>(&mut self, strings: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.strings.intern_all(strings);
        log::debug!("String dictionary loaded: {} strings", self.strings.len());
    }

    pub fn on_recoverable_error(&mut self, err: RecoverableReadError) -> Result<()> {
        self.unknown
            .record(self.options.unknown_data_behavior, err)
    }

    pub fn process(&mut self, event: &BuildEvent) -> Result<()> {
        self.events += 1;
        match &event.payload {
            EventPayload::BuildStarted => {
                self.on_build_started(event);
                Ok(())
            }
            EventPayload::BuildFinished(p) => {
                self.on_build_finished(event, p);
                Ok(())
            }
            EventPayload::ProjectStarted(p) => self.on_project_started(event, p),
            EventPayload::ProjectFinished(p) => {
                self.on_project_finished(event, p);
                Ok(())
            }
            EventPayload::TargetStarted(p) => self.on_target_started(event, p),
            EventPayload::TargetFinished(p) => self.on_target_finished(event, p),
            EventPayload::TargetSkipped(p) => self.on_target_skipped(event, p),
            EventPayload::TaskStarted(p) => self.on_task_started(event, p),
            EventPayload::TaskCommandLine(p) => self.on_task_command_line(event, p),
            EventPayload::TaskFinished(p) => self.on_task_finished(event, p),
            EventPayload::Message(p) => {
                let node = diagnostic_node(p, event.timestamp);
                let low = node.importance == MessageImportance::Low;
                let id = self.add_diagnostic(event, NodeKind::Message(node))?;
                if low {
                    self.tree.set_flag(id, NodeFlags::LOW_RELEVANCE, true)?;
                }
                Ok(())
            }
            EventPayload::Warning(p) => self
                .add_diagnostic(event, NodeKind::Warning(diagnostic_node(p, event.timestamp)))
                .map(|_| ()),
            EventPayload::Error(p) => self
                .add_diagnostic(event, NodeKind::Error(diagnostic_node(p, event.timestamp)))
                .map(|_| ()),
            EventPayload::Custom(p) => {
                if let Some(text) = p.message() {
                    let mut node = DiagnosticNode::new(text);
                    node.timestamp = Some(event.timestamp);
                    self.add_diagnostic(event, NodeKind::Message(node))?;
                }
                Ok(())
            }
            EventPayload::Status(p) => {
                log::trace!("Status event: {}", p.data);
                Ok(())
            }
            EventPayload::Unknown => self.on_recoverable_error(RecoverableReadError::new(
                ErrorType::UnknownEventData,
                "unknown",
                format!("unrecognized event at {}", event.timestamp),
            )),
        }
    }

    /// End of stream: add the unknown-data summary, intern strings, and
    /// re-parent targets that never started.
    pub fn finish(mut self) -> Result<Tree> {
        let root = self.tree.root();
        if let Some(summary) = self
            .unknown
            .summary_node(self.options.unknown_data_behavior)
        {
            self.tree.add_child(root, summary)?;
        }

        if self.options.intern_strings {
            let replaced = self.strings.intern_tree(&mut self.tree);
            log::debug!(
                "Interned strings: {} distinct, {} fields shared",
                self.strings.len(),
                replaced
            );
        }

        let mut orphans = 0;
        for project_id in &self.project_order {
            if let Some(registry) = self.registries.get_mut(project_id) {
                orphans += registry.freeze(&mut self.tree)?;
            }
        }

        let targets: usize = self
            .registries
            .values()
            .map(IdentifierRegistry::target_count)
            .sum();
        log::info!(
            "Reconstructed build from {} events: {} nodes, {} projects, {} targets ({} orphans re-parented), {} unreadable records",
            self.events,
            self.tree.len(),
            self.project_order.len(),
            targets,
            orphans,
            self.unknown.total()
        );
        Ok(self.tree)
    }

    // ==========================================
    // Scope helpers
    // ==========================================

    fn close(&mut self, node: NodeId) {
        if let Some(pos) = self.open.iter().rposition(|&n| n == node) {
            self.open.remove(pos);
        }
    }

    fn stamp_end(&mut self, node: NodeId, time: DateTime<Utc>) {
        if let Some(timed) = self.tree[node].kind_mut().timed_mut() {
            timed.end_time = Some(time);
        }
        self.close(node);
    }

    fn last_open_project(&self) -> Option<i32> {
        self.open.iter().rev().find_map(|&n| match self.tree[n].kind() {
            NodeKind::Project(p) => Some(p.timed.id),
            _ => None,
        })
    }

    /// Project named by the event context, or the innermost open project
    fn project_of(&self, event: &BuildEvent) -> Result<i32> {
        match event.project_id() {
            Some(id) if self.registries.contains_key(&id) => Ok(id),
            Some(id) => Err(Error::ProjectNotFound(id)),
            None => self
                .last_open_project()
                .ok_or(Error::ProjectNotFound(UNSTARTED_ID)),
        }
    }

    fn registry_mut(&mut self, project_id: i32) -> Result<&mut IdentifierRegistry> {
        self.registries
            .get_mut(&project_id)
            .ok_or(Error::ProjectNotFound(project_id))
    }

    fn last_open_child<P>(&self, parent: NodeId, mut predicate: P) -> Option<NodeId>
    where
        P: FnMut(&NodeKind) -> bool,
    {
        self.tree
            .find_last_child(parent, |n| n.kind().is_open() && predicate(n.kind()))
    }

    /// Narrowest open scope named by the event context
    fn diagnostic_parent(&self, event: &BuildEvent) -> NodeId {
        if let Some(registry) = event.project_id().and_then(|id| self.registries.get(&id)) {
            if let Some(task) = event.task_id().and_then(|id| registry.find_task(id)) {
                return task;
            }
            if let Some(target) = event.target_id().and_then(|id| registry.find_target_by_id(id)) {
                return target;
            }
            return registry.project();
        }
        self.open.last().copied().unwrap_or(self.tree.root())
    }

    fn add_diagnostic(&mut self, event: &BuildEvent, kind: NodeKind) -> Result<NodeId> {
        let parent = self.diagnostic_parent(event);
        self.tree.add_child(parent, kind)
    }

    // ==========================================
    // Build
    // ==========================================

    fn on_build_started(&mut self, event: &BuildEvent) {
        let root = self.tree.root();
        if let NodeKind::Build(build) = self.tree[root].kind_mut() {
            build.timed.start_time = Some(event.timestamp);
            build.timed.node_id = event.node_id().unwrap_or(0);
        }
    }

    fn on_build_finished(&mut self, event: &BuildEvent, p: &BuildFinishedPayload) {
        let root = self.tree.root();
        if let NodeKind::Build(build) = self.tree[root].kind_mut() {
            build.timed.end_time = Some(event.timestamp);
            build.succeeded = Some(p.succeeded);
        }
    }

    // ==========================================
    // Project
    // ==========================================

    fn on_project_started(&mut self, event: &BuildEvent, p: &ProjectStartedPayload) -> Result<()> {
        let project_id = event.project_id().unwrap_or(self.project_order.len() as i32);
        let parent = p
            .parent_project_id
            .and_then(|id| self.registries.get(&id))
            .map(IdentifierRegistry::project)
            .unwrap_or(self.tree.root());

        let mut timed = TimedNode::new(project_id, p.name.as_str());
        timed.node_id = event.node_id().unwrap_or(0);
        timed.start_time = Some(event.timestamp);
        let node = self.tree.add_child(
            parent,
            NodeKind::Project(ProjectNode {
                timed,
                project_file: Arc::from(p.project_file.as_str()),
                target_names: p.target_names.as_deref().map(Arc::from),
                succeeded: None,
            }),
        )?;

        if self
            .registries
            .insert(project_id, IdentifierRegistry::new(node, project_id))
            .is_some()
        {
            log::warn!("Project id {} started twice; later events go to the newer instance", project_id);
        } else {
            self.project_order.push(project_id);
        }
        self.open.push(node);
        Ok(())
    }

    fn on_project_finished(&mut self, event: &BuildEvent, p: &ProjectFinishedPayload) {
        let project_id = event.project_id().or_else(|| self.last_open_project());
        let Some(node) = project_id
            .and_then(|id| self.registries.get(&id))
            .map(IdentifierRegistry::project)
        else {
            log::warn!("Ignoring project finish for unknown project {:?}", project_id);
            return;
        };

        if let NodeKind::Project(project) = self.tree[node].kind_mut() {
            project.succeeded = Some(p.succeeded);
        }
        self.stamp_end(node, event.timestamp);
    }

    // ==========================================
    // Target
    // ==========================================

    fn on_target_started(&mut self, event: &BuildEvent, p: &TargetStartedPayload) -> Result<()> {
        let project_id = self.project_of(event)?;
        let registry = self
            .registries
            .get_mut(&project_id)
            .ok_or(Error::ProjectNotFound(project_id))?;
        let project = registry.project();
        let node = registry.get_or_add_target_by_name(&mut self.tree, &p.name);
        let target_id = event.target_id();
        if let Some(id) = target_id {
            registry.register_target(id, node);
        }

        let already_started = self.tree[node]
            .kind()
            .timed()
            .is_some_and(TimedNode::is_started);

        if let NodeKind::Target(target) = self.tree[node].kind_mut() {
            // Skipped or orphan-finished targets already carry an end time
            target.timed.end_time = None;
            target.succeeded = None;
            if already_started {
                log::debug!("Target '{}' started again in project {}", p.name, project_id);
            } else {
                target.timed.id = target_id.unwrap_or(0);
                target.timed.node_id = event.node_id().unwrap_or(0);
                target.timed.start_time = Some(event.timestamp);
                target.parent_target = p.parent_target.as_deref().map(Arc::from);
                target.skipped = false;
                target.skip_reason = None;
            }
        }

        if self.tree[node].parent().is_none() {
            self.tree.attach(project, node)?;
        }
        self.open.push(node);
        Ok(())
    }

    fn on_target_finished(&mut self, event: &BuildEvent, p: &TargetFinishedPayload) -> Result<()> {
        let project_id = self.project_of(event)?;
        let registry = self
            .registries
            .get(&project_id)
            .ok_or(Error::ProjectNotFound(project_id))?;
        let project = registry.project();

        let resolved = match event.target_id() {
            Some(id) => registry.find_target_by_id(id),
            None => self.last_open_child(project, |k| matches!(k, NodeKind::Target(_))),
        };

        let node = match resolved {
            Some(node) => node,
            None => {
                log::debug!(
                    "Target '{}' finished without a start in project {}; keeping it as an orphan",
                    p.name,
                    project_id
                );
                self.registries
                    .get_mut(&project_id)
                    .ok_or(Error::ProjectNotFound(project_id))?
                    .get_or_add_target_by_name(&mut self.tree, &p.name)
            }
        };

        if let NodeKind::Target(target) = self.tree[node].kind_mut() {
            target.succeeded = Some(p.succeeded);
        }
        self.stamp_end(node, event.timestamp);
        Ok(())
    }

    fn on_target_skipped(&mut self, event: &BuildEvent, p: &TargetSkippedPayload) -> Result<()> {
        let project_id = self.project_of(event)?;
        let node = self
            .registries
            .get_mut(&project_id)
            .ok_or(Error::ProjectNotFound(project_id))?
            .get_or_add_target_by_name(&mut self.tree, &p.name);

        if let NodeKind::Target(target) = self.tree[node].kind_mut() {
            if target.timed.is_started() {
                log::trace!("Target '{}' skipped after it already ran", p.name);
                return Ok(());
            }
            target.skipped = true;
            target.skip_reason = p.reason.as_deref().map(Arc::from);
            target.timed.start_time = Some(event.timestamp);
            target.timed.end_time = Some(event.timestamp);
        }
        Ok(())
    }

    // ==========================================
    // Task
    // ==========================================

    fn on_task_started(&mut self, event: &BuildEvent, p: &TaskStartedPayload) -> Result<()> {
        let project_id = self.project_of(event)?;
        let registry = self
            .registries
            .get(&project_id)
            .ok_or(Error::ProjectNotFound(project_id))?;
        let target = match event.target_id() {
            Some(id) => registry.get_target_by_id(id)?,
            None => self
                .last_open_child(registry.project(), |k| matches!(k, NodeKind::Target(_)))
                .ok_or(Error::TargetNotFound {
                    project: project_id,
                    id: UNSTARTED_ID,
                })?,
        };

        let task_id = event.task_id();
        let mut timed = TimedNode::new(task_id.unwrap_or(0), p.name.as_str());
        timed.node_id = event.node_id().unwrap_or(0);
        timed.start_time = Some(event.timestamp);
        let node = self.tree.add_child(
            target,
            NodeKind::Task(TaskNode {
                timed,
                from_assembly: p.from_assembly.as_deref().map(Arc::from),
                command_line: None,
                succeeded: None,
            }),
        )?;

        if let Some(id) = task_id {
            self.registry_mut(project_id)?.register_task(id, node);
        }
        self.open.push(node);
        Ok(())
    }

    /// Task named by the event's task id; the innermost open task only
    /// when the event carries no task id
    fn find_task(&self, event: &BuildEvent) -> Option<NodeId> {
        match event.task_id() {
            Some(id) => self
                .project_of(event)
                .ok()
                .and_then(|project_id| self.registries.get(&project_id))
                .and_then(|registry| registry.find_task(id)),
            None => self
                .open
                .iter()
                .rev()
                .copied()
                .find(|&n| matches!(self.tree[n].kind(), NodeKind::Task(_))),
        }
    }

    fn on_task_command_line(
        &mut self,
        event: &BuildEvent,
        p: &TaskCommandLinePayload,
    ) -> Result<()> {
        match self.find_task(event) {
            Some(task) => {
                if let NodeKind::Task(t) = self.tree[task].kind_mut() {
                    t.command_line = Some(Arc::from(p.command_line.as_str()));
                }
            }
            None => {
                let mut node = DiagnosticNode::new(p.command_line.as_str());
                node.timestamp = Some(event.timestamp);
                self.add_diagnostic(event, NodeKind::Message(node))?;
            }
        }
        Ok(())
    }

    fn on_task_finished(&mut self, event: &BuildEvent, p: &TaskFinishedPayload) -> Result<()> {
        let node = match self.find_task(event) {
            Some(node) => node,
            None => self.add_orphan_task(event, p)?,
        };

        if let NodeKind::Task(task) = self.tree[node].kind_mut() {
            task.succeeded = Some(p.succeeded);
        }
        self.stamp_end(node, event.timestamp);
        Ok(())
    }

    /// Task finished without a start: keep it under its target if that is
    /// known, otherwise under its project.
    fn add_orphan_task(&mut self, event: &BuildEvent, p: &TaskFinishedPayload) -> Result<NodeId> {
        let project_id = self.project_of(event)?;
        let registry = self
            .registries
            .get(&project_id)
            .ok_or(Error::ProjectNotFound(project_id))?;
        let parent = event
            .target_id()
            .and_then(|id| registry.find_target_by_id(id))
            .unwrap_or(registry.project());

        log::debug!(
            "Task '{}' finished without a start in project {}; re-parenting",
            p.name,
            project_id
        );

        let mut timed = TimedNode::new(event.task_id().unwrap_or(UNSTARTED_ID), p.name.as_str());
        timed.node_id = event.node_id().unwrap_or(0);
        let node = self.tree.add_child(
            parent,
            NodeKind::Task(TaskNode {
                timed,
                from_assembly: None,
                command_line: None,
                succeeded: None,
            }),
        )?;
        if let Some(id) = event.task_id() {
            self.registry_mut(project_id)?.register_task(id, node);
        }
        Ok(node)
    }
}

fn diagnostic_node(p: &DiagnosticPayload, timestamp: DateTime<Utc>) -> DiagnosticNode {
    DiagnosticNode {
        text: Arc::from(p.text.as_str()),
        code: p.code.as_deref().map(Arc::from),
        file: p.file.as_deref().map(Arc::from),
        line: p.line,
        column: p.column,
        importance: p.importance.unwrap_or_default(),
        timestamp: Some(timestamp),
    }
}
