use buildscope_types::{Error, NodeId, NodeKind, Result, TargetNode, TimedNode, Tree, UNSTARTED_ID};
use std::collections::HashMap;

/// Per-project correlation of target and task ids to tree nodes.
///
/// Target and task ids are only unique within one project, so each project
/// owns one registry. Targets are additionally known by name: a project runs
/// a given target at most once, and later references by name resolve to the
/// first node created for it.
#[derive(Debug)]
pub struct IdentifierRegistry {
    project: NodeId,
    project_id: i32,
    targets_by_name: HashMap<String, NodeId>,
    /// Targets in the order they were first referenced
    discovered: Vec<NodeId>,
    targets_by_id: HashMap<i32, NodeId>,
    tasks_by_id: HashMap<i32, NodeId>,
}

fn name_key(name: &str) -> String {
    name.to_lowercase()
}

impl IdentifierRegistry {
    pub fn new(project: NodeId, project_id: i32) -> Self {
        Self {
            project,
            project_id,
            targets_by_name: HashMap::new(),
            discovered: Vec::new(),
            targets_by_id: HashMap::new(),
            tasks_by_id: HashMap::new(),
        }
    }

    pub fn project(&self) -> NodeId {
        self.project
    }

    pub fn project_id(&self) -> i32 {
        self.project_id
    }

    /// Case-insensitive lookup-or-create.
    ///
    /// New targets carry `UNSTARTED_ID` and no parent until a start event
    /// claims them or `freeze` re-parents them.
    pub fn get_or_add_target_by_name(&mut self, tree: &mut Tree, name: &str) -> NodeId {
        if let Some(existing) = self.find_target_by_name(name) {
            return existing;
        }

        let node = tree.create(NodeKind::Target(TargetNode {
            timed: TimedNode::new(UNSTARTED_ID, name),
            parent_target: None,
            succeeded: None,
            skipped: false,
            skip_reason: None,
        }));
        self.targets_by_name.insert(name_key(name), node);
        self.discovered.push(node);
        node
    }

    pub fn find_target_by_name(&self, name: &str) -> Option<NodeId> {
        self.targets_by_name.get(&name_key(name)).copied()
    }

    pub fn register_target(&mut self, id: i32, node: NodeId) {
        self.targets_by_id.insert(id, node);
    }

    /// Exact id lookup. The id must come from an earlier target start event.
    pub fn get_target_by_id(&self, id: i32) -> Result<NodeId> {
        self.find_target_by_id(id).ok_or(Error::TargetNotFound {
            project: self.project_id,
            id,
        })
    }

    pub fn find_target_by_id(&self, id: i32) -> Option<NodeId> {
        self.targets_by_id.get(&id).copied()
    }

    pub fn register_task(&mut self, id: i32, node: NodeId) {
        self.tasks_by_id.insert(id, node);
    }

    pub fn find_task(&self, id: i32) -> Option<NodeId> {
        self.tasks_by_id.get(&id).copied()
    }

    pub fn target_count(&self) -> usize {
        self.discovered.len()
    }

    /// Attach every never-started, still parentless target to the project,
    /// in discovery order. Returns how many were attached.
    pub fn freeze(&mut self, tree: &mut Tree) -> Result<usize> {
        let mut attached = 0;
        for &node in &self.discovered {
            let unstarted = tree[node]
                .kind()
                .timed()
                .is_some_and(|t| !t.is_started());
            if unstarted && tree[node].parent().is_none() {
                tree.attach(self.project, node)?;
                attached += 1;
            }
        }
        Ok(attached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildscope_types::{BuildNode, ProjectNode};

    fn tree_with_project() -> (Tree, NodeId) {
        let mut tree = Tree::new(NodeKind::Build(BuildNode {
            timed: TimedNode::new(0, "Build"),
            succeeded: None,
        }));
        let root = tree.root();
        let project = tree
            .add_child(
                root,
                NodeKind::Project(ProjectNode {
                    timed: TimedNode::new(1, "App.csproj"),
                    project_file: "App.csproj".into(),
                    target_names: None,
                    succeeded: None,
                }),
            )
            .unwrap();
        (tree, project)
    }

    #[test]
    fn test_get_or_add_is_case_insensitive() {
        let (mut tree, project) = tree_with_project();
        let mut registry = IdentifierRegistry::new(project, 1);

        let a = registry.get_or_add_target_by_name(&mut tree, "Build");
        let b = registry.get_or_add_target_by_name(&mut tree, "BUILD");
        assert_eq!(a, b);
        assert_eq!(registry.target_count(), 1);
        assert_eq!(registry.find_target_by_name("build"), Some(a));
        assert_eq!(tree[a].kind().timed().map(|t| t.id), Some(UNSTARTED_ID));
        assert_eq!(tree[a].parent(), None);
    }

    #[test]
    fn test_get_target_by_id_reports_missing() {
        let (mut tree, project) = tree_with_project();
        let mut registry = IdentifierRegistry::new(project, 7);
        let node = registry.get_or_add_target_by_name(&mut tree, "Compile");
        registry.register_target(3, node);

        assert_eq!(registry.get_target_by_id(3).unwrap(), node);
        let err = registry.get_target_by_id(4).unwrap_err();
        assert!(matches!(err, Error::TargetNotFound { project: 7, id: 4 }));
    }

    #[test]
    fn test_freeze_attaches_unstarted_in_discovery_order() {
        let (mut tree, project) = tree_with_project();
        let mut registry = IdentifierRegistry::new(project, 1);

        let first = registry.get_or_add_target_by_name(&mut tree, "Zeta");
        let started = registry.get_or_add_target_by_name(&mut tree, "Build");
        let second = registry.get_or_add_target_by_name(&mut tree, "Alpha");

        if let Some(timed) = tree[started].kind_mut().timed_mut() {
            timed.id = 5;
        }
        tree.attach(project, started).unwrap();

        assert_eq!(registry.freeze(&mut tree).unwrap(), 2);
        assert_eq!(tree.children(project), &[started, first, second]);

        // A second freeze finds nothing left to attach
        assert_eq!(registry.freeze(&mut tree).unwrap(), 0);
        assert_eq!(tree.children(project).len(), 3);
    }
}
