use super::node::NodeId;

/// Structural change reported to a `TreeObserver`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeChange {
    ChildAdded(NodeId),
    ChildRemoved(NodeId),
    /// The node gained its first child or lost its last one
    HasChildrenChanged(bool),
    FlagsChanged,
}

/// Optional change listener for presentation layers.
///
/// The tree calls it synchronously from the mutating method.
pub trait TreeObserver {
    fn node_changed(&self, node: NodeId, change: NodeChange);
}
