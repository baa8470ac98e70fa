use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::kind::NodeKind;

/// Handle of a node inside its owning `Tree`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags! {
    /// Compact per-node display flags.
    ///
    /// Selection is not a flag: see `SelectionState`.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct NodeFlags: u8 {
        const SEARCH_RESULT = 1 << 0;
        const CONTAINS_SEARCH_RESULT = 1 << 1;
        const LOW_RELEVANCE = 1 << 2;
        const HIDDEN = 1 << 3;
    }
}

/// A node of the build tree
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    flags: NodeFlags,
    kind: NodeKind,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            flags: NodeFlags::empty(),
            kind,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }

    pub(crate) fn flags_mut(&mut self) -> &mut NodeFlags {
        &mut self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_set_and_clear() {
        let mut flags = NodeFlags::empty();
        assert!(flags.is_empty());

        flags.insert(NodeFlags::SEARCH_RESULT);
        flags.set(NodeFlags::HIDDEN, true);
        assert!(flags.contains(NodeFlags::SEARCH_RESULT));
        assert!(flags.contains(NodeFlags::HIDDEN));
        assert!(!flags.contains(NodeFlags::LOW_RELEVANCE));
        assert_eq!(flags.bits(), 0b1001);

        flags.set(NodeFlags::HIDDEN, false);
        flags.remove(NodeFlags::SEARCH_RESULT);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_flags_serialize_by_name() {
        let json = serde_json::to_string(&NodeFlags::LOW_RELEVANCE).unwrap();
        assert_eq!(json, "\"LOW_RELEVANCE\"");
        let parsed: NodeFlags = serde_json::from_str("\"HIDDEN | SEARCH_RESULT\"").unwrap();
        assert_eq!(parsed, NodeFlags::HIDDEN | NodeFlags::SEARCH_RESULT);
    }
}
