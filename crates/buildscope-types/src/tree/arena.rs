use serde::Serialize;
use std::fmt;
use std::ops::{Index, IndexMut};

use super::kind::NodeKind;
use super::node::{Node, NodeFlags, NodeId};
use super::observer::{NodeChange, TreeObserver};
use crate::{Error, Result};

/// Arena holding every node of one build.
///
/// Nodes are never removed from the arena; `detach` only unlinks them.
/// Dropping the tree drops all nodes together.
#[derive(Serialize)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    #[serde(skip)]
    observer: Option<Box<dyn TreeObserver + Send>>,
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.root)
            .field("nodes", &self.nodes.len())
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl Tree {
    pub fn new(root: NodeKind) -> Self {
        Self {
            nodes: vec![Node::new(root)],
            root: NodeId::new(0),
            observer: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// All ids in creation order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    pub fn set_observer(&mut self, observer: Box<dyn TreeObserver + Send>) {
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    fn notify(&self, node: NodeId, change: NodeChange) {
        if let Some(observer) = &self.observer {
            observer.node_changed(node, change);
        }
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(Error::InvalidNode(id))
        }
    }

    // ==========================================
    // Mutation
    // ==========================================

    /// Create a node that has no parent yet
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    /// Create a node and append it to `parent`
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId> {
        self.check(parent)?;
        let child = self.create(kind);
        self.attach(parent, child)?;
        Ok(child)
    }

    /// Append an existing parentless node to `parent`.
    ///
    /// Fails if the child already has a parent, is the root, or is an
    /// ancestor of `parent`.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check(parent)?;
        self.check(child)?;

        if let Some(existing) = self[child].parent() {
            return Err(Error::AlreadyParented {
                child,
                parent: existing,
            });
        }
        if child == self.root || self.is_ancestor_or_self(child, parent) {
            return Err(Error::AlreadyParented { child, parent });
        }

        let had_children = self[parent].has_children();
        self.nodes[child.index()].set_parent(Some(parent));
        self.nodes[parent.index()].children_mut().push(child);

        self.notify(parent, NodeChange::ChildAdded(child));
        if !had_children {
            self.notify(parent, NodeChange::HasChildrenChanged(true));
        }
        Ok(())
    }

    /// Unlink a node from its parent. The node stays in the arena.
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        self.check(child)?;
        let Some(parent) = self[child].parent() else {
            return Ok(());
        };

        self.nodes[parent.index()]
            .children_mut()
            .retain(|&c| c != child);
        self.nodes[child.index()].set_parent(None);

        self.notify(parent, NodeChange::ChildRemoved(child));
        if !self[parent].has_children() {
            self.notify(parent, NodeChange::HasChildrenChanged(false));
        }
        Ok(())
    }

    pub fn set_flag(&mut self, id: NodeId, flag: NodeFlags, on: bool) -> Result<()> {
        self.check(id)?;
        let flags = self.nodes[id.index()].flags_mut();
        let before = *flags;
        flags.set(flag, on);
        if *flags != before {
            self.notify(id, NodeChange::FlagsChanged);
        }
        Ok(())
    }

    /// Visit every node kind mutably, attached or not
    pub fn for_each_kind_mut(&mut self, mut f: impl FnMut(NodeId, &mut NodeKind)) {
        for (index, node) in self.nodes.iter_mut().enumerate() {
            f(NodeId::new(index), node.kind_mut());
        }
    }

    // ==========================================
    // Navigation
    // ==========================================

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.children(id).is_empty()
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.parent(node) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// Depth-first, pre-order walk of the subtree rooted at `id` (inclusive)
    pub fn subtree(&self, id: NodeId) -> Subtree<'_> {
        let stack = if self.contains(id) { vec![id] } else { Vec::new() };
        Subtree { tree: self, stack }
    }

    /// Number of edges between `id` and the root
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Ancestors ordered from the outermost one down to `id` itself
    pub fn parent_chain_including_this(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    pub fn parent_chain_excluding_this(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = self.parent_chain_including_this(id);
        chain.pop();
        chain
    }

    pub fn find_first_including_self<P>(&self, id: NodeId, mut predicate: P) -> Option<NodeId>
    where
        P: FnMut(&Node) -> bool,
    {
        self.subtree(id).find(|&n| predicate(&self[n]))
    }

    pub fn find_first_descendant<P>(&self, id: NodeId, mut predicate: P) -> Option<NodeId>
    where
        P: FnMut(&Node) -> bool,
    {
        self.subtree(id).skip(1).find(|&n| predicate(&self[n]))
    }

    /// Last match in pre-order, excluding `id`
    pub fn find_last_descendant<P>(&self, id: NodeId, mut predicate: P) -> Option<NodeId>
    where
        P: FnMut(&Node) -> bool,
    {
        self.subtree(id)
            .skip(1)
            .filter(|&n| predicate(&self[n]))
            .last()
    }

    pub fn find_first_child<P>(&self, id: NodeId, mut predicate: P) -> Option<NodeId>
    where
        P: FnMut(&Node) -> bool,
    {
        self.children(id)
            .iter()
            .copied()
            .find(|&n| predicate(&self[n]))
    }

    pub fn find_last_child<P>(&self, id: NodeId, mut predicate: P) -> Option<NodeId>
    where
        P: FnMut(&Node) -> bool,
    {
        self.children(id)
            .iter()
            .rev()
            .copied()
            .find(|&n| predicate(&self[n]))
    }

    /// Child of `id` that is a timed node with the given name (case-insensitive)
    pub fn find_child_by_name(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.find_first_child(id, |n| {
            n.kind().name().is_some_and(|s| s.eq_ignore_ascii_case(name))
        })
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }
}

/// Iterator returned by `Tree::subtree`
pub struct Subtree<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Subtree<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
