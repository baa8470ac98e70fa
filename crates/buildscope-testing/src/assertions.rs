//! Structural assertions for reconstructed trees.
//!
//! Each assertion returns `anyhow::Result` so tests can `?` through several
//! checks and get a readable failure message.

use anyhow::{Result, bail};
use buildscope_types::{NodeId, NodeKind, Tree};
use std::collections::HashSet;

/// Every node reachable from the root has exactly one parent link, appears
/// once, and its parent chain ends at the root after `depth` steps.
pub fn assert_tree_integrity(tree: &Tree) -> Result<()> {
    let root = tree.root();
    if tree.parent(root).is_some() {
        bail!("Root node has a parent");
    }

    let mut seen = HashSet::new();
    for id in tree.subtree(root) {
        if !seen.insert(id) {
            bail!("Node {} is reachable more than once", id.index());
        }

        for &child in tree.children(id) {
            if tree.parent(child) != Some(id) {
                bail!(
                    "Node {} is listed under {} but its parent is {:?}",
                    child.index(),
                    id.index(),
                    tree.parent(child).map(NodeId::index)
                );
            }
        }

        let chain = tree.parent_chain_including_this(id);
        if chain.first() != Some(&root) {
            bail!("Parent chain of node {} does not start at the root", id.index());
        }
        if chain.len() != tree.depth(id) + 1 {
            bail!(
                "Parent chain of node {} has {} entries, expected depth {} + 1",
                id.index(),
                chain.len(),
                tree.depth(id)
            );
        }
    }

    Ok(())
}

/// Titles of the children of `id`, in order
pub fn child_titles(tree: &Tree, id: NodeId) -> Vec<String> {
    tree.children(id)
        .iter()
        .map(|&child| tree[child].kind().title())
        .collect()
}

/// All attached nodes of one kind, by `NodeKind::kind_name`
pub fn nodes_of_kind(tree: &Tree, kind_name: &str) -> Vec<NodeId> {
    tree.subtree(tree.root())
        .filter(|&id| tree[id].kind().kind_name() == kind_name)
        .collect()
}

/// Exactly one attached node with this title, returning it
pub fn find_unique(tree: &Tree, title: &str) -> Result<NodeId> {
    let matches: Vec<NodeId> = tree
        .subtree(tree.root())
        .filter(|&id| tree[id].kind().title() == title)
        .collect();
    match matches.as_slice() {
        [single] => Ok(*single),
        [] => bail!("No node titled '{}'", title),
        many => bail!("{} nodes titled '{}'", many.len(), title),
    }
}

/// The node is a finished timed node (start and end stamped)
pub fn assert_finished(tree: &Tree, id: NodeId) -> Result<()> {
    match tree[id].kind().timed() {
        Some(timed) if timed.start_time.is_some() && timed.end_time.is_some() => Ok(()),
        Some(timed) => bail!(
            "'{}' is not finished (start {:?}, end {:?})",
            timed.name,
            timed.start_time,
            timed.end_time
        ),
        None => bail!("Node {} is not a timed node", id.index()),
    }
}

/// Diagnostics directly under `id`
pub fn diagnostics_under(tree: &Tree, id: NodeId) -> Vec<&NodeKind> {
    tree.children(id)
        .iter()
        .map(|&child| tree[child].kind())
        .filter(|kind| kind.diagnostic().is_some())
        .collect()
}
