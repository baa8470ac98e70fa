use super::node::NodeId;

/// The one node currently focused by a view.
///
/// Owned by whatever coordinates focus (a UI, a query session) and passed
/// around explicitly; the tree itself stores no selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<NodeId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id`, returning the previously selected node
    pub fn select(&mut self, id: NodeId) -> Option<NodeId> {
        self.selected.replace(id)
    }

    pub fn clear(&mut self) -> Option<NodeId> {
        self.selected.take()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_one_node_selected() {
        let a = NodeId::new(1);
        let b = NodeId::new(2);
        let mut selection = SelectionState::new();

        assert_eq!(selection.select(a), None);
        assert_eq!(selection.select(b), Some(a));
        assert!(selection.is_selected(b));
        assert!(!selection.is_selected(a));
        assert_eq!(selection.clear(), Some(b));
        assert_eq!(selection.selected(), None);
    }
}
