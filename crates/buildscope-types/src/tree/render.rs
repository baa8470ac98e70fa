use chrono::Duration;

use super::arena::Tree;
use super::node::{NodeFlags, NodeId};

/// Human readable duration: `850 ms`, `4.250 s`, `2:03.500`, `1:02:03.000`
pub fn duration_text(duration: Duration) -> String {
    let total_ms = duration.num_milliseconds().max(0);
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    if total_ms < 1000 {
        format!("{} ms", total_ms)
    } else if total_secs < 60 {
        format!("{}.{:03} s", total_secs, ms)
    } else if hours == 0 {
        format!("{}:{:02}.{:03}", total_mins, secs, ms)
    } else {
        format!("{}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
    }
}

impl Tree {
    /// Indented outline of the attached tree, two spaces per level.
    ///
    /// Finished timed nodes show their duration in brackets; hidden nodes and
    /// their subtrees are left out.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        self.render_node(self.root(), 0, &mut out);
        out
    }

    fn render_node(&self, id: NodeId, level: usize, out: &mut String) {
        let node = &self[id];
        if node.flags().contains(NodeFlags::HIDDEN) {
            return;
        }

        for _ in 0..level {
            out.push_str("  ");
        }
        out.push_str(&node.kind().title());
        if let Some(duration) = node.kind().duration_text() {
            out.push_str(" [");
            out.push_str(&duration);
            out.push(']');
        }
        out.push('\n');

        for &child in node.children() {
            self.render_node(child, level + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::kind::*;

    #[test]
    fn test_duration_text_ranges() {
        assert_eq!(duration_text(Duration::milliseconds(0)), "0 ms");
        assert_eq!(duration_text(Duration::milliseconds(850)), "850 ms");
        assert_eq!(duration_text(Duration::milliseconds(4250)), "4.250 s");
        assert_eq!(duration_text(Duration::milliseconds(123_500)), "2:03.500");
        assert_eq!(duration_text(Duration::seconds(3723)), "1:02:03.000");
        assert_eq!(duration_text(Duration::milliseconds(-5)), "0 ms");
    }

    #[test]
    fn test_render_text_skips_hidden() {
        let mut tree = Tree::new(NodeKind::Build(BuildNode {
            timed: TimedNode::new(0, "Build"),
            succeeded: Some(true),
        }));
        let root = tree.root();
        let shown = tree
            .add_child(root, NodeKind::Message(DiagnosticNode::new("shown")))
            .unwrap();
        let hidden = tree
            .add_child(root, NodeKind::Message(DiagnosticNode::new("hidden")))
            .unwrap();
        tree.set_flag(hidden, NodeFlags::HIDDEN, true).unwrap();

        assert_eq!(tree.render_text(), "Build succeeded\n  shown\n");
        assert!(tree[shown].parent().is_some());
    }
}
