//! Presentation of engine results for the terminal and for JSON consumers.

use buildscope_engine::{CommandLineDiff, ConditionTree};
use buildscope_types::{NodeFlags, NodeId, NodeKind, Tree};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::types::ColorChoice;

pub fn use_color(choice: ColorChoice) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
        }
    }
}

// ==========================================
// Build tree
// ==========================================

/// Nested JSON view of one node and its attached subtree
#[derive(Serialize)]
pub struct NodeView<'a> {
    pub title: String,
    #[serde(flatten)]
    pub kind: &'a NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeView<'a>>,
}

impl<'a> NodeView<'a> {
    pub fn build(tree: &'a Tree, id: NodeId) -> Self {
        let node = &tree[id];
        Self {
            title: node.kind().title(),
            kind: node.kind(),
            duration: node.kind().duration_text(),
            flags: flag_names(node.flags()),
            children: node
                .children()
                .iter()
                .filter(|&&child| !tree[child].flags().contains(NodeFlags::HIDDEN))
                .map(|&child| NodeView::build(tree, child))
                .collect(),
        }
    }
}

fn flag_names(flags: NodeFlags) -> Vec<&'static str> {
    [
        (NodeFlags::SEARCH_RESULT, "search_result"),
        (NodeFlags::CONTAINS_SEARCH_RESULT, "contains_search_result"),
        (NodeFlags::LOW_RELEVANCE, "low_relevance"),
        (NodeFlags::HIDDEN, "hidden"),
    ]
    .into_iter()
    .filter(|(flag, _)| flags.contains(*flag))
    .map(|(_, name)| name)
    .collect()
}

/// Outline like `Tree::render_text`, colored by node kind
pub fn render_tree_colored(tree: &Tree) -> String {
    let mut out = String::new();
    render_colored_node(tree, tree.root(), 0, &mut out);
    out
}

fn render_colored_node(tree: &Tree, id: NodeId, level: usize, out: &mut String) {
    let node = &tree[id];
    if node.flags().contains(NodeFlags::HIDDEN) {
        return;
    }

    let title = node.kind().title();
    let styled = match node.kind() {
        NodeKind::Error(_) => title.red().to_string(),
        NodeKind::Warning(_) => title.yellow().to_string(),
        NodeKind::Message(_) if node.flags().contains(NodeFlags::LOW_RELEVANCE) => {
            title.dimmed().to_string()
        }
        NodeKind::Build(b) if b.succeeded == Some(false) => title.red().bold().to_string(),
        NodeKind::Build(_) | NodeKind::Project(_) => title.bold().to_string(),
        NodeKind::Target(t) if t.skipped => title.dimmed().to_string(),
        _ => title,
    };

    out.push_str(&"  ".repeat(level));
    out.push_str(&styled);
    if let Some(duration) = node.kind().duration_text() {
        out.push_str(&format!(" [{}]", duration).dimmed().to_string());
    }
    out.push('\n');

    for &child in node.children() {
        render_colored_node(tree, child, level + 1, out);
    }
}

// ==========================================
// Condition
// ==========================================

#[derive(Serialize)]
pub struct ConditionView<'a> {
    pub result: bool,
    pub rendered: String,
    pub nodes: &'a [buildscope_engine::ConditionNode],
}

impl<'a> ConditionView<'a> {
    pub fn new(tree: &'a ConditionTree) -> Self {
        Self {
            result: tree.result(),
            rendered: tree.render(),
            nodes: tree.nodes(),
        }
    }
}

pub fn render_condition(tree: &ConditionTree, color: bool) -> String {
    let verdict = if tree.result() { "true" } else { "false" };
    let verdict = match (color, tree.result()) {
        (false, _) => verdict.to_string(),
        (true, true) => verdict.green().to_string(),
        (true, false) => verdict.red().to_string(),
    };
    format!("{}\n=> {}\n", tree.render(), verdict)
}

// ==========================================
// Command line diff
// ==========================================

pub fn render_diff(diff: &CommandLineDiff, color: bool) -> String {
    let mut out = String::new();
    if diff.same_program() {
        out.push_str(&format!("program: {}\n", diff.left_program));
    } else {
        out.push_str(&format!("- program: {}\n", diff.left_program));
        out.push_str(&format!("+ program: {}\n", diff.right_program));
    }

    let describe = |p: &buildscope_engine::Parameter| match &p.prefix {
        Some(prefix) => format!("{} (after {})", p.text, prefix),
        None => p.text.clone(),
    };
    for param in &diff.left_only {
        let line = format!("- {}", describe(param));
        out.push_str(&if color { line.red().to_string() } else { line });
        out.push('\n');
    }
    for param in &diff.right_only {
        let line = format!("+ {}", describe(param));
        out.push_str(&if color { line.green().to_string() } else { line });
        out.push('\n');
    }
    out.push_str(&format!(
        "{} matched, {} only left, {} only right\n",
        diff.matched.len(),
        diff.left_only.len(),
        diff.right_only.len()
    ));
    out
}
