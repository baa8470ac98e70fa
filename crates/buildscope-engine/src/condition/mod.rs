//! Build condition expressions: parsing, evaluation, and explanation.
//!
//! A condition such as `'$(Configuration)' == 'Release' and Exists('obj')`
//! is parsed into a flat preorder arena (`ConditionTree`). Every node carries
//! the boolean result computed when its group closed. `explain` pairs the
//! unevaluated text with its property-substituted counterpart to show which
//! value made the condition pass or fail.

mod evaluate;
mod explain;
mod parser;

pub use evaluate::{compare, parse_bool};
pub use explain::explain;

use serde::Serialize;
use std::fmt;

/// Separator placed between the unevaluated and evaluated text of a literal
pub const EXPLAIN_ARROW: &str = " ➔ ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionNodeKind {
    /// Parenthesized or implicit group combining its children
    Group,
    /// One comparison or bare operand
    Expression,
    /// Operand text of an expression
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn keyword(self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    Eq,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::EqEq => "==",
            ComparisonOperator::NotEq => "!=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Le => "<=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Ge => ">=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionNode {
    pub kind: ConditionNodeKind,
    /// Operand text for literals, empty for groups and expressions
    pub text: String,
    pub result: bool,
    /// How a group combines its children; `None` for a single child
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<LogicalOperator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonOperator>,
    /// Leading `!`
    pub negated: bool,
    /// Group written with parentheses in the source text
    pub explicit: bool,
    pub level: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Parsed condition, nodes stored in preorder with the root group at index 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionTree {
    nodes: Vec<ConditionNode>,
}

impl ConditionTree {
    /// Parse and evaluate `text`. Never fails: unevaluable parts count as true.
    pub fn parse(text: &str) -> Self {
        parser::parse(text)
    }

    pub fn result(&self) -> bool {
        self.nodes.first().is_none_or(|root| root.result)
    }

    pub fn root(&self) -> &ConditionNode {
        &self.nodes[0]
    }

    pub fn nodes(&self) -> &[ConditionNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&ConditionNode> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Literal operands in source order
    pub fn literals(&self) -> impl Iterator<Item = &ConditionNode> {
        self.nodes
            .iter()
            .filter(|n| n.kind == ConditionNodeKind::Literal)
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [ConditionNode] {
        &mut self.nodes
    }

    /// Expression text rebuilt from the tree, with normalized spacing
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.nodes.is_empty() {
            self.render_node(0, &mut out);
        }
        out
    }

    fn render_node(&self, index: usize, out: &mut String) {
        let node = &self.nodes[index];
        if node.negated {
            out.push('!');
        }
        match node.kind {
            ConditionNodeKind::Literal => out.push_str(&node.text),
            ConditionNodeKind::Expression => {
                for (i, &child) in node.children.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                        if let Some(op) = node.comparison {
                            out.push_str(op.symbol());
                        }
                        out.push(' ');
                    }
                    self.render_node(child, out);
                }
            }
            ConditionNodeKind::Group => {
                if node.explicit {
                    out.push('(');
                }
                let separator = match node.operator {
                    Some(op) => format!(" {} ", op.keyword()),
                    None => " ".to_string(),
                };
                for (i, &child) in node.children.iter().enumerate() {
                    if i > 0 {
                        out.push_str(&separator);
                    }
                    self.render_node(child, out);
                }
                if node.explicit {
                    out.push(')');
                }
            }
        }
    }
}

impl fmt::Display for ConditionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Shortcut for `ConditionTree::parse(text).result()`
pub fn evaluate(text: &str) -> bool {
    ConditionTree::parse(text).result()
}
