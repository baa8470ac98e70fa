use buildscope_types::{Error, Result};

use super::{ConditionTree, EXPLAIN_ARROW};

/// Annotate the unevaluated condition with the values it evaluated to.
///
/// Both texts must parse to the same shape. Each literal whose text changed
/// by substitution becomes `unevaluated ➔ evaluated`, and every node takes
/// the result computed from the evaluated text.
pub fn explain(unevaluated: &str, evaluated: &str) -> Result<ConditionTree> {
    let mut tree = ConditionTree::parse(unevaluated);
    let resolved = ConditionTree::parse(evaluated);

    let mismatch = || Error::ConditionShapeMismatch {
        unevaluated: unevaluated.to_string(),
        evaluated: evaluated.to_string(),
    };

    if tree.len() != resolved.len() {
        return Err(mismatch());
    }

    for (node, other) in tree.nodes_mut().iter_mut().zip(resolved.nodes()) {
        if node.kind != other.kind || node.children.len() != other.children.len() {
            return Err(mismatch());
        }
        if !node.text.is_empty() && node.text != other.text {
            node.text = format!("{}{}{}", node.text, EXPLAIN_ARROW, other.text);
        }
        node.result = other.result;
    }

    Ok(tree)
}
