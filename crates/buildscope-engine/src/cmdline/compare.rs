use buildscope_types::{NodeId, NodeKind, Tree};
use serde::Serialize;

use super::tokenizer::{CommandLine, Parameter};

/// Semantic difference between two invocations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandLineDiff {
    pub left_program: String,
    pub right_program: String,
    /// Index pairs (left, right) of parameters considered the same
    pub matched: Vec<(usize, usize)>,
    pub left_only: Vec<Parameter>,
    pub right_only: Vec<Parameter>,
}

impl CommandLineDiff {
    pub fn same_program(&self) -> bool {
        self.left_program.eq_ignore_ascii_case(&self.right_program)
    }

    pub fn is_identical(&self) -> bool {
        self.same_program() && self.left_only.is_empty() && self.right_only.is_empty()
    }
}

/// Diff two command lines. Returns `None` when either side is blank.
pub fn try_compare(left: &str, right: &str) -> Option<CommandLineDiff> {
    if left.trim().is_empty() || right.trim().is_empty() {
        return None;
    }
    Some(compare(&CommandLine::parse(left), &CommandLine::parse(right)))
}

/// Match parameters in three passes, each over what the previous left over:
/// same position with same text and prefix, then same text and prefix at any
/// position, then same text alone.
pub fn compare(left: &CommandLine, right: &CommandLine) -> CommandLineDiff {
    let l = &left.parameters;
    let r = &right.parameters;
    let mut left_match: Vec<Option<usize>> = vec![None; l.len()];
    let mut right_taken = vec![false; r.len()];

    for i in 0..l.len().min(r.len()) {
        if l[i] == r[i] {
            left_match[i] = Some(i);
            right_taken[i] = true;
        }
    }

    match_remaining(l, r, &mut left_match, &mut right_taken, |a, b| a == b);
    match_remaining(l, r, &mut left_match, &mut right_taken, |a, b| a.text == b.text);

    let mut matched: Vec<(usize, usize)> = left_match
        .iter()
        .enumerate()
        .filter_map(|(i, m)| m.map(|j| (i, j)))
        .collect();
    matched.sort_unstable();

    CommandLineDiff {
        left_program: left.program.clone(),
        right_program: right.program.clone(),
        matched,
        left_only: l
            .iter()
            .zip(&left_match)
            .filter(|(_, m)| m.is_none())
            .map(|(p, _)| p.clone())
            .collect(),
        right_only: r
            .iter()
            .zip(&right_taken)
            .filter(|(_, taken)| !**taken)
            .map(|(p, _)| p.clone())
            .collect(),
    }
}

fn match_remaining<F>(
    left: &[Parameter],
    right: &[Parameter],
    left_match: &mut [Option<usize>],
    right_taken: &mut [bool],
    same: F,
) where
    F: Fn(&Parameter, &Parameter) -> bool,
{
    for (i, param) in left.iter().enumerate() {
        if left_match[i].is_some() {
            continue;
        }
        let candidate = right
            .iter()
            .enumerate()
            .find(|&(j, other)| !right_taken[j] && same(param, other));
        if let Some((j, _)) = candidate {
            left_match[i] = Some(j);
            right_taken[j] = true;
        }
    }
}

/// Diff the recorded command lines of two task nodes.
///
/// `None` if either node is not a task or ran without a recorded command line.
pub fn compare_tasks(tree: &Tree, a: NodeId, b: NodeId) -> Option<CommandLineDiff> {
    let command_line = |id: NodeId| match tree.get(id).map(|n| n.kind()) {
        Some(NodeKind::Task(task)) => task.command_line.clone(),
        _ => None,
    };
    let left = command_line(a)?;
    let right = command_line(b)?;
    try_compare(&left, &right)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(params: &[Parameter]) -> Vec<&str> {
        params.iter().map(|p| p.text.as_str()).collect()
    }

    #[test]
    fn test_reordered_switch_pairs_match() {
        let diff = try_compare("foo.exe -x 1 -y 2", "foo.exe -y 2 -x 1").unwrap();
        assert!(diff.left_only.is_empty());
        assert!(diff.right_only.is_empty());
        assert_eq!(diff.matched, vec![(0, 2), (1, 3), (2, 0), (3, 1)]);
        assert!(diff.is_identical());
    }

    #[test]
    fn test_changed_switch() {
        let diff = try_compare("cl.exe -O2", "cl.exe -O3").unwrap();
        assert_eq!(texts(&diff.left_only), vec!["-O2"]);
        assert_eq!(texts(&diff.right_only), vec!["-O3"]);
        assert_eq!(diff.left_only[0].prefix, None);
        assert!(!diff.is_identical());
    }

    #[test]
    fn test_prefix_ignored_in_last_pass() {
        // "a.cs" follows a different switch on each side but still matches
        let diff = try_compare("csc.exe -debug a.cs", "csc.exe a.cs -debug").unwrap();
        assert!(diff.left_only.is_empty());
        assert!(diff.right_only.is_empty());
    }

    #[test]
    fn test_value_change_keeps_prefix() {
        let diff = try_compare("link.exe -out a.dll", "link.exe -out b.dll").unwrap();
        assert_eq!(diff.matched, vec![(0, 0)]);
        assert_eq!(diff.left_only[0].prefix.as_deref(), Some("-out"));
        assert_eq!(texts(&diff.right_only), vec!["b.dll"]);
    }

    #[test]
    fn test_blank_side_is_not_comparable() {
        assert!(try_compare("", "cl.exe").is_none());
        assert!(try_compare("cl.exe", "  ").is_none());
    }

    #[test]
    fn test_different_programs_are_reported() {
        let diff = try_compare("gcc -c x.c", "clang -c x.c").unwrap();
        assert!(!diff.same_program());
        assert!(diff.left_only.is_empty());
        assert!(!diff.is_identical());
    }
}
