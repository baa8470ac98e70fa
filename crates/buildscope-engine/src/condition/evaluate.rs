use std::cmp::Ordering;

use super::ComparisonOperator;

/// One operand term split around its comparison operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Term<'a> {
    pub negated: bool,
    pub left: &'a str,
    pub comparison: Option<ComparisonOperator>,
    pub right: Option<&'a str>,
}

impl<'a> Term<'a> {
    pub fn operands(&self) -> impl Iterator<Item = &'a str> {
        std::iter::once(self.left).chain(self.right)
    }
}

/// Split `text` at the first comparison operator outside quotes and
/// parentheses. A leading `!` (but not `!=`) negates the term.
pub(super) fn analyze_term(text: &str) -> Term<'_> {
    let mut text = text.trim();
    let mut negated = false;
    if text.starts_with('!') && !text.starts_with("!=") {
        negated = true;
        text = text[1..].trim_start();
    }

    match find_comparison(text) {
        Some((at, op)) => Term {
            negated,
            left: text[..at].trim(),
            comparison: Some(op),
            right: Some(text[at + op.symbol().len()..].trim()),
        },
        None => Term {
            negated,
            left: text,
            comparison: None,
            right: None,
        },
    }
}

fn find_comparison(text: &str) -> Option<(usize, ComparisonOperator)> {
    let bytes = text.as_bytes();
    let mut quote: Option<u8> = None;
    let mut depth = 0usize;

    for (i, &b) in bytes.iter().enumerate() {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        let next = bytes.get(i + 1).copied();
        match b {
            b'\'' | b'"' => quote = Some(b),
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            b'=' if next == Some(b'=') => return Some((i, ComparisonOperator::EqEq)),
            b'=' => return Some((i, ComparisonOperator::Eq)),
            b'!' if next == Some(b'=') => return Some((i, ComparisonOperator::NotEq)),
            b'<' if next == Some(b'=') => return Some((i, ComparisonOperator::Le)),
            b'<' => return Some((i, ComparisonOperator::Lt)),
            b'>' if next == Some(b'=') => return Some((i, ComparisonOperator::Ge)),
            b'>' => return Some((i, ComparisonOperator::Gt)),
            _ => {}
        }
    }
    None
}

pub(super) fn evaluate_term(term: &Term<'_>) -> bool {
    let value = match (term.comparison, term.right) {
        (Some(op), Some(right)) => compare(unquote(term.left), op, unquote(right)),
        _ => evaluate_operand(term.left),
    };
    value != term.negated
}

fn unquote(text: &str) -> &str {
    let text = text.trim();
    for q in ['\'', '"'] {
        if text.len() >= 2 && text.starts_with(q) && text.ends_with(q) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

fn has_reference(text: &str) -> bool {
    text.contains("$(") || text.contains("@(") || text.contains("%(")
}

/// Argument of a call such as `Exists('...')`, when `text` is one
fn function_argument<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let open = text.find('(')?;
    if !text[..open].trim().eq_ignore_ascii_case(name) || !text.ends_with(')') {
        return None;
    }
    Some(text[open + 1..text.len() - 1].trim())
}

/// Bare operand: a boolean literal or one of the known functions.
///
/// Anything that cannot be decided from the text alone counts as true.
fn evaluate_operand(text: &str) -> bool {
    if function_argument(text, "Exists").is_some() {
        return true;
    }
    if let Some(arg) = function_argument(text, "HasTrailingSlash") {
        if has_reference(arg) {
            return true;
        }
        let arg = unquote(arg);
        return arg.ends_with('/') || arg.ends_with('\\');
    }
    parse_bool(unquote(text)).unwrap_or(true)
}

/// Boolean literal as accepted by build conditions
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" => Some(true),
        "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Compare two unquoted operands.
///
/// Dotted versions (two or more dots) compare component-wise, numbers compare
/// numerically, and anything else compares as case-insensitive text. Ordering
/// operators on plain text cannot be decided and count as true.
pub fn compare(left: &str, op: ComparisonOperator, right: &str) -> bool {
    let versions = (is_version(left) || is_version(right))
        .then(|| compare_versions(left, right))
        .flatten();
    let ordering = versions.or_else(|| match (parse_number(left), parse_number(right)) {
        (Some(l), Some(r)) => l.partial_cmp(&r),
        _ => None,
    });

    match ordering {
        Some(ordering) => apply(op, ordering),
        None => match op {
            ComparisonOperator::Eq | ComparisonOperator::EqEq => left.eq_ignore_ascii_case(right),
            ComparisonOperator::NotEq => !left.eq_ignore_ascii_case(right),
            _ => true,
        },
    }
}

fn apply(op: ComparisonOperator, ordering: Ordering) -> bool {
    match op {
        ComparisonOperator::Eq | ComparisonOperator::EqEq => ordering == Ordering::Equal,
        ComparisonOperator::NotEq => ordering != Ordering::Equal,
        ComparisonOperator::Lt => ordering == Ordering::Less,
        ComparisonOperator::Le => ordering != Ordering::Greater,
        ComparisonOperator::Gt => ordering == Ordering::Greater,
        ComparisonOperator::Ge => ordering != Ordering::Less,
    }
}

fn is_version(text: &str) -> bool {
    text.matches('.').count() >= 2
}

/// Component-wise comparison, missing components count as zero
fn compare_versions(left: &str, right: &str) -> Option<Ordering> {
    let parse = |s: &str| -> Option<Vec<u64>> {
        s.trim()
            .trim_start_matches(['v', 'V'])
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect()
    };
    let left = parse(left)?;
    let right = parse(right)?;

    let len = left.len().max(right.len());
    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return Some(other),
        }
    }
    Some(Ordering::Equal)
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, text.strip_prefix('+').unwrap_or(text)),
    };
    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        return i64::from_str_radix(hex, 16).ok().map(|v| sign * v as f64);
    }
    if !digits
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    digits.parse::<f64>().ok().map(|v| sign * v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_term() {
        let term = analyze_term("'$(Foo)'=='Bar'");
        assert_eq!(term.left, "'$(Foo)'");
        assert_eq!(term.comparison, Some(ComparisonOperator::EqEq));
        assert_eq!(term.right, Some("'Bar'"));
        assert!(!term.negated);

        let negated = analyze_term("!Exists('a=b')");
        assert!(negated.negated);
        assert_eq!(negated.comparison, None);
        assert_eq!(negated.left, "Exists('a=b')");

        let ne = analyze_term("'$(X)' != ''");
        assert_eq!(ne.comparison, Some(ComparisonOperator::NotEq));
        assert_eq!(ne.right, Some("''"));
    }

    #[test]
    fn test_version_comparison() {
        assert!(compare("1.2.3", ComparisonOperator::Ge, "1.2.0"));
        assert!(compare("1.10.0", ComparisonOperator::Gt, "1.9.9"));
        assert!(compare("2.0.0", ComparisonOperator::EqEq, "2.0.0.0"));
        assert!(!compare("1.2.3", ComparisonOperator::Lt, "1.2.3"));
    }

    #[test]
    fn test_numeric_and_text_comparison() {
        assert!(compare("10", ComparisonOperator::Gt, "9"));
        assert!(compare("0x10", ComparisonOperator::EqEq, "16"));
        assert!(compare("1.5", ComparisonOperator::Le, "1.50"));
        assert!(compare("Release", ComparisonOperator::EqEq, "release"));
        assert!(compare("Debug", ComparisonOperator::NotEq, "Release"));
        assert!(compare("abc", ComparisonOperator::Lt, "abd"));
        assert!(!compare("", ComparisonOperator::Eq, "x"));
    }

    #[test]
    fn test_operands() {
        assert!(evaluate_operand("'true'"));
        assert!(!evaluate_operand("off"));
        assert!(evaluate_operand("Exists('$(OutDir)')"));
        assert!(evaluate_operand("HasTrailingSlash('bin/')"));
        assert!(!evaluate_operand("HasTrailingSlash('bin')"));
        assert!(evaluate_operand("HasTrailingSlash('$(OutDir)')"));
        assert!(evaluate_operand("$(SomeFlag)"));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool(" FALSE "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
