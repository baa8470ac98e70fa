use super::evaluate::{analyze_term, evaluate_term};
use super::{ConditionNode, ConditionNodeKind, ConditionTree, LogicalOperator};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open { negated: bool },
    Close,
    And,
    Or,
    Term(String),
}

/// Split a condition into parentheses, keywords and operand terms.
///
/// Quoted text and parentheses that belong to a term (function calls such as
/// `Exists(...)`, references such as `$(Prop)`) stay inside the term. Closing
/// parentheses with no matching open one are dropped.
fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '(' {
            depth += 1;
            tokens.push(Token::Open { negated: false });
            i += 1;
            continue;
        }
        if c == '!' {
            let next = skip_whitespace(&chars, i + 1);
            if chars.get(next) == Some(&'(') {
                depth += 1;
                tokens.push(Token::Open { negated: true });
                i = next + 1;
                continue;
            }
        }
        if c == ')' {
            if depth > 0 {
                depth -= 1;
                tokens.push(Token::Close);
            }
            i += 1;
            continue;
        }
        if let Some((op, len)) = keyword_at(&chars, i) {
            tokens.push(op);
            i += len;
            continue;
        }

        let end = scan_term(&chars, i);
        let term: String = chars[i..end].iter().collect();
        tokens.push(Token::Term(term.trim().to_string()));
        i = end;
    }

    tokens
}

fn skip_whitespace(chars: &[char], mut i: usize) -> usize {
    while chars.get(i).is_some_and(|c| c.is_whitespace()) {
        i += 1;
    }
    i
}

/// `and` / `or` starting at `i`, recognized only as a whole word
fn keyword_at(chars: &[char], i: usize) -> Option<(Token, usize)> {
    // Callers only ask outside quotes, so a quote before `i` closes a string
    let boundary_before =
        i == 0 || chars[i - 1].is_whitespace() || matches!(chars[i - 1], ')' | '\'' | '"');
    if !boundary_before {
        return None;
    }
    let matches = |word: &str| {
        let len = word.len();
        if i + len > chars.len() {
            return false;
        }
        let candidate: String = chars[i..i + len].iter().collect();
        let boundary_after = chars
            .get(i + len)
            .is_none_or(|c| c.is_whitespace() || *c == '(' || *c == '\'' || *c == '"');
        candidate.eq_ignore_ascii_case(word) && boundary_after
    };

    if matches("and") {
        Some((Token::And, 3))
    } else if matches("or") {
        Some((Token::Or, 2))
    } else {
        None
    }
}

/// End of the operand term starting at `start`
fn scan_term(chars: &[char], start: usize) -> usize {
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut i = start;

    while i < chars.len() {
        let c = chars[i];
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' if depth > 0 => depth -= 1,
                ')' => return i,
                _ if depth == 0 && i > start && keyword_at(chars, i).is_some() => return i,
                _ => {}
            },
        }
        i += 1;
    }
    i
}

/// Intermediate syntax tree, lowered into the preorder arena afterwards
#[derive(Debug)]
enum Ast {
    Group {
        negated: bool,
        explicit: bool,
        operator: Option<LogicalOperator>,
        items: Vec<Ast>,
    },
    Term(String),
}

impl Ast {
    fn empty() -> Self {
        Ast::Group {
            negated: false,
            explicit: false,
            operator: None,
            items: Vec::new(),
        }
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn parse_or(&mut self) -> Ast {
        self.parse_chain(LogicalOperator::Or)
    }

    fn parse_and(&mut self) -> Ast {
        self.parse_chain(LogicalOperator::And)
    }

    /// One precedence level: operands separated by `operator`
    fn parse_chain(&mut self, operator: LogicalOperator) -> Ast {
        let keyword = match operator {
            LogicalOperator::Or => Token::Or,
            LogicalOperator::And => Token::And,
        };
        let mut items = vec![self.parse_operand(operator)];
        while self.peek() == Some(&keyword) {
            self.pos += 1;
            items.push(self.parse_operand(operator));
        }

        if items.len() == 1 {
            items.remove(0)
        } else {
            Ast::Group {
                negated: false,
                explicit: false,
                operator: Some(operator),
                items,
            }
        }
    }

    fn parse_operand(&mut self, level: LogicalOperator) -> Ast {
        match level {
            LogicalOperator::Or => self.parse_and(),
            LogicalOperator::And => self.parse_factor(),
        }
    }

    fn parse_factor(&mut self) -> Ast {
        match self.peek().cloned() {
            Some(Token::Term(text)) => {
                self.pos += 1;
                Ast::Term(text)
            }
            Some(Token::Open { negated }) => {
                self.pos += 1;
                let inner = self.parse_or();
                // A missing `)` at the end of input is tolerated
                if self.peek() == Some(&Token::Close) {
                    self.pos += 1;
                }
                match inner {
                    Ast::Group {
                        negated: false,
                        explicit: false,
                        operator,
                        items,
                    } => Ast::Group {
                        negated,
                        explicit: true,
                        operator,
                        items,
                    },
                    other => Ast::Group {
                        negated,
                        explicit: true,
                        operator: None,
                        items: vec![other],
                    },
                }
            }
            // Missing operand: an empty group, which evaluates to true
            Some(Token::And | Token::Or | Token::Close) | None => Ast::empty(),
        }
    }
}

pub(super) fn parse(text: &str) -> ConditionTree {
    let mut parser = Parser {
        tokens: tokenize(text),
        pos: 0,
    };
    let mut ast = parser.parse_or();
    // Operands placed side by side without a keyword, as in `(a) (b)`
    while parser.pos < parser.tokens.len() {
        let before = parser.pos;
        let rest = parser.parse_or();
        if parser.pos == before {
            parser.pos += 1;
            continue;
        }
        ast = match ast {
            Ast::Group {
                negated: false,
                explicit: false,
                operator: None,
                mut items,
            } => {
                items.push(rest);
                Ast::Group {
                    negated: false,
                    explicit: false,
                    operator: None,
                    items,
                }
            }
            other => Ast::Group {
                negated: false,
                explicit: false,
                operator: None,
                items: vec![other, rest],
            },
        };
    }

    let root = match ast {
        group @ Ast::Group {
            explicit: false,
            negated: false,
            ..
        } => group,
        other => Ast::Group {
            negated: false,
            explicit: false,
            operator: None,
            items: vec![other],
        },
    };

    let mut nodes = Vec::new();
    lower(root, None, 0, &mut nodes);
    ConditionTree { nodes }
}

fn push(nodes: &mut Vec<ConditionNode>, node: ConditionNode) -> usize {
    let index = nodes.len();
    if let Some(parent) = node.parent {
        nodes[parent].children.push(index);
    }
    nodes.push(node);
    index
}

/// Append `ast` in preorder and return its index. A group's result is folded
/// from its children as soon as the last child has been lowered.
fn lower(ast: Ast, parent: Option<usize>, level: usize, nodes: &mut Vec<ConditionNode>) -> usize {
    match ast {
        Ast::Group {
            negated,
            explicit,
            operator,
            items,
        } => {
            let index = push(
                nodes,
                ConditionNode {
                    kind: ConditionNodeKind::Group,
                    text: String::new(),
                    result: true,
                    operator,
                    comparison: None,
                    negated,
                    explicit,
                    level,
                    parent,
                    children: Vec::new(),
                },
            );
            let results: Vec<bool> = items
                .into_iter()
                .map(|item| {
                    let child = lower(item, Some(index), level + 1, nodes);
                    nodes[child].result
                })
                .collect();

            let folded = match operator {
                Some(LogicalOperator::Or) => results.iter().any(|&r| r),
                Some(LogicalOperator::And) | None => results.iter().all(|&r| r),
            };
            nodes[index].result = folded != negated;
            index
        }
        Ast::Term(text) => {
            let term = analyze_term(&text);
            let result = evaluate_term(&term);
            let index = push(
                nodes,
                ConditionNode {
                    kind: ConditionNodeKind::Expression,
                    text: String::new(),
                    result,
                    operator: None,
                    comparison: term.comparison,
                    negated: term.negated,
                    explicit: false,
                    level,
                    parent,
                    children: Vec::new(),
                },
            );
            for operand in term.operands() {
                push(
                    nodes,
                    ConditionNode {
                        kind: ConditionNodeKind::Literal,
                        text: operand.to_string(),
                        result,
                        operator: None,
                        comparison: None,
                        negated: false,
                        explicit: false,
                        level: level + 1,
                        parent: Some(index),
                        children: Vec::new(),
                    },
                );
            }
            index
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(s: &str) -> Token {
        Token::Term(s.to_string())
    }

    #[test]
    fn test_tokenize_keeps_function_calls_whole() {
        assert_eq!(
            tokenize("Exists('$(Dir)') and !HasTrailingSlash('$(Out)')"),
            vec![
                term("Exists('$(Dir)')"),
                Token::And,
                term("!HasTrailingSlash('$(Out)')"),
            ]
        );
    }

    #[test]
    fn test_tokenize_groups_and_keywords() {
        assert_eq!(
            tokenize("!( 'a' == 'b' )OR(true)"),
            vec![
                Token::Open { negated: true },
                term("'a' == 'b'"),
                Token::Close,
                Token::Or,
                Token::Open { negated: false },
                term("true"),
                Token::Close,
            ]
        );
    }

    #[test]
    fn test_tokenize_keyword_right_after_closing_quote() {
        assert_eq!(
            tokenize("'a'=='b'or'c'=='c'"),
            vec![term("'a'=='b'"), Token::Or, term("'c'=='c'")]
        );
        assert_eq!(
            tokenize("'x'and'y'"),
            vec![term("'x'"), Token::And, term("'y'")]
        );
        assert_eq!(tokenize("'or'=='or'"), vec![term("'or'=='or'")]);
    }

    #[test]
    fn test_unspaced_keywords_evaluate() {
        assert!(super::super::evaluate("'a'=='b'or'c'=='c'"));
        assert!(!super::super::evaluate("'a'=='a'and\"b\"==\"c\""));

        let tree = ConditionTree::parse("'a'=='b'or'c'=='c'");
        assert_eq!(tree.render(), "'a' == 'b' or 'c' == 'c'");
    }

    #[test]
    fn test_tokenize_ignores_keywords_inside_words_and_quotes() {
        assert_eq!(
            tokenize("'$(Brand)' == 'cats and dogs'"),
            vec![term("'$(Brand)' == 'cats and dogs'")]
        );
        assert_eq!(tokenize("Sandbox"), vec![term("Sandbox")]);
    }

    #[test]
    fn test_unbalanced_parentheses_degrade() {
        assert!(parse("(true").result());
        assert!(parse("true)").result());
        assert!(!parse("((false)").result());
    }

    #[test]
    fn test_missing_operand_is_true() {
        assert!(parse("true and").result());
        assert!(parse("or").result());
    }
}
