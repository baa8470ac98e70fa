use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static EXE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\.exe\b").unwrap());

/// Split on whitespace outside double quotes.
///
/// `"` toggles quoting and is dropped; `\"` yields a literal quote.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
                in_token = true;
            }
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// One argument, tagged with the switch that precedes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl Parameter {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            prefix: None,
        }
    }

    pub fn is_switch(&self) -> bool {
        is_switch(&self.text)
    }
}

fn is_switch(token: &str) -> bool {
    token.starts_with('/') || token.starts_with('-')
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandLine {
    pub program: String,
    pub parameters: Vec<Parameter>,
}

impl CommandLine {
    /// Split a command line into the program and its tagged parameters.
    ///
    /// A leading quoted token is the program. Otherwise everything up to the
    /// first `.exe` is, so unquoted paths with spaces survive; failing that the
    /// first token is.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (program, rest) = if line.starts_with('"') {
            let mut tokens = tokenize(line);
            let program = if tokens.is_empty() {
                String::new()
            } else {
                tokens.remove(0)
            };
            (program, tokens)
        } else if let Some(m) = EXE_REGEX.find(line) {
            (line[..m.end()].to_string(), tokenize(&line[m.end()..]))
        } else {
            let mut tokens = tokenize(line);
            let program = if tokens.is_empty() {
                String::new()
            } else {
                tokens.remove(0)
            };
            (program, tokens)
        };

        Self {
            program,
            parameters: tag_prefixes(rest),
        }
    }
}

/// A non-switch token directly after a switch takes that switch as prefix.
/// Each switch prefixes at most one token.
fn tag_prefixes(tokens: Vec<String>) -> Vec<Parameter> {
    let mut pending: Option<String> = None;
    tokens
        .into_iter()
        .map(|text| {
            if is_switch(&text) {
                pending = Some(text.clone());
                Parameter::new(text)
            } else {
                Parameter {
                    text,
                    prefix: pending.take(),
                }
            }
        })
        .collect()
}
