//! Declarative rule groups for the IR tokenizer
//!
//! Rules are written as named groups. A group may include another group, in
//! which case the included rules are spliced in at the point of inclusion.
//! [`flatten`] resolves every include once, producing the single ordered list
//! the tokenizer scans with. Order matters: the first rule that matches at the
//! current offset wins, so more specific patterns must come first.

use super::TokenKind;

/// One entry in a rule group
#[derive(Debug, Clone, Copy)]
pub(super) enum Entry {
    /// A regex pattern and the kind it produces
    Rule(&'static str, TokenKind),
    /// Splice in the rules of another named group
    Include(&'static str),
}

use Entry::{Include, Rule};

/// Entry point group
const ROOT: &[Entry] = &[
    Include("whitespace"),
    Rule(r#"c?"[^"]*""#, TokenKind::String),
    // Block labels: ^bb0, ^bb1(%arg0: i32)
    Rule(r"\^[-a-zA-Z$._][\w\-$.]*\s*", TokenKind::Label),
    // Assignment targets: foo = ...
    Rule(r"[\w$.]+\s*=", TokenKind::Label),
    Include("keyword"),
    Rule(r"->", TokenKind::Punctuation),
    Rule(r"@[\w_][\w$.]*", TokenKind::FunctionRef),
    Rule(r"[%#][\w$.]+", TokenKind::VariableRef),
    // Shape dimensions: 4x8x, ?x16x
    Rule(r"([1-9?][\d?]*\s*x)+", TokenKind::Number),
    Rule(r"0[xX][a-fA-F0-9]+", TokenKind::Number),
    Rule(r"-?\d+(?:\.\d+)?(?:[eE][-+]?\d+(?:\.\d+)?)?", TokenKind::Number),
    Rule(r"[=<>{}\[\]()*.,!:]|x\b", TokenKind::Punctuation),
    Rule(r"\w+", TokenKind::Text),
];

const WHITESPACE: &[Entry] = &[
    Rule(r"\s+", TokenKind::Whitespace),
    Rule(r"//[^\n]*\n?", TokenKind::Comment),
];

const KEYWORD: &[Entry] = &[
    Rule(r"constant|return", TokenKind::Keyword),
    Rule(r"func|loc|memref|tensor|vector", TokenKind::TypeKeyword),
    Rule(r"bf16|f16|f32|f64|index", TokenKind::Keyword),
    Rule(r"i[1-9]\d*", TokenKind::Keyword),
];

/// Matches any single character; appended after every other rule so the
/// scanner always advances.
pub(super) const FALLBACK: &str = r"(?s).";

/// Look up a group by name
fn group(name: &str) -> &'static [Entry] {
    match name {
        "root" => ROOT,
        "whitespace" => WHITESPACE,
        "keyword" => KEYWORD,
        other => unreachable!("rule group '{other}' is not declared"),
    }
}

/// Resolve includes depth-first, keeping declaration order.
pub(super) fn flatten(name: &str) -> Vec<(&'static str, TokenKind)> {
    let mut out = Vec::new();
    flatten_into(group(name), &mut out);
    out.push((FALLBACK, TokenKind::Text));
    out
}

fn flatten_into(entries: &[Entry], out: &mut Vec<(&'static str, TokenKind)>) {
    for entry in entries {
        match *entry {
            Rule(pattern, kind) => out.push((pattern, kind)),
            Include(name) => flatten_into(group(name), out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_are_spliced_in_place() {
        let flat = flatten("root");
        assert_eq!(flat[0], (r"\s+", TokenKind::Whitespace));
        assert_eq!(flat[1].1, TokenKind::Comment);
        assert_eq!(flat[2].1, TokenKind::String);

        // keyword group sits right after the two label rules
        assert_eq!(flat[5], (r"constant|return", TokenKind::Keyword));
        assert_eq!(flat[8], (r"i[1-9]\d*", TokenKind::Keyword));
        assert_eq!(flat[9], (r"->", TokenKind::Punctuation));
    }

    #[test]
    fn fallback_is_last() {
        let flat = flatten("root");
        assert_eq!(flat.last(), Some(&(FALLBACK, TokenKind::Text)));
        assert_eq!(flat.len(), 2 + 11 + 4 + 1);
    }
}
