//! Priority-ordered tokenizer for MLIR-like IR text
//!
//! The tokenizer classifies text into lexical categories for highlighting. It
//! does not parse: there is no AST and no validation, only a left-to-right
//! scan that tries an ordered list of regex rules at each offset and takes the
//! first one that matches.
//!
//! Guarantees:
//!
//! - Total: every input produces a token sequence, malformed input included.
//!   A terminal single-character rule makes sure the scan always advances.
//! - Lossless: tokens are contiguous and non-overlapping, so concatenating
//!   their text reproduces the input byte for byte.
//! - Pure: the rule table is compiled once into a static and never mutated.
//!
//! The rule groups themselves live in [`rules`].

mod rules;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Lexical category of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TokenKind {
    Whitespace,
    Comment,
    String,
    Label,
    Keyword,
    TypeKeyword,
    FunctionRef,
    VariableRef,
    Number,
    Punctuation,
    Text,
}

impl TokenKind {
    /// Every kind, in declaration order
    pub const ALL: [TokenKind; 11] = [
        TokenKind::Whitespace,
        TokenKind::Comment,
        TokenKind::String,
        TokenKind::Label,
        TokenKind::Keyword,
        TokenKind::TypeKeyword,
        TokenKind::FunctionRef,
        TokenKind::VariableRef,
        TokenKind::Number,
        TokenKind::Punctuation,
        TokenKind::Text,
    ];

    /// Short CSS class name, following the usual highlighter conventions
    pub fn css_class(&self) -> &'static str {
        match self {
            TokenKind::Whitespace => "w",
            TokenKind::Comment => "c1",
            TokenKind::String => "s",
            TokenKind::Label => "nl",
            TokenKind::Keyword => "k",
            TokenKind::TypeKeyword => "kt",
            TokenKind::FunctionRef => "nf",
            TokenKind::VariableRef => "nv",
            TokenKind::Number => "m",
            TokenKind::Punctuation => "p",
            TokenKind::Text => "n",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A classified slice of the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    /// Byte offset of `text` in the source
    pub offset: usize,
}

impl<'src> Token<'src> {
    /// Byte range covered by this token
    pub fn span(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.text.len()
    }
}

/// A compiled rule, anchored at the start of the remaining input
struct CompiledRule {
    kind: TokenKind,
    regex: Regex,
}

impl CompiledRule {
    /// Length of a non-empty match at the start of `rest`
    fn match_len(&self, rest: &str) -> Option<usize> {
        self.regex
            .find(rest)
            .map(|m| m.end())
            .filter(|&len| len > 0)
    }
}

static RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| {
    rules::flatten("root")
        .into_iter()
        .map(|(pattern, kind)| CompiledRule {
            kind,
            regex: Regex::new(&format!(r"\A(?:{pattern})")).unwrap(),
        })
        .collect()
});

/// The flattened rule table, highest priority first.
///
/// Exposed for diagnostics (`passview styles --rules`) and tests.
pub fn rule_table() -> impl Iterator<Item = (TokenKind, &'static str)> {
    RULES.iter().map(|rule| {
        let pattern = rule.regex.as_str();
        (rule.kind, &pattern[r"\A(?:".len()..pattern.len() - 1])
    })
}

/// Tokenize `text` into an exact, gap-free partition of classified slices.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut offset = 0;

    while offset < text.len() {
        let rest = &text[offset..];
        let (kind, len) = RULES
            .iter()
            .find_map(|rule| rule.match_len(rest).map(|len| (rule.kind, len)))
            .unwrap_or_else(|| (TokenKind::Text, next_char_len(rest)));

        tokens.push(Token {
            kind,
            text: &rest[..len],
            offset,
        });
        offset += len;
    }

    tokens
}

fn next_char_len(rest: &str) -> usize {
    rest.chars().next().map_or(rest.len(), char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_text(source: &str) -> Vec<(TokenKind, &str)> {
        tokenize(source).into_iter().map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_function_signature() {
        use TokenKind::*;
        let tokens = kinds_and_text("func @foo() -> i32 { return 0 }");
        assert_eq!(
            tokens,
            vec![
                (TypeKeyword, "func"),
                (Whitespace, " "),
                (FunctionRef, "@foo"),
                (Punctuation, "("),
                (Punctuation, ")"),
                (Whitespace, " "),
                (Punctuation, "->"),
                (Whitespace, " "),
                (Keyword, "i32"),
                (Whitespace, " "),
                (Punctuation, "{"),
                (Whitespace, " "),
                (Keyword, "return"),
                (Whitespace, " "),
                (Number, "0"),
                (Whitespace, " "),
                (Punctuation, "}"),
            ]
        );
    }

    #[test]
    fn test_offsets_are_contiguous() {
        let source = "%0 = arith.addi %a, %b : i64\n";
        let tokens = tokenize(source);
        let mut expected = 0;
        for token in &tokens {
            assert_eq!(token.offset, expected);
            assert_eq!(&source[token.span()], token.text);
            expected += token.text.len();
        }
        assert_eq!(expected, source.len());
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        use TokenKind::*;
        let tokens = kinds_and_text("// note\n%x");
        assert_eq!(tokens, vec![(Comment, "// note\n"), (VariableRef, "%x")]);
    }

    #[test]
    fn test_comment_without_trailing_newline() {
        let tokens = kinds_and_text("// eof");
        assert_eq!(tokens, vec![(TokenKind::Comment, "// eof")]);
    }

    #[test]
    fn test_block_label_takes_trailing_space() {
        let tokens = kinds_and_text("^bb1 (");
        assert_eq!(tokens[0], (TokenKind::Label, "^bb1 "));
        assert_eq!(tokens[1], (TokenKind::Punctuation, "("));
    }

    #[test]
    fn test_assignment_target_is_label() {
        let tokens = kinds_and_text("sym_name = \"main\"");
        assert_eq!(tokens[0], (TokenKind::Label, "sym_name ="));
        assert_eq!(tokens[2], (TokenKind::String, "\"main\""));
    }

    #[test]
    fn test_tensor_shape() {
        use TokenKind::*;
        let tokens = kinds_and_text("tensor<4x?xf32>");
        assert_eq!(
            tokens,
            vec![
                (TypeKeyword, "tensor"),
                (Punctuation, "<"),
                (Number, "4x?x"),
                (Keyword, "f32"),
                (Punctuation, ">"),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        use TokenKind::*;
        assert_eq!(kinds_and_text("0x1F"), vec![(Number, "0x1F")]);
        assert_eq!(kinds_and_text("-2.5e-3"), vec![(Number, "-2.5e-3")]);
        assert_eq!(kinds_and_text("1.0"), vec![(Number, "1.0")]);
    }

    #[test]
    fn test_unmatched_characters_fall_back_to_single_text_tokens() {
        use TokenKind::*;
        let tokens = kinds_and_text("$~é");
        assert_eq!(tokens, vec![(Text, "$"), (Text, "~"), (Text, "é")]);
    }

    #[test]
    fn test_first_match_wins_over_longest() {
        // `return` is a keyword even when it prefixes a longer word
        let tokens = kinds_and_text("returned");
        assert_eq!(
            tokens,
            vec![(TokenKind::Keyword, "return"), (TokenKind::Text, "ed")]
        );
    }

    #[test]
    fn test_rule_table_strips_anchor() {
        let (kind, pattern) = rule_table().next().unwrap();
        assert_eq!(kind, TokenKind::Whitespace);
        assert_eq!(pattern, r"\s+");
    }
}
