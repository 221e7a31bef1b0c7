//! Property-based tests for the IR tokenizer
//!
//! The tokenizer must be total and lossless on any input, not just on
//! well-formed IR, so the strategies mix IR fragments with arbitrary text.

use passview::{tokenize, TokenKind};
use proptest::prelude::*;

/// Fragments that exercise every rule group
fn ir_fragment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "%[a-z0-9_]{1,6}",
        "@[a-z_][a-z0-9_.]{0,8}",
        "\\^bb[0-9]",
        "[0-9?]{1,2}x[0-9]{1,2}x",
        "-?[0-9]{1,4}(\\.[0-9]{1,3})?",
        "0x[0-9a-f]{1,4}",
        "\"[a-z ]{0,8}\"",
        "// [a-z ]{0,10}\n",
        "(func|return|constant|tensor|memref|i32|f64|index)",
        "[=<>{}\\[\\]()*.,!:]",
        "[ \t\n]{1,3}",
        "[a-z]{1,6}",
    ]
}

fn ir_text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(ir_fragment_strategy(), 0..40).prop_map(|parts| parts.concat())
}

fn assert_partition(source: &str) {
    let tokens = tokenize(source);
    let mut offset = 0;
    for token in &tokens {
        assert_eq!(token.offset, offset, "gap before {token:?}");
        assert!(!token.text.is_empty(), "empty token at {offset}");
        offset += token.text.len();
    }
    assert_eq!(offset, source.len());
    let rebuilt: String = tokens.iter().map(|t| t.text).collect();
    assert_eq!(rebuilt, source);
}

proptest! {
    #[test]
    fn test_arbitrary_text_is_partitioned(source in any::<String>()) {
        assert_partition(&source);
    }

    #[test]
    fn test_ir_text_is_partitioned(source in ir_text_strategy()) {
        assert_partition(&source);
    }

    #[test]
    fn test_tokenize_is_deterministic(source in ir_text_strategy()) {
        prop_assert_eq!(tokenize(&source), tokenize(&source));
    }

    #[test]
    fn test_variable_refs_are_recognised(name in "[a-z][a-z0-9_]{0,6}") {
        let source = format!("%{name}");
        let tokens = tokenize(&source);
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind, TokenKind::VariableRef);
    }
}

#[test]
fn test_function_snapshot() {
    let source = "func.func @add(%a: i32) -> i32 {\n  %0 = arith.addi %a, %a : i32\n  return %0 : i32 // done\n}";
    let summary: Vec<String> = tokenize(source)
        .into_iter()
        .filter(|t| t.kind != TokenKind::Whitespace)
        .map(|t| format!("{} {:?}", t.kind, t.text))
        .collect();
    insta::assert_snapshot!(summary.join("\n"), @r###"
    TypeKeyword "func"
    Punctuation "."
    TypeKeyword "func"
    FunctionRef "@add"
    Punctuation "("
    VariableRef "%a"
    Punctuation ":"
    Keyword "i32"
    Punctuation ")"
    Punctuation "->"
    Keyword "i32"
    Punctuation "{"
    VariableRef "%0"
    Punctuation "="
    Text "arith"
    Punctuation "."
    Text "addi"
    VariableRef "%a"
    Punctuation ","
    VariableRef "%a"
    Punctuation ":"
    Keyword "i32"
    Keyword "return"
    VariableRef "%0"
    Punctuation ":"
    Keyword "i32"
    Comment "// done\n"
    Punctuation "}"
    "###);
}
