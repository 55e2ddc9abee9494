//! Property-based tests for the tokenizer, extraction engine and binder
//!
//! Uses proptest to generate inputs and check the pipeline never panics and
//! keeps its structural guarantees.

use argbind::{ArgParser, ParameterSpec, SemanticType, extract, tokenize};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Strategies for generating command-line-like input
mod strategies {
    use proptest::prelude::*;

    /// Arbitrary strings, quotes and escapes included
    pub fn arbitrary_string() -> impl Strategy<Value = String> {
        prop::string::string_regex(".{0,100}").unwrap()
    }

    /// Keyword names
    pub fn identifier() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_]{0,20}").unwrap()
    }

    /// Bare words: no whitespace, quotes, escapes or `=`
    pub fn word() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-zA-Z0-9_./:-]{1,30}").unwrap()
    }

    /// Text safe inside single quotes
    pub fn quoted_body() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-zA-Z0-9 =\"._-]{1,30}").unwrap()
    }

    /// Whitespace runs between words
    pub fn separator() -> impl Strategy<Value = String> {
        prop::string::string_regex("[ \t]{1,4}").unwrap()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Tokenizer returns Ok or Err, never panics
    #[test]
    fn tokenizer_never_panics(input in strategies::arbitrary_string()) {
        let _ = tokenize(&input);
    }

    /// Full pipeline never panics on arbitrary input
    #[test]
    fn parser_never_panics(input in strategies::arbitrary_string()) {
        let spec = ParameterSpec::new()
            .keyword("n", SemanticType::Integer, 0)
            .var_args()
            .var_kwargs();
        let _ = ArgParser::new().parse(&input, &spec);
    }

    /// Extraction never panics on arbitrary entries
    #[test]
    fn extraction_never_panics(entries in prop::collection::vec(strategies::arbitrary_string(), 0..8)) {
        let _ = extract(&entries);
    }

    /// Successful tokenization never yields empty words
    #[test]
    fn no_empty_tokens(input in strategies::arbitrary_string()) {
        if let Ok(tokens) = tokenize(&input) {
            prop_assert!(tokens.iter().all(|t| !t.is_empty()));
        }
    }

    /// Bare words separated by any whitespace come back unchanged
    #[test]
    fn bare_words_round_trip(
        words in prop::collection::vec(strategies::word(), 0..10),
        sep in strategies::separator(),
    ) {
        let line = words.join(sep.as_str());
        prop_assert_eq!(tokenize(&line).unwrap(), words);
    }

    /// Re-tokenizing the single-space join of bare tokens is stable
    #[test]
    fn retokenize_is_idempotent(words in prop::collection::vec(strategies::word(), 0..10)) {
        let first = tokenize(&words.join("  ")).unwrap();
        let second = tokenize(&first.join(" ")).unwrap();
        prop_assert_eq!(first, second);
    }

    /// A single-quoted span is one word with its inner text intact
    #[test]
    fn quoted_span_is_one_word(body in strategies::quoted_body()) {
        let tokens = tokenize(&format!("cmd '{body}' tail")).unwrap();
        prop_assert_eq!(tokens, vec!["cmd".to_string(), body, "tail".to_string()]);
    }

    /// Every keyword spelling recovers the same assignments
    #[test]
    fn keywords_are_extracted(
        positionals in prop::collection::vec(strategies::word(), 0..4),
        keywords in prop::collection::btree_map(strategies::identifier(), strategies::word(), 0..5),
        spaced in any::<bool>(),
    ) {
        let mut entries = positionals.clone();
        for (name, value) in &keywords {
            if spaced {
                entries.extend([name.clone(), "=".to_string(), value.clone()]);
            } else {
                entries.push(format!("{name}={value}"));
            }
        }

        let raw = extract(&entries).unwrap();
        prop_assert_eq!(raw.positionals, positionals);
        prop_assert_eq!(raw.keywords, keywords);
    }

    /// Integer slots round-trip any i64
    #[test]
    fn integer_slots_bind(n in any::<i64>(), retries in any::<i64>()) {
        let spec = ParameterSpec::new()
            .positional(SemanticType::Integer)
            .keyword("retries", SemanticType::Integer, 0);
        let typed = ArgParser::new()
            .parse(&format!("{n} retries={retries}"), &spec)
            .unwrap();
        prop_assert_eq!(&typed.positionals, &vec![serde_json::json!(n)]);
        prop_assert_eq!(typed.get("retries"), Some(&serde_json::json!(retries)));
    }

    /// Binding never produces more positionals than entered
    #[test]
    fn bind_respects_capacity(words in prop::collection::vec(strategies::word(), 0..6)) {
        let spec = ParameterSpec::new()
            .positional(SemanticType::Text)
            .keyword("a", SemanticType::Text, "")
            .keyword("b", SemanticType::Text, "");
        let keywords = BTreeMap::new();
        let result = argbind::bind(&words, &keywords, &spec, &Default::default());
        match words.len() {
            1..=3 => {
                let typed = result.unwrap();
                prop_assert_eq!(typed.positionals.len(), 1);
                prop_assert_eq!(typed.keywords.len(), 2);
            }
            _ => prop_assert!(result.is_err()),
        }
    }
}
