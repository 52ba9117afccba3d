//! Tests for the structured-literal parser

use serde_json::json;

use super::*;

#[test]
fn test_python_dict_with_single_quotes() {
    let parsed = parse_literal("{'intent': 'weather', 'score': 0.92}").unwrap();
    assert_eq!(parsed, json!({"intent": "weather", "score": 0.92}));
}

#[test]
fn test_python_constants() {
    let parsed = parse_literal("{'ok': True, 'failed': False, 'extra': None}").unwrap();
    assert_eq!(parsed, json!({"ok": true, "failed": false, "extra": null}));
}

#[test]
fn test_json_spellings_accepted() {
    let parsed = parse_literal(r#"{"ok": true, "extra": null}"#).unwrap();
    assert_eq!(parsed, json!({"ok": true, "extra": null}));
}

#[test]
fn test_tuple_decodes_as_array() {
    let parsed = parse_literal("('a', 1, 2.5)").unwrap();
    assert_eq!(parsed, json!(["a", 1, 2.5]));
}

#[test]
fn test_nested_containers() {
    let parsed = parse_literal("{'items': [{'id': 1}, {'id': 2}], 'span': (0, 7)}").unwrap();
    assert_eq!(
        parsed,
        json!({"items": [{"id": 1}, {"id": 2}], "span": [0, 7]})
    );
}

#[test]
fn test_trailing_commas() {
    assert_eq!(parse_literal("[1, 2, 3,]").unwrap(), json!([1, 2, 3]));
    assert_eq!(parse_literal("{'a': 1,}").unwrap(), json!({"a": 1}));
}

#[test]
fn test_numbers() {
    assert_eq!(parse_literal("42").unwrap(), json!(42));
    assert_eq!(parse_literal("-7").unwrap(), json!(-7));
    assert_eq!(parse_literal("+3").unwrap(), json!(3));
    assert_eq!(parse_literal("1.5e3").unwrap(), json!(1500.0));
}

#[test]
fn test_non_string_dict_keys_are_stringified() {
    let parsed = parse_literal("{1: 'one', 2: 'two'}").unwrap();
    assert_eq!(parsed, json!({"1": "one", "2": "two"}));
}

#[test]
fn test_string_escapes() {
    let parsed = parse_literal(r"'line\nbreak \x41 中 \'q\''").unwrap();
    assert_eq!(parsed, json!("line\nbreak A 中 'q'"));
}

#[test]
fn test_empty_containers() {
    assert_eq!(parse_literal("{}").unwrap(), json!({}));
    assert_eq!(parse_literal("[]").unwrap(), json!([]));
    assert_eq!(parse_literal("()").unwrap(), json!([]));
}

#[test]
fn test_rejects_expressions() {
    // The whole point of the parser: no evaluation, ever.
    assert!(parse_literal("1 + 1").is_err());
    assert!(parse_literal("__import__('os')").is_err());
    assert!(parse_literal("[].append").is_err());
    assert!(parse_literal("lambda: 0").is_err());
}

#[test]
fn test_rejects_trailing_input() {
    assert_eq!(
        parse_literal("{'a': 1} tail"),
        Err(LiteralError::TrailingInput(9))
    );
}

#[test]
fn test_rejects_unterminated_string() {
    assert_eq!(parse_literal("'open"), Err(LiteralError::UnexpectedEof));
}

#[test]
fn test_rejects_bare_identifiers() {
    assert!(matches!(
        parse_literal("Nothing"),
        Err(LiteralError::UnexpectedChar('N', 0))
    ));
}

#[test]
fn test_depth_limit() {
    let deep = "[".repeat(100) + &"]".repeat(100);
    assert_eq!(parse_literal(&deep), Err(LiteralError::TooDeep));
}

#[test]
fn test_whitespace_tolerated() {
    let parsed = parse_literal("  { 'a' : [ 1 , 2 ] }  ").unwrap();
    assert_eq!(parsed, json!({"a": [1, 2]}));
}
