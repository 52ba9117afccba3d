//! JSON utility functions

use serde_json::{Map, Value as JsonValue};

/// Get the first string value found under any of `keys`.
pub fn first_str<'a>(obj: &'a Map<String, JsonValue>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| obj.get(*k).and_then(|v| v.as_str()))
}

/// Replace a string field with its JSON-decoded value, in place.
///
/// Leaves the field untouched when it is absent, not a string, or not valid
/// JSON. Returns whether a replacement happened.
pub fn decode_json_field(obj: &mut Map<String, JsonValue>, key: &str) -> bool {
    let Some(text) = obj.get(key).and_then(|v| v.as_str()) else {
        return false;
    };
    match serde_json::from_str::<JsonValue>(text) {
        Ok(decoded) => {
            obj.insert(key.to_string(), decoded);
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: JsonValue) -> Map<String, JsonValue> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_first_str_respects_key_order() {
        let o = obj(json!({"a": "one", "b": "two"}));
        assert_eq!(first_str(&o, &["b", "a"]), Some("two"));
        assert_eq!(first_str(&o, &["missing", "a"]), Some("one"));
        assert_eq!(first_str(&o, &["missing"]), None);
    }

    #[test]
    fn test_first_str_skips_non_strings() {
        let o = obj(json!({"a": 1, "b": "two"}));
        assert_eq!(first_str(&o, &["a", "b"]), Some("two"));
    }

    #[test]
    fn test_decode_json_field_replaces_valid_json() {
        let mut o = obj(json!({"payload": "{\"q\": \"hi\"}"}));
        assert!(decode_json_field(&mut o, "payload"));
        assert_eq!(o["payload"], json!({"q": "hi"}));
    }

    #[test]
    fn test_decode_json_field_leaves_invalid_json() {
        let mut o = obj(json!({"payload": "not json"}));
        assert!(!decode_json_field(&mut o, "payload"));
        assert_eq!(o["payload"], json!("not json"));
    }

    #[test]
    fn test_decode_json_field_ignores_non_strings() {
        let mut o = obj(json!({"payload": {"q": "hi"}}));
        assert!(!decode_json_field(&mut o, "payload"));
        assert_eq!(o["payload"], json!({"q": "hi"}));
    }
}
