//! Field normalizer: peels the layered, inconsistently encoded text fields of
//! a single record back into structured values, in place.
//!
//! Best-effort by contract: every step is independently skippable, a decode
//! failure leaves the field in its last good state, and nothing here can fail
//! the caller. One malformed record never aborts a batch.
//!
//! Step order (each operates on the record's `_source` object):
//! 1. strip noise keys from envelope and source
//! 2. split a trailing `,headers:` segment into `message.headers`
//! 3. prefix peel (ordered table, first match wins) → `message.prefix`
//! 4. postfix peel (ordered marker table) → `message.postfix`
//! 5. JSON-decode the message, once more if double-encoded
//! 6. normalize the inner `msg` field of a decoded message
//! 7. JSON-decode known `result` keys inside the decoded message
//! 8. JSON-decode the declared request/response envelope fields

pub mod literal;
mod rules;

use serde_json::{Map, Value as JsonValue};

use crate::utils::json::decode_json_field;

use super::keys;

pub use literal::{LiteralError, parse_literal};

use rules::{
    HTTP_STATUS_SUBSTITUTIONS, INNER_PARSE_REQUEST_GUARD, INNER_POSTFIX_MARKERS,
    INNER_PREFIX_RULES, MESSAGE_POSTFIX_MARKERS, MESSAGE_PREFIX_RULES, peel_postfix, peel_prefix,
};

/// Keys carried by the shipping agent that never hold dialog information.
const NOISE_KEYS: &[&str] = &[
    "messageobj",
    "log",
    "level",
    "fields",
    "input",
    "lblpl",
    "lmt",
    "class",
];

/// Marker separating a message body from an appended header dump.
const HEADER_SEPARATOR: &str = ",headers:";

/// `_source` fields the services fill with JSON-encoded strings.
const EMBEDDED_JSON_FIELDS: &[&str] = &[
    keys::NLP_REQUEST,
    keys::NLP_RESPONSE,
    keys::LLM_REQUEST,
    keys::LLM_RESPONSE,
    keys::API_REQUEST,
    keys::API_RESPONSE,
    keys::ASR_RESULT,
];

/// Keys inside a decoded message whose values are JSON-encoded strings.
const EMBEDDED_RESULT_KEYS: &[&str] = &["result", "result_"];

/// Side fields written on the inner `msg` of a decoded message.
const MSG_PREFIX: &str = "msg.prefix";
const MSG_POSTFIX: &str = "msg.postfix";

/// Normalize one record in place. Never fails.
pub fn normalize(record: &mut JsonValue) {
    let Some(envelope) = record.as_object_mut() else {
        return;
    };
    strip_noise_keys(envelope);

    let Some(src) = envelope
        .get_mut(keys::SOURCE)
        .and_then(|s| s.as_object_mut())
    else {
        return;
    };
    strip_noise_keys(src);
    split_message_headers(src);
    peel_message_prefix(src);
    peel_message_postfix(src);
    if decode_message_json(src) {
        // The decode exposed a textual message that was hidden inside a JSON
        // string; its conventions have not been peeled yet.
        peel_message_prefix(src);
        peel_message_postfix(src);
        decode_message_json(src);
    }
    normalize_inner_msg(src);
    decode_result_fields(src);
    decode_embedded_fields(src);
}

fn strip_noise_keys(map: &mut Map<String, JsonValue>) {
    for key in NOISE_KEYS {
        map.remove(*key);
    }
}

/// Step 2: split off an appended header dump, decoding it best-effort.
fn split_message_headers(src: &mut Map<String, JsonValue>) {
    let Some(message) = src.get(keys::MESSAGE).and_then(|m| m.as_str()) else {
        return;
    };
    let Some(pos) = message.find(HEADER_SEPARATOR) else {
        return;
    };
    let head = message[..pos].to_string();
    let tail = &message[pos + HEADER_SEPARATOR.len()..];
    let headers = parse_literal(tail).unwrap_or_else(|_| JsonValue::String(tail.to_string()));
    src.insert(keys::MESSAGE_HEADERS.to_string(), headers);
    src.insert(keys::MESSAGE.to_string(), JsonValue::String(head));
}

/// Step 3: strip the first matching known prefix, recording its tag.
fn peel_message_prefix(src: &mut Map<String, JsonValue>) {
    let Some(message) = src.get(keys::MESSAGE).and_then(|m| m.as_str()) else {
        return;
    };
    if let Some((rest, tag)) = peel_prefix(message, MESSAGE_PREFIX_RULES) {
        let rest = rest.to_string();
        src.insert(
            keys::MESSAGE_PREFIX.to_string(),
            JsonValue::String(tag.to_string()),
        );
        src.insert(keys::MESSAGE.to_string(), JsonValue::String(rest));
    }
}

/// Step 4: truncate at the first known infix marker, keeping the tail aside.
fn peel_message_postfix(src: &mut Map<String, JsonValue>) {
    let Some(message) = src.get(keys::MESSAGE).and_then(|m| m.as_str()) else {
        return;
    };
    if let Some((head, tail)) = peel_postfix(message, MESSAGE_POSTFIX_MARKERS) {
        let (head, tail) = (head.to_string(), tail.to_string());
        src.insert(keys::MESSAGE_POSTFIX.to_string(), JsonValue::String(tail));
        src.insert(keys::MESSAGE.to_string(), JsonValue::String(head));
    }
}

/// Step 5: JSON-decode the message; unwrap one level of double encoding.
///
/// Returns whether the decode left the message as a string, meaning text
/// that was wrapped in a JSON string and has not seen the peel steps yet.
fn decode_message_json(src: &mut Map<String, JsonValue>) -> bool {
    let Some(message) = src.get(keys::MESSAGE).and_then(|m| m.as_str()) else {
        return false;
    };
    let Ok(mut decoded) = serde_json::from_str::<JsonValue>(message) else {
        return false;
    };
    if let JsonValue::String(inner) = &decoded {
        if let Ok(twice) = serde_json::from_str::<JsonValue>(inner) {
            decoded = twice;
        }
    }
    let still_text = decoded.is_string();
    src.insert(keys::MESSAGE.to_string(), decoded);
    still_text
}

/// Step 6: normalize the inner free-text `msg` of a decoded message object.
fn normalize_inner_msg(src: &mut Map<String, JsonValue>) {
    let Some(message) = src
        .get_mut(keys::MESSAGE)
        .and_then(|m| m.as_object_mut())
    else {
        return;
    };
    let Some(text) = message.get("msg").and_then(|m| m.as_str()) else {
        return;
    };

    let mut text = text.to_string();
    for (from, to) in HTTP_STATUS_SUBSTITUTIONS {
        if text.contains(from) {
            text = text.replace(from, to);
        }
    }

    // Verbatim request markers carry no further encoding.
    if text != INNER_PARSE_REQUEST_GUARD {
        if let Some((rest, tag)) = peel_prefix(&text, INNER_PREFIX_RULES) {
            let rest = rest.to_string();
            message.insert(MSG_PREFIX.to_string(), JsonValue::String(tag.to_string()));
            text = rest;
        }
        if let Some((head, tail)) = peel_postfix(&text, INNER_POSTFIX_MARKERS) {
            let (head, tail) = (head.to_string(), tail.to_string());
            message.insert(MSG_POSTFIX.to_string(), JsonValue::String(tail));
            text = head;
        }
    }

    let value = parse_literal(&text).unwrap_or(JsonValue::String(text));
    message.insert("msg".to_string(), value);
}

/// Step 7: decode known JSON-in-string keys inside the decoded message.
fn decode_result_fields(src: &mut Map<String, JsonValue>) {
    let Some(message) = src
        .get_mut(keys::MESSAGE)
        .and_then(|m| m.as_object_mut())
    else {
        return;
    };
    for key in EMBEDDED_RESULT_KEYS {
        decode_json_field(message, key);
    }
}

/// Step 8: decode the declared request/response envelope fields.
fn decode_embedded_fields(src: &mut Map<String, JsonValue>) {
    for key in EMBEDDED_JSON_FIELDS {
        decode_json_field(src, key);
    }
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
