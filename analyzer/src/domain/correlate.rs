//! Trace-id resolution across services that disagree about where the
//! conversation identifier lives.
//!
//! Resolution order:
//! 1. `_source.trace_id` / `_source.traceId` (first non-empty string)
//! 2. if that is missing or a `-`-prefixed placeholder, the same pair inside
//!    the decoded `message` object
//! 3. for `central-manager` records, `message.metadata.terminalTraceId`
//!    overrides whatever was found so far
//! 4. for `asr-server` records still lacking a usable id,
//!    `message.requestId` / `message.request_id`
//!
//! Records that resolve to the empty string all land in one shared bucket;
//! the caller decides what to do with it.

use serde_json::{Map, Value as JsonValue};
use tracing::warn;

use crate::utils::json::first_str;

use super::keys;

const SOURCE_TRACE_KEYS: &[&str] = &[keys::TRACE_ID, keys::TRACE_ID_CAMEL];
const MESSAGE_REQUEST_KEYS: &[&str] = &[keys::REQUEST_ID_CAMEL, keys::REQUEST_ID];

/// Resolve the conversation trace id of a normalized record.
///
/// Always returns a string; unresolvable records map to `""`.
pub fn resolve_trace_id(record: &JsonValue) -> String {
    let Some(src) = record.get(keys::SOURCE).and_then(|s| s.as_object()) else {
        return String::new();
    };

    let service = src
        .get(keys::SERVICE_NAME)
        .and_then(|v| v.as_str())
        .unwrap_or("");
    let message = src.get(keys::MESSAGE).and_then(|m| m.as_object());

    let mut trace_id = trace_key(src, SOURCE_TRACE_KEYS);
    if needs_fallback(trace_id) {
        if let Some(message) = message {
            if let Some(inner) = trace_key(message, SOURCE_TRACE_KEYS) {
                trace_id = Some(inner);
            }
        }
    }

    if service == keys::SERVICE_CENTRAL_MANAGER {
        if let Some(terminal) = message
            .and_then(|m| m.get(keys::METADATA))
            .and_then(|meta| meta.get(keys::TERMINAL_TRACE_ID))
        {
            match terminal.as_str() {
                Some(id) => return id.to_string(),
                None => warn!(service, "non-string terminalTraceId, ignoring"),
            }
        }
    } else if service == keys::SERVICE_ASR && needs_fallback(trace_id) {
        if let Some(message) = message {
            if let Some(request_id) = first_str(message, MESSAGE_REQUEST_KEYS) {
                trace_id = Some(request_id);
            }
        }
    }

    trace_id.unwrap_or("").to_string()
}

/// First non-empty string value under any of `keys`, warning on non-strings.
fn trace_key<'a>(obj: &'a Map<String, JsonValue>, candidates: &[&str]) -> Option<&'a str> {
    for key in candidates {
        match obj.get(*key) {
            None | Some(JsonValue::Null) => {}
            Some(JsonValue::String(s)) if s.is_empty() => {}
            Some(JsonValue::String(s)) => return Some(s),
            Some(other) => {
                warn!(key, value = %other, "non-string trace id field, ignoring");
            }
        }
    }
    None
}

/// A trace id is unusable when absent, empty, or a `-`-prefixed placeholder.
fn needs_fallback(trace_id: Option<&str>) -> bool {
    match trace_id {
        None => true,
        Some(id) => id.is_empty() || id.starts_with('-'),
    }
}

#[cfg(test)]
#[path = "correlate_tests.rs"]
mod tests;
