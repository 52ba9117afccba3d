//! Noise filter: drops non-informational records before any processing.

use serde_json::Value as JsonValue;

use super::keys;

/// Keep-alive messages the services emit on idle connections.
const HEARTBEAT_MESSAGES: &[&str] = &["try to send  ping frame", "healthExamination"];

/// Marker the device registry logs when a contact sync repeats itself.
const DUPLICATE_CONTACT_MARKER: &str = "Duplicate contact data for device:";

/// Tag the origin logging agent attaches when it failed to parse a line.
const JSON_PARSE_FAILURE_TAG: &str = "_jsonparsefailure";

/// Whether a record is noise and should be excluded from grouping.
///
/// Pure predicate: absent or oddly-shaped fields simply do not match.
pub fn shall_ignore(record: &JsonValue) -> bool {
    let Some(src) = record.get(keys::SOURCE) else {
        return false;
    };

    if let Some(message) = src.get(keys::MESSAGE).and_then(|m| m.as_str()) {
        if HEARTBEAT_MESSAGES.contains(&message) {
            return true;
        }
        if message.contains(DUPLICATE_CONTACT_MARKER) {
            return true;
        }
    }

    if let Some(tags) = src.get(keys::TAGS).and_then(|t| t.as_array()) {
        if tags
            .iter()
            .any(|t| t.as_str() == Some(JSON_PARSE_FAILURE_TAG))
        {
            return true;
        }
    }

    false
}
