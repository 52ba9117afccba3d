//! Dialog round data model.
//!
//! Every type here is self-contained once built: a rendered round never needs
//! to look back at the raw records it came from. Field spellings on the wire
//! follow the upstream services (camelCase identifiers, `local` for locale).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::utils::time::latency_seconds;

use super::super::keys;

/// Glass product code → marketing name.
pub const DEVICE_PRODUCT_CODES: &[(&str, &str)] = &[
    ("1001", "Concept"),
    ("1002", "Star"),
    ("1003", "Air"),
    ("1004", "AirPro"),
    ("1005", "Normandy"),
    ("1200", "指环一代"),
    ("1201", "指环国内二代"),
    ("1202", "指环国外二代"),
    ("1203", "指环美版二代"),
    ("5001", "海外Air"),
    ("5002", "海外AirPro"),
    ("5003", "海外Normandy"),
];

/// Look up the marketing name of a glass product code.
pub fn product_name(code: &str) -> Option<&'static str> {
    DEVICE_PRODUCT_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub latitude: f64,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.longitude, self.latitude)
    }
}

/// File attachment carried on an LLM answer request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OssFile {
    #[serde(default)]
    pub oss_url: Option<String>,
    #[serde(default)]
    pub resource_name: Option<String>,
    #[serde(default)]
    pub resource_oss_name: Option<String>,
    #[serde(default)]
    pub resource_size: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlpIntent {
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for NlpIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlpUtterance {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub screen: String,
    #[serde(default)]
    pub speech: String,
}

impl fmt::Display for NlpUtterance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id.is_empty() {
            write!(f, "{}", if self.speech.is_empty() { &self.screen } else { &self.speech })
        } else {
            write!(
                f,
                "[{}] {}",
                self.id,
                if self.speech.is_empty() { &self.screen } else { &self.speech }
            )
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlpError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default, rename = "errorMsg")]
    pub message: Option<String>,
}

/// One NLU request/response exchange.
///
/// At most one of `utterance` / `error` is set: a response either carried a
/// renderable utterance or an error payload, never both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NlpRound {
    pub request_timestamp: Option<String>,
    pub response_timestamp: Option<String>,
    pub query: Option<String>,
    #[serde(rename = "isNextRecorded")]
    pub is_next_recorded: Option<bool>,
    #[serde(rename = "isSoundOpened")]
    pub is_sound_opened: Option<bool>,
    pub intent: Option<NlpIntent>,
    pub utterance: Option<NlpUtterance>,
    pub error: Option<NlpError>,
}

impl NlpRound {
    /// Build from the stored request/response pair of one bucket.
    pub fn from_records(request: Option<&JsonValue>, response: Option<&JsonValue>) -> Self {
        let mut round = NlpRound::default();

        if let Some(src) = request.and_then(|r| r.get(keys::SOURCE)) {
            round.request_timestamp = str_field(src, keys::TIMESTAMP);
            round.query = src
                .get(keys::NLP_REQUEST)
                .and_then(|msg| msg.get(keys::PAYLOAD))
                .and_then(|p| p.get(keys::QUERY))
                .and_then(|q| q.as_str())
                .map(str::to_string);
        }

        if let Some(src) = response.and_then(|r| r.get(keys::SOURCE)) {
            round.response_timestamp = str_field(src, keys::TIMESTAMP);
            if let Some(outer) = src
                .get(keys::NLP_RESPONSE)
                .and_then(|msg| msg.get(keys::PAYLOAD))
            {
                round.intent = outer
                    .get("header")
                    .and_then(|h| serde_json::from_value(h.clone()).ok());
                if let Some(inner) = outer.get(keys::PAYLOAD) {
                    round.is_next_recorded = inner.get("isNextRecorded").and_then(|v| v.as_bool());
                    round.is_sound_opened = inner.get("isSoundOpened").and_then(|v| v.as_bool());
                    if let Some(utterance) = inner.get("utterance") {
                        round.utterance = serde_json::from_value(utterance.clone()).ok();
                    } else if inner.get("code").is_some() && inner.get("errorMsg").is_some() {
                        round.error = serde_json::from_value(inner.clone()).ok();
                    }
                }
            }
        }

        round
    }

    /// Seconds between request and response, when both timestamps parse.
    pub fn latency_seconds(&self) -> Option<f64> {
        latency_seconds(
            self.request_timestamp.as_deref()?,
            self.response_timestamp.as_deref()?,
        )
    }
}

/// One LLM answer request/response exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmRound {
    pub request_timestamp: Option<String>,
    pub response_timestamp: Option<String>,

    pub channel_type: Option<i64>,
    pub clean_context: Option<i64>,
    pub intent_name: Option<String>,
    pub files: Option<Vec<OssFile>>,
    pub play_status: Option<i64>,
    pub use_deepseek: Option<i64>,
    pub use_search: Option<i64>,
    pub visual_aids_status: Option<i64>,
    pub query: Option<String>,
    pub raw_query: Option<String>,

    pub answer: Option<String>,
    pub base_status: Option<i64>,
    pub reason: Option<String>,
    pub reasoning_latency: Option<i64>,
    pub thoughts_data: Option<JsonValue>,
}

impl LlmRound {
    /// Build from the stored request/response pair. No request, no round.
    pub fn from_records(request: Option<&JsonValue>, response: Option<&JsonValue>) -> Option<Self> {
        let src = request?.get(keys::SOURCE)?;
        let msg = src.get(keys::LLM_REQUEST)?;

        let mut round = LlmRound {
            request_timestamp: str_field(src, keys::TIMESTAMP),
            channel_type: int_field(msg, "channel_type"),
            clean_context: int_field(msg, "clean_context"),
            intent_name: str_field(msg, "intent_name"),
            files: msg
                .get("files")
                .filter(|f| f.is_array())
                .and_then(|f| serde_json::from_value(f.clone()).ok()),
            play_status: int_field(msg, "play_status"),
            use_deepseek: int_field(msg, "use_deepseek"),
            use_search: int_field(msg, "use_search"),
            visual_aids_status: int_field(msg, "visual_aids_status"),
            query: str_field(msg, "query"),
            raw_query: str_field(msg, "raw_query"),
            ..LlmRound::default()
        };

        if let Some(src) = response.and_then(|r| r.get(keys::SOURCE)) {
            round.response_timestamp = str_field(src, keys::TIMESTAMP);
            if let Some(payload) = src
                .get(keys::LLM_RESPONSE)
                .and_then(|msg| msg.get(keys::PAYLOAD))
            {
                round.answer = str_field(payload, "answer");
                round.base_status = int_field(payload, "base_status");
                round.thoughts_data = payload.get("thoughts_data").cloned();
                if let Some(reason) = payload.get("reason").and_then(|r| r.as_object()) {
                    round.reasoning_latency =
                        reason.get("reasoning_latency").and_then(|v| v.as_i64());
                    round.reason = reason.get("answer").and_then(|v| v.as_str()).map(str::to_string);
                }
            }
        }

        Some(round)
    }

    pub fn latency_seconds(&self) -> Option<f64> {
        latency_seconds(
            self.request_timestamp.as_deref()?,
            self.response_timestamp.as_deref()?,
        )
    }
}

/// One reconstructed conversational turn.
///
/// Exists only when an NLU request with metadata was observed for its trace
/// id; the LLM half is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogRound {
    pub timestamp: String,
    #[serde(rename = "traceId")]
    pub trace_id: String,

    pub location: Option<Location>,
    #[serde(rename = "glassProduct")]
    pub glass_product: Option<String>,

    #[serde(rename = "accountId")]
    pub account_id: Option<String>,
    #[serde(rename = "xjAccountId")]
    pub xj_account_id: Option<String>,
    #[serde(rename = "deviceId")]
    pub device_id: Option<String>,
    #[serde(rename = "glassDeviceId")]
    pub glass_device_id: Option<String>,
    #[serde(rename = "iotDeviceId")]
    pub iot_device_id: Option<String>,

    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
    #[serde(rename = "msgId")]
    pub msg_id: Option<String>,

    /// 0 = glasses, 1 = phone.
    #[serde(rename = "originType")]
    pub origin_type: Option<i64>,
    /// 0 = voice, 2 = text.
    #[serde(rename = "functionType")]
    pub function_type: Option<i64>,
    #[serde(rename = "sessionFirstFlag")]
    pub session_first_flag: Option<bool>,

    pub locale: Option<String>,
    #[serde(rename = "timeZone")]
    pub time_zone: Option<String>,
    #[serde(rename = "nluLanguage")]
    pub nlu_language: Option<String>,

    pub nlp_round: NlpRound,
    pub llm_round: Option<LlmRound>,
}

impl DialogRound {
    /// Reduce one bucket's stored role records into a round.
    ///
    /// Returns `None` when the NLU request is missing or carries no metadata
    /// object; that is insufficient information, not an error.
    pub fn from_records(
        trace_id: &str,
        nlp_request: Option<&JsonValue>,
        nlp_response: Option<&JsonValue>,
        llm_request: Option<&JsonValue>,
        llm_response: Option<&JsonValue>,
    ) -> Option<Self> {
        let src = nlp_request?.get(keys::SOURCE)?;
        let metadata = src
            .get(keys::NLP_REQUEST)?
            .get(keys::METADATA)?
            .as_object()?;

        Some(DialogRound {
            timestamp: str_field(src, keys::TIMESTAMP).unwrap_or_default(),
            trace_id: trace_id.to_string(),
            location: Some(Location {
                longitude: meta_f64(metadata, "longitude"),
                latitude: meta_f64(metadata, "latitude"),
            }),
            glass_product: meta_str(metadata, "glassProduct"),
            account_id: meta_str(metadata, "accountId"),
            xj_account_id: meta_str(metadata, "xjAccountId"),
            device_id: meta_str(metadata, "deviceId"),
            glass_device_id: meta_str(metadata, "glassDeviceId"),
            iot_device_id: meta_str(metadata, "iotDeviceId"),
            session_id: meta_str(metadata, "sessionId"),
            msg_id: meta_str(metadata, "msgId"),
            origin_type: metadata.get("originType").and_then(|v| v.as_i64()),
            function_type: metadata.get("functionType").and_then(|v| v.as_i64()),
            session_first_flag: metadata.get("sessionFirstFlag").and_then(|v| v.as_bool()),
            locale: meta_str(metadata, "local"),
            time_zone: meta_str(metadata, "timeZone"),
            nlu_language: meta_str(metadata, "nluLanguage"),
            nlp_round: NlpRound::from_records(nlp_request, nlp_response),
            llm_round: LlmRound::from_records(llm_request, llm_response),
        })
    }

    /// Marketing name of the device this turn came from.
    pub fn product_name(&self) -> Option<&'static str> {
        product_name(self.glass_product.as_deref()?)
    }
}

fn str_field(value: &JsonValue, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn int_field(value: &JsonValue, key: &str) -> Option<i64> {
    value.get(key).and_then(|v| v.as_i64())
}

fn meta_str(metadata: &Map<String, JsonValue>, key: &str) -> Option<String> {
    metadata.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn meta_f64(metadata: &Map<String, JsonValue>, key: &str) -> f64 {
    metadata.get(key).and_then(|v| v.as_f64()).unwrap_or(0.0)
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
