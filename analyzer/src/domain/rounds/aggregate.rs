//! Bucketing by trace id and the two reductions built on top of it.
//!
//! Buckets preserve first-seen order, both of keys and of records within a
//! key. Two independent reductions consume them: flat groups (indices plus a
//! display summary, for report rendering) and typed dialog rounds.

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::constants::is_clean_context;

use super::super::{correlate::resolve_trace_id, filter::shall_ignore, keys};
use super::model::DialogRound;

/// Role of a record within a dialog round, by marker field presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    NlpRequest,
    NlpResponse,
    LlmRequest,
    LlmResponse,
}

impl Role {
    /// Classify a normalized record. Marker fields are checked in priority
    /// order; a well-formed record carries exactly one of them.
    pub fn classify(record: &JsonValue) -> Option<Role> {
        let src = record.get(keys::SOURCE)?;
        if src.get(keys::NLP_REQUEST).is_some() {
            Some(Role::NlpRequest)
        } else if src.get(keys::NLP_RESPONSE).is_some() {
            Some(Role::NlpResponse)
        } else if src.get(keys::LLM_REQUEST).is_some() {
            Some(Role::LlmRequest)
        } else if src.get(keys::LLM_RESPONSE).is_some() {
            Some(Role::LlmResponse)
        } else {
            None
        }
    }
}

/// One trace id's records, in encounter order.
#[derive(Debug, Clone)]
pub struct Bucket {
    pub trace_id: String,
    /// `ltime` of the record that established the bucket.
    pub timestamp: String,
    /// Indices into the batch's record vector.
    pub records: Vec<usize>,
}

/// Group records by resolved trace id, preserving first-seen order.
///
/// Returns the buckets plus the indices the noise filter dropped. Records
/// with an unresolvable trace id share the `""` bucket.
pub fn bucket_records(records: &[JsonValue]) -> (Vec<Bucket>, Vec<usize>) {
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut by_id: FxHashMap<String, usize> = FxHashMap::default();
    let mut ignored = Vec::new();

    for (index, record) in records.iter().enumerate() {
        if shall_ignore(record) {
            ignored.push(index);
            continue;
        }
        let trace_id = resolve_trace_id(record);
        let slot = *by_id.entry(trace_id.clone()).or_insert_with(|| {
            let ltime = record
                .get(keys::SOURCE)
                .and_then(|src| src.get(keys::LOCAL_TIME))
                .and_then(|t| t.as_str())
                .unwrap_or("")
                .to_string();
            buckets.push(Bucket {
                trace_id,
                timestamp: ltime,
                records: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[slot].records.push(index);
    }

    (buckets, ignored)
}

/// Flat group: record indices plus display metadata, for report rendering.
#[derive(Debug, Clone, Serialize)]
pub struct RecordGroup {
    pub trace_id: String,
    pub timestamp: String,
    pub records: Vec<usize>,
    /// Query text of the group's first API-server request, if any.
    pub summary: Option<String>,
}

impl RecordGroup {
    /// True when this group is a context-reset turn rather than a question.
    pub fn is_clean_context(&self) -> bool {
        self.summary.as_deref().is_some_and(is_clean_context)
    }
}

/// Mode A reduction: one group per bucket, summarized by the first
/// API-server request query found among its records.
pub fn flat_groups(records: &[JsonValue], buckets: &[Bucket]) -> Vec<RecordGroup> {
    buckets
        .iter()
        .map(|bucket| {
            let summary = bucket
                .records
                .iter()
                .find_map(|&index| api_request_query(&records[index]));
            RecordGroup {
                trace_id: bucket.trace_id.clone(),
                timestamp: bucket.timestamp.clone(),
                records: bucket.records.clone(),
                summary,
            }
        })
        .collect()
}

fn api_request_query(record: &JsonValue) -> Option<String> {
    let src = record.get(keys::SOURCE)?;
    // Other services echo the request field; only the gateway's own record
    // carries the user's query.
    if src.get(keys::SERVICE_NAME)?.as_str()? != keys::SERVICE_API {
        return None;
    }
    src.get(keys::API_REQUEST)?
        .get(keys::PAYLOAD)?
        .get(keys::QUERY)?
        .as_str()
        .map(str::to_string)
}

/// Per-bucket role slots with the round write rules baked in.
#[derive(Default)]
struct RoundSlots<'a> {
    nlp_request: Option<&'a JsonValue>,
    nlp_response: Option<&'a JsonValue>,
    llm_request: Option<&'a JsonValue>,
    llm_response: Option<&'a JsonValue>,
}

impl<'a> RoundSlots<'a> {
    /// NLU slots are first-write (a duplicate exchange under the same trace
    /// id is a context-reset follow-up and is dropped); the response slot
    /// additionally requires its request to be present already. LLM slots
    /// are last-write-wins.
    fn offer(&mut self, role: Role, record: &'a JsonValue) {
        match role {
            Role::NlpRequest => {
                if self.nlp_request.is_none() {
                    self.nlp_request = Some(record);
                }
            }
            Role::NlpResponse => {
                if self.nlp_request.is_some() && self.nlp_response.is_none() {
                    self.nlp_response = Some(record);
                }
            }
            Role::LlmRequest => self.llm_request = Some(record),
            Role::LlmResponse => self.llm_response = Some(record),
        }
    }
}

/// Mode B reduction: one DialogRound per bucket that yields one, in bucket
/// order, truncated to `limit` when given.
pub fn dialog_rounds(
    records: &[JsonValue],
    buckets: &[Bucket],
    limit: Option<usize>,
) -> Vec<DialogRound> {
    let mut rounds = Vec::new();
    for bucket in buckets {
        if let Some(limit) = limit {
            if rounds.len() >= limit {
                break;
            }
        }
        let mut slots = RoundSlots::default();
        for &index in &bucket.records {
            let record = &records[index];
            if let Some(role) = Role::classify(record) {
                slots.offer(role, record);
            }
        }
        if let Some(round) = DialogRound::from_records(
            &bucket.trace_id,
            slots.nlp_request,
            slots.nlp_response,
            slots.llm_request,
            slots.llm_response,
        ) {
            rounds.push(round);
        }
    }
    rounds
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
