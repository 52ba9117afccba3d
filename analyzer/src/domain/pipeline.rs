//! Batch pipeline: normalize every record, bucket by trace id, expose the
//! two reductions on the result.

use serde_json::Value as JsonValue;
use tracing::debug;

use super::normalize::normalize;
use super::rounds::{
    Bucket, DialogRound, RecordGroup, bucket_records, dialog_rounds, flat_groups,
};

/// One fully processed batch. Owns the normalized records; both reductions
/// borrow them through index lists, so they can be taken any number of times.
#[derive(Debug)]
pub struct AnalyzedBatch {
    pub records: Vec<JsonValue>,
    /// Indices the noise filter dropped.
    pub ignored: Vec<usize>,
    pub buckets: Vec<Bucket>,
}

/// Normalize and bucket a batch of raw records.
pub fn analyze(mut records: Vec<JsonValue>) -> AnalyzedBatch {
    for record in &mut records {
        normalize(record);
    }
    let (buckets, ignored) = bucket_records(&records);
    debug!(
        records = records.len(),
        buckets = buckets.len(),
        ignored = ignored.len(),
        "batch analyzed"
    );
    AnalyzedBatch {
        records,
        ignored,
        buckets,
    }
}

impl AnalyzedBatch {
    /// Flat groups in trace-id first-seen order, with API-request summaries.
    pub fn flat_groups(&self) -> Vec<RecordGroup> {
        flat_groups(&self.records, &self.buckets)
    }

    /// Typed dialog rounds in trace-id first-seen order.
    pub fn dialog_rounds(&self, limit: Option<usize>) -> Vec<DialogRound> {
        dialog_rounds(&self.records, &self.buckets, limit)
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
