use serde_json::{Value as JsonValue, json};

use super::analyze;

/// A raw record as shipped: the request envelope field is a JSON string
/// that only becomes usable after normalization.
fn raw_nlp_request(trace_id: &str, q: &str) -> JsonValue {
    json!({"_source": {
        "@timestamp": "2024-06-01T08:00:00.000Z",
        "ltime": "2024-06-01 16:00:00",
        "trace_id": trace_id,
        "level": "INFO",
        "central-nlp-request": format!(
            "{{\"metadata\": {{\"deviceId\": \"dev-1\"}}, \"payload\": {{\"q\": \"{q}\"}}}}"
        )
    }})
}

#[test]
fn every_record_is_bucketed_or_ignored() {
    let records = vec![
        raw_nlp_request("a", "hi"),
        json!({"_source": {"message": "healthExamination"}}),
        json!({"_source": {"trace_id": "b", "message": "plain"}}),
        json!({"_source": {"tags": ["_jsonparsefailure"], "message": "{broken"}}),
    ];
    let batch = analyze(records);
    let bucketed: usize = batch.buckets.iter().map(|b| b.records.len()).sum();
    assert_eq!(bucketed + batch.ignored.len(), batch.records.len());
    assert_eq!(batch.ignored, [1, 3]);
}

#[test]
fn normalization_happens_before_bucketing() {
    // The trace id only exists inside the JSON-encoded message, so grouping
    // proves the normalizer ran first.
    let records = vec![json!({"_source": {
        "message": "{\"traceId\": \"t-inner\"}"
    }})];
    let batch = analyze(records);
    assert_eq!(batch.buckets[0].trace_id, "t-inner");
}

#[test]
fn grouping_is_deterministic() {
    let records = vec![
        raw_nlp_request("b", "q1"),
        raw_nlp_request("a", "q2"),
        raw_nlp_request("b", "q3"),
    ];
    let first = analyze(records.clone());
    let second = analyze(records);
    let ids = |batch: &super::AnalyzedBatch| -> Vec<String> {
        batch.buckets.iter().map(|b| b.trace_id.clone()).collect()
    };
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(ids(&first), ["b", "a"]);
}

#[test]
fn reductions_are_restartable() {
    let batch = analyze(vec![raw_nlp_request("t", "hi")]);
    assert_eq!(batch.dialog_rounds(None).len(), 1);
    assert_eq!(batch.dialog_rounds(None).len(), 1);
    assert_eq!(batch.flat_groups().len(), 1);
    assert_eq!(
        batch.dialog_rounds(None)[0].nlp_round.query.as_deref(),
        Some("hi")
    );
}

#[test]
fn noise_keys_are_stripped_during_analysis() {
    let batch = analyze(vec![raw_nlp_request("t", "hi")]);
    let src = batch.records[0]["_source"].as_object().unwrap();
    assert!(!src.contains_key("level"));
}
