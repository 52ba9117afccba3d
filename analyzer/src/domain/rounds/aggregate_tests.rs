use serde_json::{Value as JsonValue, json};

use crate::core::constants::CLEAN_CONTEXT_SENTINEL;

use super::{Role, bucket_records, dialog_rounds, flat_groups};

fn nlp_request(trace_id: &str, q: &str) -> JsonValue {
    json!({"_source": {
        "@timestamp": "2024-06-01T08:00:00.000Z",
        "ltime": "2024-06-01 16:00:00",
        "trace_id": trace_id,
        "central-nlp-request": {
            "metadata": {"deviceId": "dev-1"},
            "payload": {"q": q}
        }
    }})
}

fn nlp_response(trace_id: &str, namespace: &str, name: &str) -> JsonValue {
    json!({"_source": {
        "@timestamp": "2024-06-01T08:00:00.900Z",
        "trace_id": trace_id,
        "central-nlp-response": {
            "payload": {
                "header": {"namespace": namespace, "name": name},
                "payload": {"utterance": {"speech": "ok"}}
            }
        }
    }})
}

fn llm_request(trace_id: &str, query: &str) -> JsonValue {
    json!({"_source": {
        "@timestamp": "2024-06-01T08:00:01.000Z",
        "trace_id": trace_id,
        "central-answer-request": {"query": query}
    }})
}

fn llm_response(trace_id: &str, answer: &str) -> JsonValue {
    json!({"_source": {
        "@timestamp": "2024-06-01T08:00:02.000Z",
        "trace_id": trace_id,
        "central-answer-response": {"payload": {"answer": answer}}
    }})
}

fn api_request(trace_id: &str, q: &str) -> JsonValue {
    json!({"_source": {
        "trace_id": trace_id,
        "laname": "api-server",
        "api-server-request": {"payload": {"q": q}}
    }})
}

fn plain(trace_id: &str) -> JsonValue {
    json!({"_source": {"trace_id": trace_id, "message": "other"}})
}

#[test]
fn role_classification_priority() {
    assert_eq!(Role::classify(&nlp_request("t", "q")), Some(Role::NlpRequest));
    assert_eq!(Role::classify(&nlp_response("t", "a", "b")), Some(Role::NlpResponse));
    assert_eq!(Role::classify(&llm_request("t", "q")), Some(Role::LlmRequest));
    assert_eq!(Role::classify(&llm_response("t", "a")), Some(Role::LlmResponse));
    assert_eq!(Role::classify(&plain("t")), None);

    // Marker fields checked in priority order when a record carries several.
    let both = json!({"_source": {
        "central-nlp-request": {},
        "central-answer-response": {}
    }});
    assert_eq!(Role::classify(&both), Some(Role::NlpRequest));
}

#[test]
fn buckets_preserve_first_seen_order() {
    let records = vec![
        plain("b"),
        plain("a"),
        plain("b"),
        plain("c"),
        plain("a"),
    ];
    let (buckets, ignored) = bucket_records(&records);
    assert!(ignored.is_empty());
    let ids: Vec<&str> = buckets.iter().map(|b| b.trace_id.as_str()).collect();
    assert_eq!(ids, ["b", "a", "c"]);
    assert_eq!(buckets[0].records, [0, 2]);
    assert_eq!(buckets[1].records, [1, 4]);
}

#[test]
fn bucket_timestamp_comes_from_establishing_record() {
    let records = vec![
        json!({"_source": {"trace_id": "t", "ltime": "2024-06-01 16:00:00", "message": "first"}}),
        json!({"_source": {"trace_id": "t", "ltime": "2024-06-01 16:00:09", "message": "second"}}),
    ];
    let (buckets, _) = bucket_records(&records);
    assert_eq!(buckets[0].timestamp, "2024-06-01 16:00:00");
}

#[test]
fn heartbeats_are_ignored_not_bucketed() {
    let records = vec![
        json!({"_source": {"trace_id": "t", "message": "try to send  ping frame"}}),
        plain("t"),
    ];
    let (buckets, ignored) = bucket_records(&records);
    assert_eq!(ignored, [0]);
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].records, [1]);
}

#[test]
fn unresolvable_records_share_the_empty_bucket() {
    let records = vec![
        json!({"_source": {"message": "no id here"}}),
        json!({"_source": {"message": "me neither"}}),
    ];
    let (buckets, _) = bucket_records(&records);
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].trace_id, "");
    assert_eq!(buckets[0].records, [0, 1]);
}

#[test]
fn flat_group_summary_first_api_request_wins() {
    let records = vec![
        plain("t"),
        api_request("t", "first question"),
        api_request("t", "second question"),
    ];
    let (buckets, _) = bucket_records(&records);
    let groups = flat_groups(&records, &buckets);
    assert_eq!(groups[0].summary.as_deref(), Some("first question"));
    assert_eq!(groups[0].records, [0, 1, 2]);
}

#[test]
fn flat_group_summary_requires_gateway_service_name() {
    // The dialog manager forwards the request field verbatim; its copy must
    // never be mistaken for the gateway's own record.
    let records = vec![
        json!({"_source": {
            "trace_id": "t",
            "laname": "central-manager",
            "api-server-request": {"payload": {"q": "forwarded copy"}}
        }}),
        api_request("t", "real question"),
    ];
    let (buckets, _) = bucket_records(&records);
    let groups = flat_groups(&records, &buckets);
    assert_eq!(groups[0].summary.as_deref(), Some("real question"));
}

#[test]
fn flat_group_without_api_request_has_no_summary() {
    let records = vec![plain("t")];
    let (buckets, _) = bucket_records(&records);
    let groups = flat_groups(&records, &buckets);
    assert!(groups[0].summary.is_none());
    assert!(!groups[0].is_clean_context());
}

#[test]
fn clean_context_group_is_flagged() {
    let records = vec![api_request("t", CLEAN_CONTEXT_SENTINEL)];
    let (buckets, _) = bucket_records(&records);
    let groups = flat_groups(&records, &buckets);
    assert!(groups[0].is_clean_context());
}

#[test]
fn response_only_bucket_produces_no_round() {
    let records = vec![nlp_response("T2", "Dialog", "Weather")];
    let (buckets, _) = bucket_records(&records);
    assert!(dialog_rounds(&records, &buckets, None).is_empty());
}

#[test]
fn duplicate_nlu_request_is_suppressed() {
    let records = vec![
        nlp_request("t", "first"),
        nlp_request("t", "second"),
        nlp_response("t", "Dialog", "Weather"),
    ];
    let (buckets, _) = bucket_records(&records);
    let rounds = dialog_rounds(&records, &buckets, None);
    assert_eq!(rounds.len(), 1);
    assert_eq!(rounds[0].nlp_round.query.as_deref(), Some("first"));
}

#[test]
fn nlu_response_before_request_is_dropped() {
    let records = vec![
        nlp_response("t", "Dialog", "Early"),
        nlp_request("t", "q"),
        nlp_response("t", "Dialog", "Late"),
    ];
    let (buckets, _) = bucket_records(&records);
    let rounds = dialog_rounds(&records, &buckets, None);
    assert_eq!(
        rounds[0].nlp_round.intent.as_ref().map(ToString::to_string).as_deref(),
        Some("Dialog::Late")
    );
}

#[test]
fn llm_slots_are_last_write_wins() {
    let records = vec![
        nlp_request("t", "q"),
        llm_response("t", "first answer"),
        llm_request("t", "q"),
        llm_response("t", "final answer"),
    ];
    let (buckets, _) = bucket_records(&records);
    let rounds = dialog_rounds(&records, &buckets, None);
    let llm = rounds[0].llm_round.as_ref().expect("llm round");
    assert_eq!(llm.answer.as_deref(), Some("final answer"));
}

#[test]
fn end_to_end_single_key_scenario() {
    let records = vec![
        nlp_request("X", "hi"),
        nlp_response("X", "A", "B"),
        llm_request("X", "hi"),
        llm_response("X", "hello"),
        plain("X"),
    ];
    let (buckets, ignored) = bucket_records(&records);
    assert!(ignored.is_empty());
    assert_eq!(buckets.len(), 1);

    let rounds = dialog_rounds(&records, &buckets, None);
    assert_eq!(rounds.len(), 1);
    let round = &rounds[0];
    assert_eq!(round.trace_id, "X");
    assert_eq!(round.nlp_round.query.as_deref(), Some("hi"));
    assert_eq!(
        round.nlp_round.intent.as_ref().map(ToString::to_string).as_deref(),
        Some("A::B")
    );
    assert_eq!(
        round.llm_round.as_ref().and_then(|l| l.answer.as_deref()),
        Some("hello")
    );

    // The unrelated record is not part of the round but stays in the group.
    let groups = flat_groups(&records, &buckets);
    assert_eq!(groups[0].records, [0, 1, 2, 3, 4]);
}

#[test]
fn limit_truncates_rounds() {
    let records = vec![
        nlp_request("a", "q1"),
        nlp_request("b", "q2"),
        nlp_request("c", "q3"),
    ];
    let (buckets, _) = bucket_records(&records);
    let rounds = dialog_rounds(&records, &buckets, Some(2));
    assert_eq!(rounds.len(), 2);
    assert_eq!(rounds[0].trace_id, "a");
    assert_eq!(rounds[1].trace_id, "b");
}
