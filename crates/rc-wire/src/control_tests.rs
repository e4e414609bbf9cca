// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn query_serialises_with_a_type_tag() {
    let q = Query::DeleteMeasurement { meas_id: 5 };
    let json = serde_json::to_value(&q).unwrap();
    assert_eq!(json["type"], "DeleteMeasurement");
    assert_eq!(json["meas_id"], 5);
}

#[test]
fn response_from_error_carries_context() {
    let err = ErrorKind::CurrentlyFlushing(Some("H2".to_string()));
    let resp = Response::from_error(&err);
    match resp {
        Response::Error { kind, message } => {
            assert_eq!(kind, "currently_flushing");
            assert_eq!(message.as_deref(), Some("H2"));
        }
        _ => panic!("expected Response::Error"),
    }
}

#[test]
fn query_round_trips_through_json() {
    let q = Query::StartRecording;
    let json = serde_json::to_string(&q).unwrap();
    let back: Query = serde_json::from_str(&json).unwrap();
    assert!(matches!(back, Query::StartRecording));
}
