// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use rc_wire::control::{JobHistorySummary, Response, StatusSnapshot};

use super::print;

#[test]
fn print_ok_text_does_not_fail() {
    assert!(print(&Response::Ok, false).is_ok());
}

#[test]
fn print_error_with_and_without_context_does_not_fail() {
    assert!(print(&Response::Error { kind: "CurrentlyRecording".to_string(), message: Some("H1".to_string()) }, false)
        .is_ok());
    assert!(print(&Response::Error { kind: "MeasIdNotFound".to_string(), message: None }, false).is_ok());
}

#[test]
fn print_status_json_includes_history() {
    let snapshot = StatusSnapshot {
        config_path: Some("/etc/rc/config.xml".to_string()),
        config_version: Some(4),
        bound_to_record_bus: true,
        recording: false,
        currently_recording_job_id: None,
        history: vec![JobHistorySummary {
            job_id: 1,
            meas_name: "m1".to_string(),
            is_uploaded: true,
            is_deleted: false,
            can_upload: false,
            can_comment: true,
            client_hosts: vec!["H1".to_string()],
        }],
    };

    assert!(print(&Response::Status { snapshot: snapshot.clone() }, true).is_ok());
    assert!(print(&Response::Status { snapshot }, false).is_ok());
}

#[test]
fn print_status_text_with_empty_history_does_not_fail() {
    let snapshot = StatusSnapshot {
        config_path: None,
        config_version: None,
        bound_to_record_bus: false,
        recording: false,
        currently_recording_job_id: None,
        history: vec![],
    };

    assert!(print(&Response::Status { snapshot }, false).is_ok());
}

#[test]
fn print_upload_started_and_job_started_do_not_fail() {
    assert!(print(&Response::JobStarted { job_id: 7 }, false).is_ok());
    assert!(print(&Response::UploadStarted { job_id: 7, clients: vec!["H1".to_string(), "H2".to_string()] }, false)
        .is_ok());
    assert!(print(&Response::UploadsAttempted { count: 3 }, false).is_ok());
    assert!(print(&Response::JobStopped, false).is_ok());
    assert!(print(&Response::ShuttingDown, false).is_ok());
}
