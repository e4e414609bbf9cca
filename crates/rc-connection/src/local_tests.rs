// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex as PlMutex;
use rc_adapters::FakeEmbeddedRecorder;
use rc_core::{FakeClock, JobConfig, RecorderSettings};

struct Callbacks {
    statuses: Arc<PlMutex<Vec<(ClientIdentity, rc_core::RecorderStatus)>>>,
    responses: Arc<PlMutex<Vec<(i64, ClientIdentity, (bool, String))>>>,
}

fn harness() -> (LocalConnection<FakeClock>, Arc<FakeEmbeddedRecorder>, Callbacks) {
    let embedded = Arc::new(FakeEmbeddedRecorder::new());
    let statuses = Arc::new(PlMutex::new(Vec::new()));
    let responses = Arc::new(PlMutex::new(Vec::new()));

    let status_cb = {
        let statuses = statuses.clone();
        let cb: StatusCallback = Arc::new(move |host, status| {
            statuses.lock().push((host.clone(), status.clone()));
        });
        cb
    };
    let response_cb = {
        let responses = responses.clone();
        let cb: StatusResponseCallback = Arc::new(move |job_id, host, resp| {
            responses.lock().push((job_id, host.clone(), resp));
        });
        cb
    };

    let conn = LocalConnection::new(
        ClientIdentity::new("local"),
        embedded.clone() as Arc<dyn EmbeddedRecorder>,
        status_cb,
        response_cb,
        RecorderSettings::new(),
        false,
        FakeClock::new(),
    );

    (conn, embedded, Callbacks { statuses, responses })
}

#[test]
fn disabled_connection_rejects_gated_commands() {
    let (conn, embedded, _) = harness();
    conn.set_command(&RecorderCommand::Initialize);
    assert!(embedded.commands().is_empty());
}

#[test]
fn enabling_applies_accumulated_settings_and_connects() {
    let (conn, embedded, cb) = harness();
    let mut settings = RecorderSettings::new();
    settings.pre_buffering_enabled = Some(true);
    conn.set_settings(&settings);

    conn.set_enabled(true, true);

    assert!(conn.is_alive());
    assert!(embedded.is_enabled());
    assert_eq!(embedded.settings().pre_buffering_enabled, Some(true));
    assert_eq!(cb.statuses.lock().len(), 1);
}

#[test]
fn upload_command_bypasses_the_enabled_gate() {
    let (conn, embedded, cb) = harness();
    conn.set_command(&RecorderCommand::UploadMeasurement {
        meas_id: 9,
        config: rc_core::UploadConfig::internal_ftp(),
        upload_metadata_files: true,
    });

    assert_eq!(embedded.commands().len(), 1);
    assert_eq!(cb.responses.lock().len(), 1);
    assert_eq!(cb.responses.lock()[0].0, 9);
}

#[test]
fn start_recording_marks_ever_participated() {
    let (conn, _embedded, _) = harness();
    conn.set_enabled(true, true);
    conn.set_command(&RecorderCommand::StartRecording(JobConfig::new(1, "/root", "m")));

    assert!(conn.ever_participated_in_measurement());
}

#[test]
fn disabling_clears_in_sync_but_keeps_ever_participated() {
    let (conn, _embedded, _) = harness();
    conn.set_enabled(true, true);
    conn.set_command(&RecorderCommand::StartRecording(JobConfig::new(1, "/root", "m")));
    conn.set_enabled(false, false);

    assert!(!conn.is_alive());
    assert!(conn.ever_participated_in_measurement());
}

#[test]
fn command_response_is_not_reported_for_non_job_bearing_commands() {
    let (conn, _embedded, cb) = harness();
    conn.set_enabled(true, true);
    conn.set_command(&RecorderCommand::StopRecording);
    assert!(cb.responses.lock().is_empty());
}
