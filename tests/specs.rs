// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level integration tests, one per end-to-end scenario with
//! literal inputs: happy-path upload, upload-while-flushing rejection,
//! autorecovery after transient RPC loss, delete-while-recording rejection,
//! add-comment eligibility around a respawned local recorder, and
//! connection pruning. Each exercises the Coordinator and Remote Connection
//! the way `coordinator_tests.rs`/`remote_tests.rs` do per-crate, but wires
//! multiple simulated hosts together end to end.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use rc_adapters::{
    FakeDiscovery, FakeEmbeddedRecorder, FakeFtpUserManager, FakeRpcTransport, FakeTemplateEvaluator,
    ServiceInstanceId, TransportError,
};
use rc_connection::{ClientConnection, LocalConnection, RemoteConnection};
use rc_coordinator::Coordinator;
use rc_core::{
    ClientConfig, ClientIdentity, ErrorKind, FakeClock, JobConfig, JobState, RecorderCommand,
    RecorderStatus, UploadConfig,
};
use rc_wire::rpc::GetStateResponse;

fn harness(meas_root_dir: &str) -> (Coordinator<FakeClock>, Arc<FakeEmbeddedRecorder>, FakeClock) {
    let embedded = Arc::new(FakeEmbeddedRecorder::new());
    let clock = FakeClock::new();
    let coordinator = Coordinator::new(
        ClientIdentity::new("local"),
        Arc::new(FakeDiscovery::new()),
        Arc::new(FakeRpcTransport::new()),
        embedded.clone(),
        Arc::new(FakeFtpUserManager::new()),
        Arc::new(FakeTemplateEvaluator::new()),
        clock.clone(),
    );
    coordinator.set_job_config_template(JobConfig::new(0, meas_root_dir, "meas_$MEAS_ID"));
    (coordinator, embedded, clock)
}

/// Stand in for a remote host with a `LocalConnection` over its own fake
/// embedded recorder, pre-registered so `set_enabled_clients` reuses it
/// instead of spawning a real `RemoteConnection` worker thread. Returns the
/// connection itself (so a test can drive `ever_participated` through the
/// real `set_command` path) alongside its backing fake.
fn register_simulated_host(
    coordinator: &Coordinator<FakeClock>,
    host: &str,
) -> (Arc<dyn ClientConnection>, Arc<FakeEmbeddedRecorder>) {
    let embedded = Arc::new(FakeEmbeddedRecorder::new());
    let history = coordinator.job_history();
    let status_history = history.clone();
    let status_cb = Arc::new(move |h: &ClientIdentity, status: &RecorderStatus| {
        status_history.update_from_client_status(h, status);
    });
    let response_cb = Arc::new(move |job_id: i64, h: &ClientIdentity, resp: (bool, String)| {
        history.update_from_command_response(job_id, h, resp);
    });
    let conn: Arc<dyn ClientConnection> = Arc::new(LocalConnection::new(
        ClientIdentity::new(host),
        embedded.clone(),
        status_cb,
        response_cb,
        rc_core::RecorderSettings::new(),
        false,
        FakeClock::new(),
    ));
    coordinator.test_register_connection(ClientIdentity::new(host), conn.clone());
    (conn, embedded)
}

fn enable(coordinator: &Coordinator<FakeClock>, hosts: &[&str]) {
    let mut enabled = BTreeMap::new();
    for host in hosts {
        enabled.insert(ClientIdentity::new(*host), ClientConfig::new());
    }
    coordinator.set_enabled_clients(enabled).expect("enabling clients should succeed outside a recording");
}

fn report_finished_flushing(coordinator: &Coordinator<FakeClock>, host: &str, embedded: &FakeEmbeddedRecorder, job_id: i64) {
    let mut status = RecorderStatus::new(embedded.pid(), true);
    let mut job_status = rc_core::JobStatus::not_started(job_id);
    job_status.state = JobState::FinishedFlushing;
    status.job_statuses.push(job_status);
    embedded.set_status(status.clone());
    coordinator.job_history().update_from_client_status(&ClientIdentity::new(host), &status);
}

fn report_flushing(coordinator: &Coordinator<FakeClock>, host: &str, embedded: &FakeEmbeddedRecorder, job_id: i64) {
    let mut status = RecorderStatus::new(embedded.pid(), true);
    let mut job_status = rc_core::JobStatus::not_started(job_id);
    job_status.state = JobState::Flushing;
    status.job_statuses.push(job_status);
    embedded.set_status(status.clone());
    coordinator.job_history().update_from_client_status(&ClientIdentity::new(host), &status);
}

#[test]
fn happy_path_record_then_upload_external_ftp() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let (coordinator, _local_embedded, clock) = harness(tmp.path().to_str().expect("utf8 path"));

    let (_h1_conn, h1) = register_simulated_host(&coordinator, "H1");
    let (_h2_conn, h2) = register_simulated_host(&coordinator, "H2");
    enable(&coordinator, &["H1", "H2"]);

    coordinator.connect_to_record_bus();
    let job_id = coordinator.start_recording().expect("start_recording should succeed");

    clock.advance(Duration::from_secs(2));
    coordinator.stop_recording().expect("stop_recording should succeed");

    report_finished_flushing(&coordinator, "H1", &h1, job_id);
    report_finished_flushing(&coordinator, "H2", &h2, job_id);

    coordinator.set_upload_config(UploadConfig::external_ftp("store", 21, "/m"));
    let uploaded_to = coordinator.upload_measurement(job_id).expect("upload should be eligible");
    assert_eq!(uploaded_to.len(), 2);

    // Alphabetically smallest host (H1) is the metadata uploader.
    let h1_uploads: Vec<_> = h1
        .commands()
        .into_iter()
        .filter_map(|c| match c {
            RecorderCommand::UploadMeasurement { meas_id, upload_metadata_files, .. } if meas_id == job_id => {
                Some(upload_metadata_files)
            }
            _ => None,
        })
        .collect();
    assert_eq!(h1_uploads, vec![true]);

    let h2_uploads: Vec<_> = h2
        .commands()
        .into_iter()
        .filter_map(|c| match c {
            RecorderCommand::UploadMeasurement { meas_id, upload_metadata_files, .. } if meas_id == job_id => {
                Some(upload_metadata_files)
            }
            _ => None,
        })
        .collect();
    assert_eq!(h2_uploads, vec![false]);

    let status = coordinator.status();
    assert!(status.history[0].is_uploaded);
}

#[test]
fn upload_rejected_while_a_client_is_still_flushing() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let (coordinator, _local_embedded, _clock) = harness(tmp.path().to_str().expect("utf8 path"));

    let (_h1_conn, h1) = register_simulated_host(&coordinator, "H1");
    let (_h2_conn, h2) = register_simulated_host(&coordinator, "H2");
    enable(&coordinator, &["H1", "H2"]);

    coordinator.connect_to_record_bus();
    let job_id = coordinator.start_recording().expect("start_recording should succeed");
    coordinator.stop_recording().expect("stop_recording should succeed");

    report_finished_flushing(&coordinator, "H1", &h1, job_id);
    report_flushing(&coordinator, "H2", &h2, job_id);

    coordinator.set_upload_config(UploadConfig::external_ftp("store", 21, "/m"));
    let err = coordinator.upload_measurement(job_id).unwrap_err();
    match err {
        ErrorKind::CurrentlyFlushing(Some(hosts)) => assert_eq!(hosts, "H2"),
        other => panic!("expected CurrentlyFlushing(\"H2\"), got {other:?}"),
    }

    let status = coordinator.status();
    assert!(!status.history[0].is_uploaded);
    assert!(!status.history[0].is_deleted);
}

#[test]
fn autorecovery_after_five_consecutive_rpc_failures() {
    let discovery = Arc::new(FakeDiscovery::new());
    let transport = Arc::new(FakeRpcTransport::new());
    let clock = FakeClock::new();
    let status_cb = Arc::new(|_: &ClientIdentity, _: &RecorderStatus| {});
    let response_cb = Arc::new(|_: i64, _: &ClientIdentity, _: (bool, String)| {});

    let conn = RemoteConnection::new_unstarted(
        ClientIdentity::new("remote1"),
        discovery.clone() as Arc<dyn rc_adapters::Discovery>,
        transport.clone() as Arc<dyn rc_adapters::RpcTransport>,
        status_cb,
        response_cb,
        rc_core::RecorderSettings::new(),
        false,
        clock.clone(),
    );

    let instance = ServiceInstanceId::new("remote1#1");
    discovery.register("remote1", instance.clone());
    transport.mark_registered(instance.clone(), true);
    transport.set_get_state_response(instance.clone(), Ok(GetStateResponse::from_status(&RecorderStatus::new(7, false))));
    conn.step();
    assert!(conn.is_alive());

    conn.set_enabled(true, true);
    conn.step();
    conn.step();
    conn.set_command(&RecorderCommand::StartRecording(JobConfig::new(1, "/root", "meas")));
    conn.step();

    transport.set_get_state_response(instance.clone(), Err(TransportError::Unreachable("gone".to_string())));
    for _ in 0..5 {
        clock.advance(Duration::from_millis(250));
        conn.step();
        assert!(!conn.is_alive(), "connection should stay unbound across repeated GetState failures");
    }

    let instance_b = ServiceInstanceId::new("remote1#2");
    discovery.clear("remote1");
    discovery.register("remote1", instance_b.clone());
    transport.mark_registered(instance_b.clone(), true);
    transport.set_get_state_response(instance_b.clone(), Ok(GetStateResponse::from_status(&RecorderStatus::new(7, false))));
    conn.step();

    assert!(conn.is_alive());
    assert!(conn.is_request_pending(), "rebinding while enabled should queue an autorecovery plan");
}

#[test]
fn delete_rejected_while_recording() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let (coordinator, _embedded, _clock) = harness(tmp.path().to_str().expect("utf8 path"));
    enable(&coordinator, &["local"]);

    let job_id = coordinator.start_recording().expect("start_recording should succeed");

    let err = coordinator.delete_measurement(job_id).unwrap_err();
    assert!(matches!(err, ErrorKind::CurrentlyRecording(_)));

    let status = coordinator.status();
    assert!(!status.history[0].is_deleted);
}

#[test]
fn add_comment_after_internal_ftp_upload_then_rejected_once_local_pid_changes() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let (coordinator, local_embedded, _clock) = harness(tmp.path().to_str().expect("utf8 path"));

    let (_h1_conn, h1) = register_simulated_host(&coordinator, "H1");
    enable(&coordinator, &["local", "H1"]);

    coordinator.connect_to_record_bus();
    let job_id = coordinator.start_recording().expect("start_recording should succeed");
    coordinator.stop_recording().expect("stop_recording should succeed");

    report_finished_flushing(&coordinator, "local", &local_embedded, job_id);
    report_finished_flushing(&coordinator, "H1", &h1, job_id);

    coordinator.set_upload_config(UploadConfig::internal_ftp());
    coordinator.upload_measurement(job_id).expect("internal FTP upload should be eligible with H1 participating");

    coordinator.add_comment(job_id, "note").expect("local host participated with an unchanged pid");

    local_embedded.set_pid(local_embedded.pid() + 1);
    let err = coordinator.add_comment(job_id, "note after respawn").unwrap_err();
    match err {
        ErrorKind::AlreadyUploaded(Some(msg)) => {
            assert!(msg.contains("not reachable any more"), "unexpected message: {msg}")
        }
        other => panic!("expected AlreadyUploaded, got {other:?}"),
    }
}

#[test]
fn connection_pruning_respects_measurement_participation() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let (coordinator, _embedded, _clock) = harness(tmp.path().to_str().expect("utf8 path"));

    let (_h3_idle_conn, _h3_idle_embedded) = register_simulated_host(&coordinator, "H3-idle");

    let (h3_active_conn, _h3_active_embedded) = register_simulated_host(&coordinator, "H3-active");
    // Dispatching a job-bearing command directly against the connection
    // flips its own `ever_participated` bookkeeping, exactly as it would if
    // the coordinator had enabled and dispatched a real job to this host.
    h3_active_conn.set_enabled(true, false);
    h3_active_conn.set_command(&RecorderCommand::SavePreBuffer(JobConfig::new(1, "/root", "meas")));
    assert!(h3_active_conn.ever_participated_in_measurement());

    coordinator.update_connections(&Default::default());

    let status = coordinator.status();
    assert!(
        !status.client_statuses.contains_key(&ClientIdentity::new("H3-idle")),
        "a host that never participated should be pruned once it disappears from the monitor"
    );
    assert!(
        status.client_statuses.contains_key(&ClientIdentity::new("H3-active")),
        "a host that participated in a measurement must never be pruned"
    );
}
