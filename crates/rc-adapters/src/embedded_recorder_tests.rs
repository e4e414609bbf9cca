// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rc_core::RecorderSettings;

#[test]
fn starts_disabled_with_empty_settings() {
    let recorder = FakeEmbeddedRecorder::new();
    assert!(!recorder.is_enabled());
    assert!(recorder.settings().is_empty());
}

#[test]
fn set_settings_accumulates_across_calls() {
    let recorder = FakeEmbeddedRecorder::new();
    let mut first = RecorderSettings::new();
    first.pre_buffering_enabled = Some(true);
    recorder.set_settings(&first);

    let mut second = RecorderSettings::new();
    second.record_mode = Some(rc_core::RecordMode::Blacklist);
    recorder.set_settings(&second);

    let merged = recorder.settings();
    assert_eq!(merged.pre_buffering_enabled, Some(true));
    assert_eq!(merged.record_mode, Some(rc_core::RecordMode::Blacklist));
}

#[test]
fn set_command_defaults_to_success_and_is_recorded() {
    let recorder = FakeEmbeddedRecorder::new();
    let (ok, msg) = recorder.set_command(&rc_core::RecorderCommand::Initialize);
    assert!(ok);
    assert!(msg.is_empty());
    assert_eq!(recorder.commands().len(), 1);
}

#[test]
fn scripted_command_response_is_consumed_once() {
    let recorder = FakeEmbeddedRecorder::new();
    recorder.script_command_response((false, "disk full".to_string()));

    let (ok, msg) = recorder.set_command(&rc_core::RecorderCommand::StartRecording(
        rc_core::JobConfig::new(1, "/tmp", "m"),
    ));
    assert!(!ok);
    assert_eq!(msg, "disk full");

    let (ok, _) = recorder.set_command(&rc_core::RecorderCommand::StopRecording);
    assert!(ok);
}

#[test]
fn pid_can_be_changed_to_simulate_a_respawn() {
    let recorder = FakeEmbeddedRecorder::with_pid(100);
    assert_eq!(recorder.pid(), 100);
    assert_eq!(recorder.get_state().client_pid, 100);

    recorder.set_pid(200);
    assert_eq!(recorder.pid(), 200);
    assert_eq!(recorder.get_state().client_pid, 200);
}
