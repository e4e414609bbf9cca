// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn job_bearing_commands_expose_their_meas_id() {
    let cfg = JobConfig::new(7, "/root", "meas");
    assert_eq!(RecorderCommand::StartRecording(cfg.clone()).meas_id(), Some(7));
    assert_eq!(RecorderCommand::SavePreBuffer(cfg).meas_id(), Some(7));
    assert_eq!(
        RecorderCommand::UploadMeasurement {
            meas_id: 9,
            config: UploadConfig::internal_ftp(),
            upload_metadata_files: false,
        }
        .meas_id(),
        Some(9)
    );
    assert_eq!(
        RecorderCommand::AddComment { meas_id: 3, text: "hi".into() }.meas_id(),
        Some(3)
    );
    assert_eq!(RecorderCommand::DeleteMeasurement { meas_id: 3 }.meas_id(), Some(3));
}

#[test]
fn non_job_bearing_commands_have_no_meas_id() {
    assert_eq!(RecorderCommand::Initialize.meas_id(), None);
    assert_eq!(RecorderCommand::StopRecording.meas_id(), None);
    assert!(!RecorderCommand::Initialize.is_job_bearing());
    assert!(RecorderCommand::StopRecording.meas_id().is_none());
}

#[test]
fn display_matches_wire_vocabulary() {
    assert_eq!(RecorderCommand::Initialize.to_string(), "initialize");
    assert_eq!(RecorderCommand::DeInitialize.to_string(), "de_initialize");
    assert_eq!(RecorderCommand::StopRecording.to_string(), "stop_recording");
    assert_eq!(RecorderCommand::Exit.to_string(), "exit");
}
