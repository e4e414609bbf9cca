// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The command vocabulary a client connection can dispatch to its peer.
//!
//! Grounded on `original_source/.../recorder_command.h`; that C++ snapshot
//! lacks `UploadMeasurement`/`AddComment`/`DeleteMeasurement` (an earlier
//! stage of the same mechanism), but spec.md §3 explicitly specifies them,
//! so they are implemented in full here.

use crate::job_config::JobConfig;
use crate::upload::UploadConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum RecorderCommand {
    None,
    Initialize,
    DeInitialize,
    StartRecording(JobConfig),
    StopRecording,
    SavePreBuffer(JobConfig),
    UploadMeasurement { meas_id: i64, config: UploadConfig, upload_metadata_files: bool },
    AddComment { meas_id: i64, text: String },
    DeleteMeasurement { meas_id: i64 },
    Exit,
}

impl RecorderCommand {
    /// Whether this command carries a measurement id a status callback
    /// should be keyed on (spec §4.1.b step 4, "job-bearing commands").
    pub fn meas_id(&self) -> Option<i64> {
        match self {
            RecorderCommand::StartRecording(cfg) | RecorderCommand::SavePreBuffer(cfg) => {
                Some(cfg.job_id)
            }
            RecorderCommand::UploadMeasurement { meas_id, .. } => Some(*meas_id),
            RecorderCommand::AddComment { meas_id, .. } => Some(*meas_id),
            RecorderCommand::DeleteMeasurement { meas_id } => Some(*meas_id),
            _ => None,
        }
    }

    pub fn is_job_bearing(&self) -> bool {
        matches!(
            self,
            RecorderCommand::StartRecording(_)
                | RecorderCommand::SavePreBuffer(_)
                | RecorderCommand::UploadMeasurement { .. }
                | RecorderCommand::AddComment { .. }
                | RecorderCommand::DeleteMeasurement { .. }
        )
    }
}

impl std::fmt::Display for RecorderCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RecorderCommand::None => "none",
            RecorderCommand::Initialize => "initialize",
            RecorderCommand::DeInitialize => "de_initialize",
            RecorderCommand::StartRecording(..) => "start_recording",
            RecorderCommand::StopRecording => "stop_recording",
            RecorderCommand::SavePreBuffer(..) => "save_pre_buffer",
            RecorderCommand::UploadMeasurement { .. } => "upload_measurement",
            RecorderCommand::AddComment { .. } => "add_comment",
            RecorderCommand::DeleteMeasurement { .. } => "delete_measurement",
            RecorderCommand::Exit => "exit",
        })
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
