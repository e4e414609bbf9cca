// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon↔CLI control channel: a `Query`/`Response` tagged-enum pair,
//! grounded on the teacher's `crates/wire/src/query.rs`/`response.rs`
//! shape. Not specified by spec.md (the transport is external there) but
//! required for an operator to drive the coordinator from `rc-cli` at all.

use std::collections::BTreeMap;

use rc_core::{ErrorKind, JobConfig, UploadConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Query {
    EnableClients { clients: BTreeMap<String, ClientConfigWire> },
    ConnectRecordBus,
    DisconnectRecordBus,
    StartRecording,
    SavePreBuffer,
    StopRecording,
    UploadMeasurement { meas_id: i64, upload_config: UploadConfig },
    UploadNonUploaded,
    AddComment { meas_id: i64, text: String },
    DeleteMeasurement { meas_id: i64 },
    SetJobConfigTemplate { template: JobConfig },
    Status,
    Shutdown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfigWire {
    pub enabled_addons: Vec<String>,
    pub host_filter: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Ok,
    Error { kind: String, message: Option<String> },
    JobStarted { job_id: i64 },
    JobStopped,
    UploadStarted { job_id: i64, clients: Vec<String> },
    UploadsAttempted { count: usize },
    Status { snapshot: StatusSnapshot },
    ShuttingDown,
}

impl Response {
    pub fn from_error(err: &ErrorKind) -> Self {
        Response::Error { kind: error_kind_tag(err), message: err.context().map(str::to_string) }
    }
}

fn error_kind_tag(err: &ErrorKind) -> String {
    // thiserror's Display already renders the human-readable message; this
    // tag is the stable machine-readable discriminant for CLI scripts.
    match err {
        ErrorKind::Ok => "ok",
        ErrorKind::GenericError(_) => "generic_error",
        ErrorKind::NotInitialized(_) => "not_initialized",
        ErrorKind::AlreadyInitialized(_) => "already_initialized",
        ErrorKind::ParameterError(_) => "parameter_error",
        ErrorKind::UnsupportedAction(_) => "unsupported_action",
        ErrorKind::ResourceUnavailable(_) => "resource_unavailable",
        ErrorKind::ActionSuperfluous(_) => "action_superfluous",
        ErrorKind::AlreadyUploaded(_) => "already_uploaded",
        ErrorKind::CurrentlyRecording(_) => "currently_recording",
        ErrorKind::CurrentlyFlushing(_) => "currently_flushing",
        ErrorKind::CurrentlyUploading(_) => "currently_uploading",
        ErrorKind::MeasIdNotFound(_) => "meas_id_not_found",
        ErrorKind::MeasIsDeleted(_) => "meas_is_deleted",
    }
    .to_string()
}

/// Composite status snapshot (§4.4.6): config path, bus-bound state,
/// currently-recording job, per-entry eligibility bits, per-host statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub config_path: Option<String>,
    pub config_version: Option<u32>,
    pub bound_to_record_bus: bool,
    pub recording: bool,
    pub currently_recording_job_id: Option<i64>,
    pub history: Vec<JobHistorySummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobHistorySummary {
    pub job_id: i64,
    pub meas_name: String,
    pub is_uploaded: bool,
    pub is_deleted: bool,
    pub can_upload: bool,
    pub can_comment: bool,
    pub client_hosts: Vec<String>,
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
