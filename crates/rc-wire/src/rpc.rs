// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recorder-client RPC DTOs: `GetState`/`SetConfig`/`SetCommand` (spec §6).
//!
//! A fixed three-method service, unlike the daemon/CLI control channel's
//! open-ended tagged enum — so these are plain request/response structs
//! rather than a `Query`/`Response` pair.

use std::collections::BTreeMap;

use rc_core::{ErrorKind, JobConfig, RecordMode, RecorderCommand, RecorderSettings, RecorderStatus, UploadConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetStateRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetStateResponse {
    pub serialized_status: String,
}

impl GetStateResponse {
    pub fn from_status(status: &RecorderStatus) -> Self {
        Self { serialized_status: serde_json::to_string(status).unwrap_or_default() }
    }

    /// Parse the wire payload back into a `RecorderStatus`. The payload is
    /// an opaque JSON blob to every hop except the connection that placed
    /// the `GetState` call, mirroring `FromProtobuf` on the original's
    /// status response.
    pub fn to_status(&self) -> rc_core::Result<RecorderStatus> {
        serde_json::from_str(&self.serialized_status)
            .map_err(|e| ErrorKind::GenericError(Some(e.to_string())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpcResult {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericResponse {
    pub result: RpcResult,
    pub error: String,
}

impl GenericResponse {
    pub fn success() -> Self {
        Self { result: RpcResult::Success, error: String::new() }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { result: RpcResult::Failed, error: error.into() }
    }

    pub fn is_success(&self) -> bool {
        self.result == RpcResult::Success
    }
}

/// `SetConfig` request: the exact string-keyed map from spec §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetConfigRequest {
    pub fields: BTreeMap<String, String>,
}

pub mod set_config_keys {
    pub const MAX_PRE_BUFFER_LENGTH_SECS: &str = "max_pre_buffer_length_secs";
    pub const PRE_BUFFERING_ENABLED: &str = "pre_buffering_enabled";
    pub const HOST_FILTER: &str = "host_filter";
    pub const RECORD_MODE: &str = "record_mode";
    pub const LISTED_TOPICS: &str = "listed_topics";
    pub const ENABLED_ADDONS: &str = "enabled_addons";
}

impl SetConfigRequest {
    /// Serialise a `RecorderSettings` diff to the wire's string-keyed map.
    /// Only present fields are emitted, matching the partial-update
    /// semantics of `RecorderSettings` itself.
    pub fn from_settings(settings: &RecorderSettings) -> Self {
        use set_config_keys::*;
        let mut fields = BTreeMap::new();

        if let Some(d) = settings.max_pre_buffer_length {
            fields.insert(MAX_PRE_BUFFER_LENGTH_SECS.to_string(), format!("{:.3}", d.as_secs_f64()));
        }
        if let Some(b) = settings.pre_buffering_enabled {
            fields.insert(PRE_BUFFERING_ENABLED.to_string(), bool_str(b));
        }
        if let Some(set) = &settings.host_filter {
            fields.insert(HOST_FILTER.to_string(), join_newline(set));
        }
        if let Some(mode) = settings.record_mode {
            fields.insert(RECORD_MODE.to_string(), mode.to_string());
        }
        if let Some(set) = &settings.listed_topics {
            fields.insert(LISTED_TOPICS.to_string(), join_newline(set));
        }
        if let Some(set) = &settings.enabled_addons {
            fields.insert(ENABLED_ADDONS.to_string(), join_newline(set));
        }

        Self { fields }
    }

    /// Parse the wire map back into a `RecorderSettings` diff. Used by
    /// tests and by fake recorder-client implementations.
    pub fn to_settings(&self) -> RecorderSettings {
        use set_config_keys::*;
        let mut settings = RecorderSettings::new();

        if let Some(v) = self.fields.get(MAX_PRE_BUFFER_LENGTH_SECS) {
            if let Ok(secs) = v.parse::<f64>() {
                settings.max_pre_buffer_length = Some(std::time::Duration::from_secs_f64(secs));
            }
        }
        if let Some(v) = self.fields.get(PRE_BUFFERING_ENABLED) {
            settings.pre_buffering_enabled = Some(v == "true");
        }
        if let Some(v) = self.fields.get(HOST_FILTER) {
            settings.host_filter = Some(split_newline(v));
        }
        if let Some(v) = self.fields.get(RECORD_MODE) {
            settings.record_mode = v.parse::<RecordMode>().ok();
        }
        if let Some(v) = self.fields.get(LISTED_TOPICS) {
            settings.listed_topics = Some(split_newline(v));
        }
        if let Some(v) = self.fields.get(ENABLED_ADDONS) {
            settings.enabled_addons = Some(split_newline(v));
        }

        settings
    }
}

fn bool_str(b: bool) -> String {
    if b { "true".to_string() } else { "false".to_string() }
}

fn join_newline(set: &std::collections::BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join("\n")
}

fn split_newline(s: &str) -> std::collections::BTreeSet<String> {
    if s.is_empty() {
        return std::collections::BTreeSet::new();
    }
    s.lines().map(str::to_string).collect()
}

/// `SetCommand` request: `{command: enum, params: map<string,string>}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetCommandRequest {
    pub command: SetCommandKind,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetCommandKind {
    None,
    Initialize,
    DeInitialize,
    StartRecording,
    StopRecording,
    SavePreBuffer,
    UploadMeasurement,
    AddComment,
    DeleteMeasurement,
    Exit,
}

rc_core::simple_display! {
    SetCommandKind {
        None => "none",
        Initialize => "initialize",
        DeInitialize => "de_initialize",
        StartRecording => "start_recording",
        StopRecording => "stop_recording",
        SavePreBuffer => "save_pre_buffer",
        UploadMeasurement => "upload_measurement",
        AddComment => "add_comment",
        DeleteMeasurement => "delete_measurement",
        Exit => "exit",
    }
}

pub mod job_param_keys {
    pub const MEAS_ID: &str = "meas_id";
    pub const MEAS_ROOT_DIR: &str = "meas_root_dir";
    pub const MEAS_NAME: &str = "meas_name";
    pub const DESCRIPTION: &str = "description";
    pub const MAX_FILE_SIZE_MIB: &str = "max_file_size_mib";
    pub const ONE_FILE_PER_TOPIC: &str = "one_file_per_topic";
}

pub mod upload_param_keys {
    pub const PROTOCOL: &str = "protocol";
    pub const MEAS_ID: &str = "meas_id";
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const HOST: &str = "host";
    pub const PORT: &str = "port";
    pub const UPLOAD_PATH: &str = "upload_path";
    pub const UPLOAD_METADATA_FILES: &str = "upload_metadata_files";
    pub const DELETE_AFTER_UPLOAD: &str = "delete_after_upload";
}

impl SetCommandRequest {
    pub fn from_command(command: &RecorderCommand) -> Self {
        match command {
            RecorderCommand::None => Self::bare(SetCommandKind::None),
            RecorderCommand::Initialize => Self::bare(SetCommandKind::Initialize),
            RecorderCommand::DeInitialize => Self::bare(SetCommandKind::DeInitialize),
            RecorderCommand::StopRecording => Self::bare(SetCommandKind::StopRecording),
            RecorderCommand::Exit => Self::bare(SetCommandKind::Exit),
            RecorderCommand::StartRecording(cfg) => {
                Self { command: SetCommandKind::StartRecording, params: job_params(cfg) }
            }
            RecorderCommand::SavePreBuffer(cfg) => {
                Self { command: SetCommandKind::SavePreBuffer, params: job_params(cfg) }
            }
            RecorderCommand::UploadMeasurement { meas_id, config, upload_metadata_files } => Self {
                command: SetCommandKind::UploadMeasurement,
                params: upload_params(*meas_id, config, *upload_metadata_files),
            },
            RecorderCommand::AddComment { meas_id, text } => {
                let mut params = BTreeMap::new();
                params.insert(job_param_keys::MEAS_ID.to_string(), meas_id.to_string());
                params.insert("text".to_string(), text.clone());
                Self { command: SetCommandKind::AddComment, params }
            }
            RecorderCommand::DeleteMeasurement { meas_id } => {
                let mut params = BTreeMap::new();
                params.insert(job_param_keys::MEAS_ID.to_string(), meas_id.to_string());
                Self { command: SetCommandKind::DeleteMeasurement, params }
            }
        }
    }

    fn bare(command: SetCommandKind) -> Self {
        Self { command, params: BTreeMap::new() }
    }
}

fn job_params(cfg: &JobConfig) -> BTreeMap<String, String> {
    use job_param_keys::*;
    let mut params = BTreeMap::new();
    params.insert(MEAS_ID.to_string(), cfg.job_id.to_string());
    params.insert(MEAS_ROOT_DIR.to_string(), cfg.meas_root_dir.clone());
    params.insert(MEAS_NAME.to_string(), cfg.meas_name.clone());
    params.insert(DESCRIPTION.to_string(), cfg.description.clone());
    params.insert(MAX_FILE_SIZE_MIB.to_string(), cfg.max_file_size_mib.to_string());
    params.insert(ONE_FILE_PER_TOPIC.to_string(), bool_str(cfg.one_file_per_topic));
    params
}

fn upload_params(meas_id: i64, cfg: &UploadConfig, upload_metadata_files: bool) -> BTreeMap<String, String> {
    use upload_param_keys::*;
    let mut params = BTreeMap::new();
    params.insert(PROTOCOL.to_string(), "FTP".to_string());
    params.insert(MEAS_ID.to_string(), meas_id.to_string());
    params.insert(USERNAME.to_string(), cfg.username.clone());
    params.insert(PASSWORD.to_string(), cfg.password.clone());
    params.insert(HOST.to_string(), cfg.host.clone());
    params.insert(PORT.to_string(), cfg.port.to_string());
    params.insert(UPLOAD_PATH.to_string(), cfg.root_path.clone());
    params.insert(UPLOAD_METADATA_FILES.to_string(), bool_str(upload_metadata_files));
    params.insert(DELETE_AFTER_UPLOAD.to_string(), bool_str(cfg.delete_after_upload));
    params
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod tests;
