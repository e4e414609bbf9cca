// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-client job status as reported by `GetState` (spec §3, §6).

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum JobState {
    NotStarted,
    Recording,
    Flushing,
    FinishedFlushing,
    Uploading,
    FinishedUploading,
}

crate::simple_display! {
    JobState {
        NotStarted => "not_started",
        Recording => "recording",
        Flushing => "flushing",
        FinishedFlushing => "finished_flushing",
        Uploading => "uploading",
        FinishedUploading => "finished_uploading",
    }
}

impl JobState {
    pub fn is_recording(&self) -> bool {
        matches!(self, JobState::Recording)
    }

    pub fn is_flushing(&self) -> bool {
        matches!(self, JobState::Flushing)
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self, JobState::Uploading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AddonJobState {
    NotStarted,
    Recording,
    Flushing,
    FinishedFlushing,
}

crate::simple_display! {
    AddonJobState {
        NotStarted => "not_started",
        Recording => "recording",
        Flushing => "flushing",
        FinishedFlushing => "finished_flushing",
    }
}

impl AddonJobState {
    pub fn is_recording(&self) -> bool {
        matches!(self, AddonJobState::Recording)
    }

    pub fn is_flushing(&self) -> bool {
        matches!(self, AddonJobState::Flushing)
    }
}

/// `{ok, msg}` pair reused for upload results and generic RPC responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UploadStatus {
    pub ok: bool,
    pub msg: String,
}

impl UploadStatus {
    pub fn ok() -> Self {
        Self { ok: true, msg: String::new() }
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self { ok: false, msg: msg.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Hdf5Status {
    pub ok: bool,
    pub msg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AddonJobStatus {
    pub addon_id: String,
    pub state: AddonJobState,
    /// `{ok, msg}` for the addon, mirroring `UploadStatus`. Set to a failure
    /// by the Job-History Store when the addon stops reporting before
    /// reaching `FinishedFlushing` (spec §4.3).
    pub info: UploadStatus,
}

impl AddonJobStatus {
    pub fn not_started(addon_id: impl Into<String>) -> Self {
        Self { addon_id: addon_id.into(), state: AddonJobState::NotStarted, info: UploadStatus::ok() }
    }
}

/// A client's full `GetState` report: its pid, whether it is initialized
/// (connected to the record bus), and the status of every job it is
/// currently tracking. Connections feed this to the Job-History Store's
/// status callback (spec §4.1.b step 4, §4.3).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecorderStatus {
    pub client_pid: u32,
    pub initialized: bool,
    pub job_statuses: Vec<JobStatus>,
}

impl RecorderStatus {
    pub fn new(client_pid: u32, initialized: bool) -> Self {
        Self { client_pid, initialized, job_statuses: Vec::new() }
    }
}

/// A single client's report for a single job, as returned by `GetState`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct JobStatus {
    pub job_id: i64,
    pub state: JobState,
    pub upload_status: UploadStatus,
    pub is_deleted: bool,
    pub rec_hdf5_status: Hdf5Status,
    pub addon_statuses: BTreeMap<String, AddonJobStatus>,
}

impl JobStatus {
    pub fn not_started(job_id: i64) -> Self {
        Self {
            job_id,
            state: JobState::NotStarted,
            upload_status: UploadStatus::default(),
            is_deleted: false,
            rec_hdf5_status: Hdf5Status::default(),
            addon_statuses: BTreeMap::new(),
        }
    }
}


#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
