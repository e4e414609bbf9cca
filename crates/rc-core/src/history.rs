// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job-history entry types (spec §3). Storage for the append-only log
//! itself lives in `rc-storage`; this module only defines the shapes.

use std::collections::BTreeMap;

use crate::identity::ClientIdentity;
use crate::job_config::JobConfig;
use crate::status::JobStatus;
use crate::upload::UploadConfig;

/// The full status report from one client for the measurement it is
/// tracking: its process id, its job status, and the result of its most
/// recent command, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientJobStatus {
    pub client_pid: u32,
    pub job_status: JobStatus,
    pub info_last_command_response: crate::status::UploadStatus,
}

impl ClientJobStatus {
    pub fn not_started(client_pid: u32, job_id: i64) -> Self {
        Self {
            client_pid,
            job_status: JobStatus::not_started(job_id),
            info_last_command_response: crate::status::UploadStatus::default(),
        }
    }
}

/// One measurement's full history: created at job start, mutated only by
/// status callbacks and upload/delete bookkeeping, never destroyed
/// (invariant 4: its `job_id` is unique and monotonically generated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHistoryEntry {
    pub local_start_time_epoch_ms: u64,
    pub local_evaluated_job_config: JobConfig,
    pub is_uploaded: bool,
    pub is_deleted: bool,
    pub upload_config_used: Option<UploadConfig>,
    pub client_statuses: BTreeMap<ClientIdentity, ClientJobStatus>,
}

impl JobHistoryEntry {
    pub fn new(local_start_time_epoch_ms: u64, local_evaluated_job_config: JobConfig) -> Self {
        Self {
            local_start_time_epoch_ms,
            local_evaluated_job_config,
            is_uploaded: false,
            is_deleted: false,
            upload_config_used: None,
            client_statuses: BTreeMap::new(),
        }
    }

    pub fn job_id(&self) -> i64 {
        self.local_evaluated_job_config.job_id
    }

    /// Hosts whose job state is `Recording`, or whose addons are.
    pub fn hosts_recording(&self) -> Vec<&ClientIdentity> {
        self.client_statuses
            .iter()
            .filter(|(_, s)| {
                s.job_status.state.is_recording()
                    || s.job_status.addon_statuses.values().any(|a| a.state.is_recording())
            })
            .map(|(h, _)| h)
            .collect()
    }

    /// Hosts whose job state is `Flushing`, or whose addons are.
    pub fn hosts_flushing(&self) -> Vec<&ClientIdentity> {
        self.client_statuses
            .iter()
            .filter(|(_, s)| {
                s.job_status.state.is_flushing()
                    || s.job_status.addon_statuses.values().any(|a| a.state.is_flushing())
            })
            .map(|(h, _)| h)
            .collect()
    }

    /// Hosts whose job state is `Uploading`.
    pub fn hosts_uploading(&self) -> Vec<&ClientIdentity> {
        self.client_statuses
            .iter()
            .filter(|(_, s)| s.job_status.state.is_uploading())
            .map(|(h, _)| h)
            .collect()
    }

    /// Hosts whose job state is `FinishedUploading` with a failed upload.
    pub fn hosts_upload_failed(&self) -> Vec<&ClientIdentity> {
        self.client_statuses
            .iter()
            .filter(|(_, s)| {
                matches!(s.job_status.state, crate::status::JobState::FinishedUploading)
                    && !s.job_status.upload_status.ok
            })
            .map(|(h, _)| h)
            .collect()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl JobHistoryEntry {
    /// Test helper: add a client status entry in one call.
    pub fn with_client_status(mut self, host: impl Into<ClientIdentity>, status: ClientJobStatus) -> Self {
        self.client_statuses.insert(host.into(), status);
        self
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
