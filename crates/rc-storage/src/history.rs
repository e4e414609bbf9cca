// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Job-History Store (C3, spec §4.3): an append-only log of
//! `JobHistoryEntry`, guarded by a single reader-writer lock. Connections
//! feed it status updates and command responses through callbacks; the
//! coordinator appends new entries and reads snapshots.
//!
//! Deliberately a plain `RwLock<Vec<JobHistoryEntry>>`, not the teacher's
//! event-sourced `MaterializedState::apply_event` replay machinery — that
//! solves WAL replay, which this append/update/snapshot contract doesn't
//! need. The locking discipline (`parking_lot`, snapshot returns an owned
//! clone) still follows the teacher's "copy-returning getters" convention.

use parking_lot::RwLock;
use rc_core::{ClientIdentity, JobHistoryEntry, RecorderStatus, UploadStatus};

/// Append-only log of measurement jobs, guarded by a single `RwLock`.
pub struct JobHistoryStore {
    entries: RwLock<Vec<JobHistoryEntry>>,
}

impl JobHistoryStore {
    pub fn new() -> Self {
        Self { entries: RwLock::new(Vec::new()) }
    }

    /// Append a newly-created entry (spec §4.3: called when a job starts or
    /// a pre-buffer-save job is dispatched). Panics in debug builds if the
    /// new entry's `job_id` collides with an existing one (invariant 4).
    pub fn append(&self, entry: JobHistoryEntry) {
        let mut entries = self.entries.write();
        debug_assert!(
            entries.iter().all(|e| e.job_id() != entry.job_id()),
            "job_id {} already present in history",
            entry.job_id()
        );
        entries.push(entry);
    }

    /// Status callback: locate every entry the report mentions by `job_id`
    /// and merge the client's reported state into it (spec §4.3).
    pub fn update_from_client_status(&self, host: &ClientIdentity, status: &RecorderStatus) {
        let mut entries = self.entries.write();
        for job_status in &status.job_statuses {
            let Some(entry) = entries.iter_mut().find(|e| e.job_id() == job_status.job_id) else {
                continue;
            };
            let Some(client) = entry.client_statuses.get_mut(host) else {
                continue;
            };

            client.client_pid = status.client_pid;
            client.job_status.state = job_status.state;
            client.job_status.upload_status = job_status.upload_status.clone();
            client.job_status.is_deleted = job_status.is_deleted;
            client.job_status.rec_hdf5_status = job_status.rec_hdf5_status.clone();

            for (addon_id, addon_status) in &job_status.addon_statuses {
                client.job_status.addon_statuses.insert(addon_id.clone(), addon_status.clone());
            }

            for (addon_id, existing) in client.job_status.addon_statuses.iter_mut() {
                if existing.state == rc_core::AddonJobState::FinishedFlushing {
                    continue;
                }
                if !job_status.addon_statuses.contains_key(addon_id) {
                    existing.info = UploadStatus::failed("The addon has failed");
                }
            }
        }
    }

    /// Command-response callback: record the most recent response for a
    /// (job, host) pair (spec §4.3).
    pub fn update_from_command_response(&self, job_id: i64, host: &ClientIdentity, response: (bool, String)) {
        let mut entries = self.entries.write();
        let Some(entry) = entries.iter_mut().find(|e| e.job_id() == job_id) else { return };
        let Some(client) = entry.client_statuses.get_mut(host) else { return };
        client.info_last_command_response = if response.0 {
            UploadStatus::ok()
        } else {
            UploadStatus::failed(response.1)
        };
    }

    /// Decoupled copy of the full log, safe to iterate without holding the lock.
    pub fn snapshot(&self) -> Vec<JobHistoryEntry> {
        self.entries.read().clone()
    }

    /// Look up a single entry by job id (used by the coordinator before
    /// mutating upload/delete bookkeeping).
    pub fn find(&self, job_id: i64) -> Option<JobHistoryEntry> {
        self.entries.read().iter().find(|e| e.job_id() == job_id).cloned()
    }

    /// Apply an in-place mutation to the entry with the given job id, if
    /// present. Used for `is_uploaded`/`is_deleted`/`upload_config_used`
    /// bookkeeping so the coordinator never has to re-lock between a read
    /// and a write.
    pub fn mutate(&self, job_id: i64, f: impl FnOnce(&mut JobHistoryEntry)) -> bool {
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|e| e.job_id() == job_id) {
            Some(entry) => {
                f(entry);
                true
            }
            None => false,
        }
    }
}

impl Default for JobHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
