// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures for downstream crates. Gated behind `test-support`
//! so `rc-coordinator`/`rc-connection`/`rc-storage` tests can build
//! realistic `JobHistoryEntry`/`ClientJobStatus` values without duplicating
//! boilerplate.

use crate::history::{ClientJobStatus, JobHistoryEntry};
use crate::identity::ClientIdentity;
use crate::job_config::JobConfig;
use crate::status::{JobState, JobStatus};

/// A `JobHistoryEntry` with one client per host in `hosts`, all `NotStarted`.
pub fn history_entry(job_id: i64, hosts: &[&str]) -> JobHistoryEntry {
    let mut entry = JobHistoryEntry::new(1_000_000, JobConfig::new(job_id, "/root", "meas"));
    for (i, host) in hosts.iter().enumerate() {
        entry.client_statuses.insert(
            ClientIdentity::new(*host),
            ClientJobStatus::not_started(1000 + i as u32, job_id),
        );
    }
    entry
}

/// Set a client's job state within an already-built entry.
pub fn set_client_state(entry: &mut JobHistoryEntry, host: &str, state: JobState) {
    if let Some(status) = entry.client_statuses.get_mut(&ClientIdentity::new(host)) {
        status.job_status.state = state;
    }
}

pub fn job_status(job_id: i64, state: JobState) -> JobStatus {
    let mut s = JobStatus::not_started(job_id);
    s.state = state;
    s
}
