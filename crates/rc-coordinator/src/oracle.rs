// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Eligibility Oracle (C5, spec §4.5): pure predicates over a
//! `JobHistoryEntry` deciding whether a measurement can be uploaded,
//! commented on, or deleted. Styled after `crates/core/src/decision.rs`'s
//! small pure-function module — no locking, no I/O, everything here is a
//! plain function of its arguments.

use std::collections::BTreeSet;

use rc_core::{ClientIdentity, ErrorKind, JobHistoryEntry, JobState, UploadProtocol};

fn join_hosts<'a>(hosts: impl IntoIterator<Item = &'a ClientIdentity>) -> String {
    let mut names: Vec<&str> = hosts.into_iter().map(|h| h.host()).collect();
    names.sort_unstable();
    names.join(", ")
}

/// Can `entry` be uploaded right now, given the server's current upload
/// sink configuration? Spec §4.5 `simulate_upload`.
pub fn simulate_upload(entry: &JobHistoryEntry, upload_protocol: UploadProtocol, upload_host: &str) -> ErrorKind {
    if entry.is_deleted {
        return ErrorKind::MeasIsDeleted(None);
    }

    if upload_protocol == UploadProtocol::ExternalFtp && upload_host.is_empty() {
        return ErrorKind::ParameterError(Some("upload host is empty".to_string()));
    }

    if entry.local_evaluated_job_config.meas_name.is_empty() {
        return ErrorKind::ParameterError(Some("measurement name is empty".to_string()));
    }

    let recording = entry.hosts_recording();
    if !recording.is_empty() {
        return ErrorKind::CurrentlyRecording(Some(join_hosts(recording)));
    }

    let flushing = entry.hosts_flushing();
    if !flushing.is_empty() {
        return ErrorKind::CurrentlyFlushing(Some(join_hosts(flushing)));
    }

    let uploading = entry.hosts_uploading();
    if !uploading.is_empty() {
        return ErrorKind::CurrentlyUploading(Some(join_hosts(uploading)));
    }

    if entry.is_uploaded && entry.hosts_upload_failed().is_empty() {
        return ErrorKind::AlreadyUploaded(None);
    }

    ErrorKind::Ok
}

/// Internal-FTP-specific pre-check folded into `simulate_upload` by the
/// coordinator before calling it: "nothing to fetch" when the only
/// participant is the local host itself.
pub fn internal_ftp_is_superfluous(entry: &JobHistoryEntry, local_host: &ClientIdentity) -> bool {
    entry.client_statuses.len() == 1 && entry.client_statuses.contains_key(local_host)
}

pub fn can_upload(entry: &JobHistoryEntry, upload_protocol: UploadProtocol, upload_host: &str, local_host: &ClientIdentity) -> bool {
    if upload_protocol == UploadProtocol::InternalFtp && internal_ftp_is_superfluous(entry, local_host) {
        return false;
    }
    matches!(simulate_upload(entry, upload_protocol, upload_host), ErrorKind::Ok)
}

/// Can a comment be appended to `entry` right now? Spec §4.5
/// `simulate_add_comment`. `local_current_pid` is the *current* live pid
/// reported by the local connection (`None` if it is not alive); compared
/// against the pid the history store last recorded for the local host to
/// detect a respawned local recorder process.
pub fn simulate_add_comment(
    entry: &JobHistoryEntry,
    local_host: &ClientIdentity,
    local_current_pid: Option<u32>,
) -> ErrorKind {
    if entry.is_deleted {
        return ErrorKind::MeasIsDeleted(None);
    }

    if !entry.is_uploaded {
        return ErrorKind::Ok;
    }

    let uploading = entry.hosts_uploading();
    if !uploading.is_empty() {
        return ErrorKind::CurrentlyUploading(Some(join_hosts(uploading)));
    }

    let protocol = entry.upload_config_used.as_ref().map(|c| c.protocol());
    if protocol != Some(UploadProtocol::InternalFtp) {
        return ErrorKind::AlreadyUploaded(None);
    }

    let Some(status) = entry.client_statuses.get(local_host) else {
        return ErrorKind::AlreadyUploaded(Some(
            "the local host did not participate in this measurement".to_string(),
        ));
    };

    let pid_matches = local_current_pid == Some(status.client_pid);
    if pid_matches && status.job_status.state != JobState::NotStarted {
        ErrorKind::Ok
    } else {
        ErrorKind::AlreadyUploaded(Some(
            "Original local recorder instance is not reachable any more".to_string(),
        ))
    }
}

pub fn can_comment(entry: &JobHistoryEntry, local_host: &ClientIdentity, local_current_pid: Option<u32>) -> bool {
    matches!(simulate_add_comment(entry, local_host, local_current_pid), ErrorKind::Ok)
}

/// Can `entry` be deleted right now? Spec §4.5 `simulate_delete`.
pub fn simulate_delete(entry: &JobHistoryEntry) -> ErrorKind {
    if entry.is_deleted {
        return ErrorKind::MeasIsDeleted(None);
    }

    let recording = entry.hosts_recording();
    if !recording.is_empty() {
        return ErrorKind::CurrentlyRecording(Some(join_hosts(recording)));
    }

    let flushing = entry.hosts_flushing();
    if !flushing.is_empty() {
        return ErrorKind::CurrentlyFlushing(Some(join_hosts(flushing)));
    }

    let uploading = entry.hosts_uploading();
    if !uploading.is_empty() {
        return ErrorKind::CurrentlyUploading(Some(join_hosts(uploading)));
    }

    ErrorKind::Ok
}

pub fn can_delete(entry: &JobHistoryEntry) -> bool {
    matches!(simulate_delete(entry), ErrorKind::Ok)
}

/// Clients that still need an upload command dispatched to them (spec
/// §4.5 "Clients-that-need-to-upload"): the measurement isn't uploaded
/// yet, or it is but this particular client either never finished
/// flushing or has a failed upload and isn't deleted. In Internal-FTP
/// mode the local host is excluded — nothing to fetch from itself.
pub fn clients_needing_upload(
    entry: &JobHistoryEntry,
    upload_protocol: UploadProtocol,
    local_host: &ClientIdentity,
) -> BTreeSet<ClientIdentity> {
    let mut result = BTreeSet::new();

    for (host, status) in &entry.client_statuses {
        let never_finished_flushing = !matches!(
            status.job_status.state,
            JobState::FinishedFlushing | JobState::Uploading | JobState::FinishedUploading
        );
        let failed_and_not_deleted = status.job_status.state == JobState::FinishedUploading
            && !status.job_status.upload_status.ok
            && !status.job_status.is_deleted;

        let needs_upload = !entry.is_uploaded || never_finished_flushing || failed_and_not_deleted;
        if !needs_upload {
            continue;
        }

        if upload_protocol == UploadProtocol::InternalFtp && host == local_host {
            continue;
        }

        result.insert(host.clone());
    }

    result
}

/// The single client responsible for uploading a measurement's metadata
/// during a distributed upload: the local host if it participated,
/// otherwise the alphabetically smallest participating host (spec §4.4.4
/// step 3, GLOSSARY "Metadata uploader").
pub fn choose_metadata_uploader(entry: &JobHistoryEntry, local_host: &ClientIdentity) -> Option<ClientIdentity> {
    if entry.client_statuses.contains_key(local_host) {
        return Some(local_host.clone());
    }
    entry.client_statuses.keys().min().cloned()
}

#[cfg(test)]
#[path = "oracle_tests.rs"]
mod tests;
