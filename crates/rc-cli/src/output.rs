// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Formats a control-channel `Response` for the terminal, grounded on the
//! teacher's `crates/cli/src/output.rs` "format_or_json" convention.

use rc_wire::control::Response;

pub fn print(response: &Response, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    match response {
        Response::Ok => println!("ok"),
        Response::ShuttingDown => println!("shutting down"),
        Response::JobStopped => println!("recording stopped"),
        Response::JobStarted { job_id } => println!("job started: {job_id}"),
        Response::UploadStarted { job_id, clients } => {
            println!("upload started for job {job_id}: {}", clients.join(", "))
        }
        Response::UploadsAttempted { count } => println!("upload attempted for {count} measurement(s)"),
        Response::Error { kind, message } => {
            print!("error: {kind}");
            if let Some(msg) = message {
                print!(" ({msg})");
            }
            println!();
        }
        Response::Status { snapshot } => print_status(snapshot),
    }
    Ok(())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

fn print_status(snapshot: &rc_wire::control::StatusSnapshot) {
    println!(
        "bound_to_record_bus={} recording={} currently_recording_job_id={}",
        snapshot.bound_to_record_bus,
        snapshot.recording,
        snapshot.currently_recording_job_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
    );
    if let Some(path) = &snapshot.config_path {
        println!("config: {path} (v{})", snapshot.config_version.unwrap_or(0));
    }
    if snapshot.history.is_empty() {
        println!("no measurements recorded yet");
        return;
    }
    println!("{:<10} {:<24} {:<10} {:<8} {:<10} {:<10}", "job_id", "meas_name", "uploaded", "deleted", "can_upload", "can_comment");
    for entry in &snapshot.history {
        println!(
            "{:<10} {:<24} {:<10} {:<8} {:<10} {:<10}",
            entry.job_id, entry.meas_name, entry.is_uploaded, entry.is_deleted, entry.can_upload, entry.can_comment,
        );
    }
}
