// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subcommand definitions, one per control-channel `Query` variant,
//! grounded on the teacher's `crates/cli/src/commands/*.rs`
//! per-subcommand-module convention (collapsed into a single file here —
//! the operator surface is a dozen verbs, not the teacher's much larger
//! job/workspace/agent command tree).

use std::collections::BTreeMap;

use clap::{Args, Subcommand, ValueEnum};
use rc_core::UploadConfig;
use rc_wire::control::{ClientConfigWire, Query};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum UploadProtocolArg {
    Internal,
    External,
}

#[derive(Subcommand)]
pub enum Command {
    /// Set the enabled client set (replaces the previous set).
    EnableClients {
        /// `host[:addon1,addon2][@filter1,filter2]`, repeatable.
        #[arg(required = true)]
        clients: Vec<String>,
    },
    /// Bind all enabled clients onto the record bus.
    ConnectBus,
    /// Unbind all enabled clients from the record bus (rejected while recording).
    DisconnectBus,
    /// Start a new recording job.
    Start,
    /// Save the current pre-buffer as a new job.
    SavePreBuffer,
    /// Stop the currently running recording.
    Stop,
    /// Upload a measurement.
    Upload(UploadArgs),
    /// Attempt to upload every not-yet-uploaded measurement.
    UploadAll,
    /// Attach a comment to a measurement.
    Comment {
        meas_id: i64,
        text: String,
    },
    /// Mark a measurement for deletion.
    Delete {
        meas_id: i64,
    },
    /// Print the composite coordinator status snapshot.
    Status {
        /// Emit raw JSON instead of a formatted table.
        #[arg(long)]
        json: bool,
    },
    /// Ask the daemon to shut down.
    Shutdown,
}

#[derive(Args)]
pub struct UploadArgs {
    meas_id: i64,

    /// `internal` (in-process FTP sink) or `external` (remote FTP server).
    #[arg(long, value_enum)]
    protocol: UploadProtocolArg,

    #[arg(long, default_value = "")]
    host: String,

    #[arg(long, default_value_t = 21)]
    port: u16,

    #[arg(long, default_value = "")]
    root_path: String,

    #[arg(long)]
    delete_after_upload: bool,
}

impl Command {
    pub fn into_query(self) -> anyhow::Result<Query> {
        Ok(match self {
            Command::EnableClients { clients } => {
                let mut map = BTreeMap::new();
                for spec in clients {
                    let (host, cfg) = parse_client_spec(&spec)?;
                    map.insert(host, cfg);
                }
                Query::EnableClients { clients: map }
            }
            Command::ConnectBus => Query::ConnectRecordBus,
            Command::DisconnectBus => Query::DisconnectRecordBus,
            Command::Start => Query::StartRecording,
            Command::SavePreBuffer => Query::SavePreBuffer,
            Command::Stop => Query::StopRecording,
            Command::Upload(args) => {
                let mut upload_config = match args.protocol {
                    UploadProtocolArg::Internal => UploadConfig::internal_ftp(),
                    UploadProtocolArg::External => UploadConfig::external_ftp(args.host, args.port, args.root_path),
                };
                upload_config.delete_after_upload = args.delete_after_upload;
                Query::UploadMeasurement { meas_id: args.meas_id, upload_config }
            }
            Command::UploadAll => Query::UploadNonUploaded,
            Command::Comment { meas_id, text } => Query::AddComment { meas_id, text },
            Command::Delete { meas_id } => Query::DeleteMeasurement { meas_id },
            Command::Status { .. } => Query::Status,
            Command::Shutdown => Query::Shutdown,
        })
    }

    /// Whether `Status` was asked to print raw JSON; irrelevant for every
    /// other variant.
    pub fn wants_json(&self) -> bool {
        matches!(self, Command::Status { json: true })
    }
}

/// Parses `host[:addon1,addon2][@filter1,filter2]`.
fn parse_client_spec(spec: &str) -> anyhow::Result<(String, ClientConfigWire)> {
    let (host_and_addons, filter) = match spec.split_once('@') {
        Some((h, f)) => (h, Some(f)),
        None => (spec, None),
    };
    let (host, addons) = match host_and_addons.split_once(':') {
        Some((h, a)) => (h, Some(a)),
        None => (host_and_addons, None),
    };
    if host.is_empty() {
        anyhow::bail!("empty host in client spec {spec:?}");
    }
    let enabled_addons = addons.map(split_csv).unwrap_or_default();
    let host_filter = filter.map(split_csv).unwrap_or_default();
    Ok((host.to_string(), ClientConfigWire { enabled_addons, host_filter }))
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',').filter(|s| !s.is_empty()).map(str::to_string).collect()
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
