// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-socket listener for the daemon↔CLI control channel, grounded on
//! the teacher's `crates/daemon/src/listener/mod.rs` shape: accept loop
//! spawning one task per connection, each connection handled with the
//! shared length-prefixed JSON framing (`rc-wire::framing`).

use std::collections::BTreeSet;
use std::sync::Arc;

use rc_core::{ClientConfig, ClientIdentity, SystemClock};
use rc_coordinator::Coordinator;
use rc_wire::control::{ClientConfigWire, JobHistorySummary, Query, Response, StatusSnapshot};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::env;

pub struct Listener {
    socket: UnixListener,
    coordinator: Arc<Coordinator<SystemClock>>,
    shutdown: Arc<Notify>,
}

impl Listener {
    pub fn new(socket: UnixListener, coordinator: Arc<Coordinator<SystemClock>>, shutdown: Arc<Notify>) -> Self {
        Self { socket, coordinator, shutdown }
    }

    /// Accept connections until a `Shutdown` query is handled or the
    /// shutdown notification fires (e.g. SIGTERM).
    pub async fn run(self) {
        loop {
            tokio::select! {
                _ = self.shutdown.notified() => {
                    info!("listener shutting down");
                    return;
                }
                accepted = self.socket.accept() => {
                    match accepted {
                        Ok((stream, _)) => {
                            let coordinator = self.coordinator.clone();
                            let shutdown = self.shutdown.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, coordinator, shutdown).await {
                                    warn!(error = %e, "control connection error");
                                }
                            });
                        }
                        Err(e) => error!(error = %e, "accept error"),
                    }
                }
            }
        }
    }
}

async fn handle_connection(
    mut stream: UnixStream,
    coordinator: Arc<Coordinator<SystemClock>>,
    shutdown: Arc<Notify>,
) -> Result<(), rc_wire::FramingError> {
    let query: Query = tokio::time::timeout(env::ipc_timeout(), rc_wire::read_frame(&mut stream))
        .await
        .map_err(|_| rc_wire::FramingError::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out")))??;

    debug!(?query, "received control query");
    let response = dispatch(&coordinator, query, &shutdown);
    rc_wire::write_frame(&mut stream, &response).await
}

fn dispatch(coordinator: &Coordinator<SystemClock>, query: Query, shutdown: &Notify) -> Response {
    match query {
        Query::EnableClients { clients } => {
            let map = clients
                .into_iter()
                .map(|(host, cfg)| (ClientIdentity::new(host), from_wire_client_config(cfg)))
                .collect();
            match coordinator.set_enabled_clients(map) {
                Ok(()) => Response::Ok,
                Err(e) => Response::from_error(&e),
            }
        }
        Query::ConnectRecordBus => {
            coordinator.connect_to_record_bus();
            Response::Ok
        }
        Query::DisconnectRecordBus => match coordinator.disconnect_from_record_bus() {
            Ok(()) => Response::Ok,
            Err(e) => Response::from_error(&e),
        },
        Query::StartRecording => match coordinator.start_recording() {
            Ok(job_id) => Response::JobStarted { job_id },
            Err(e) => Response::from_error(&e),
        },
        Query::SavePreBuffer => match coordinator.save_pre_buffer() {
            Ok(job_id) => Response::JobStarted { job_id },
            Err(e) => Response::from_error(&e),
        },
        Query::StopRecording => match coordinator.stop_recording() {
            Ok(()) => Response::JobStopped,
            Err(e) => Response::from_error(&e),
        },
        Query::UploadMeasurement { meas_id, upload_config } => {
            coordinator.set_upload_config(upload_config);
            match coordinator.upload_measurement(meas_id) {
                Ok(clients) => Response::UploadStarted {
                    job_id: meas_id,
                    clients: clients.iter().map(|c| c.host().to_string()).collect(),
                },
                Err(e) => Response::from_error(&e),
            }
        }
        Query::UploadNonUploaded => Response::UploadsAttempted { count: coordinator.upload_non_uploaded() },
        Query::AddComment { meas_id, text } => match coordinator.add_comment(meas_id, &text) {
            Ok(()) => Response::Ok,
            Err(e) => Response::from_error(&e),
        },
        Query::DeleteMeasurement { meas_id } => match coordinator.delete_measurement(meas_id) {
            Ok(()) => Response::Ok,
            Err(e) => Response::from_error(&e),
        },
        Query::SetJobConfigTemplate { template } => {
            coordinator.set_job_config_template(template);
            Response::Ok
        }
        Query::Status => Response::Status { snapshot: status_snapshot(coordinator) },
        Query::Shutdown => {
            shutdown.notify_waiters();
            Response::ShuttingDown
        }
    }
}

fn from_wire_client_config(cfg: ClientConfigWire) -> ClientConfig {
    ClientConfig {
        enabled_addons: cfg.enabled_addons.into_iter().collect::<BTreeSet<_>>(),
        host_filter: cfg.host_filter.into_iter().collect::<BTreeSet<_>>(),
    }
}

fn status_snapshot(coordinator: &Coordinator<SystemClock>) -> StatusSnapshot {
    let status = coordinator.status();
    StatusSnapshot {
        config_path: status.config_path.map(|p| p.display().to_string()),
        config_version: status.config_version,
        bound_to_record_bus: status.bound_to_record_bus,
        recording: status.recording,
        currently_recording_job_id: status.currently_recording_job_id,
        history: status
            .history
            .into_iter()
            .map(|h| JobHistorySummary {
                job_id: h.job_id,
                meas_name: h.meas_name,
                is_uploaded: h.is_uploaded,
                is_deleted: h.is_deleted,
                can_upload: h.can_upload,
                can_comment: h.can_comment,
                client_hosts: h.client_hosts,
            })
            .collect(),
    }
}
