// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `LocalConnection`: a thin, synchronous in-process adapter over the
//! embedded recorder (spec §4.1.a), grounded on
//! `original_source/.../recorder/local_recorder.cpp`. No queue; every call
//! dispatches directly and returns once the embedded recorder has answered.

use std::sync::Arc;

use parking_lot::Mutex;
use rc_adapters::EmbeddedRecorder;
use rc_core::{Clock, ClientIdentity, ConnectionSnapshot, RecorderCommand, RecorderSettings};

use crate::client_connection::{ClientConnection, StatusCallback, StatusResponseCallback};

struct LocalState {
    enabled: bool,
    is_in_sync: bool,
    complete_settings: RecorderSettings,
    should_be_connected_to_record_bus: bool,
    last_response: (bool, String),
    ever_participated: bool,
}

pub struct LocalConnection<C: Clock> {
    hostname: ClientIdentity,
    embedded: Arc<dyn EmbeddedRecorder>,
    status_callback: StatusCallback,
    response_callback: StatusResponseCallback,
    clock: C,
    state: Mutex<LocalState>,
}

impl<C: Clock> LocalConnection<C> {
    pub fn new(
        hostname: ClientIdentity,
        embedded: Arc<dyn EmbeddedRecorder>,
        status_callback: StatusCallback,
        response_callback: StatusResponseCallback,
        initial_settings: RecorderSettings,
        initially_connected_to_record_bus: bool,
        clock: C,
    ) -> Self {
        Self {
            hostname,
            embedded,
            status_callback,
            response_callback,
            clock,
            state: Mutex::new(LocalState {
                enabled: false,
                is_in_sync: false,
                complete_settings: initial_settings,
                should_be_connected_to_record_bus: initially_connected_to_record_bus,
                last_response: (true, String::new()),
                ever_participated: false,
            }),
        }
    }

    /// Pull a fresh status report from the embedded recorder and invoke the
    /// status callback, as the real adapter does after every dispatch that
    /// could have changed the recorder's observable state.
    fn refresh_status(&self) {
        let status = self.embedded.get_state();
        (self.status_callback)(&self.hostname, &status);
    }
}

impl<C: Clock> ClientConnection for LocalConnection<C> {
    fn hostname(&self) -> &ClientIdentity {
        &self.hostname
    }

    fn set_enabled(&self, on: bool, connect_to_record_bus: bool) {
        let mut state = self.state.lock();

        if !state.enabled && on {
            state.enabled = true;
            state.should_be_connected_to_record_bus = connect_to_record_bus;

            self.embedded.set_settings(&state.complete_settings);
            self.embedded.set_enabled(connect_to_record_bus);

            state.is_in_sync = true;
            state.last_response = (true, String::new());
            tracing::debug!(host = %self.hostname, connect_to_record_bus, "local connection enabled");
        } else if state.enabled && !on {
            state.enabled = false;
            state.is_in_sync = false;
            tracing::debug!(host = %self.hostname, "local connection disabled");
        }

        drop(state);
        self.refresh_status();
    }

    fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    fn set_settings(&self, diff: &RecorderSettings) {
        let mut state = self.state.lock();
        state.complete_settings.add_settings(diff);

        if !state.enabled {
            return;
        }

        let settings_to_apply =
            if state.is_in_sync { diff.clone() } else { state.complete_settings.clone() };
        self.embedded.set_settings(&settings_to_apply);
        state.is_in_sync = true;
        state.last_response = (true, String::new());
    }

    fn set_command(&self, cmd: &RecorderCommand) {
        let bypasses_enabled_gate = matches!(
            cmd,
            RecorderCommand::UploadMeasurement { .. }
                | RecorderCommand::AddComment { .. }
                | RecorderCommand::DeleteMeasurement { .. }
        );

        let mut state = self.state.lock();
        if !state.enabled && !bypasses_enabled_gate {
            return;
        }

        match cmd {
            RecorderCommand::Initialize | RecorderCommand::StartRecording(_) => {
                state.should_be_connected_to_record_bus = true;
            }
            RecorderCommand::DeInitialize => {
                state.should_be_connected_to_record_bus = false;
            }
            _ => {}
        }

        if matches!(cmd, RecorderCommand::SavePreBuffer(_) | RecorderCommand::StartRecording(_)) {
            state.ever_participated = true;
        }

        let (ok, msg) = self.embedded.set_command(cmd);
        state.last_response = (ok, msg.clone());
        let meas_id = cmd.meas_id();
        drop(state);

        if let Some(job_id) = meas_id {
            (self.response_callback)(job_id, &self.hostname, (ok, msg));
        }

        self.refresh_status();
    }

    fn is_alive(&self) -> bool {
        self.state.lock().enabled
    }

    fn is_request_pending(&self) -> bool {
        false
    }

    fn wait_for_pending_requests(&self) {}

    fn snapshot(&self) -> ConnectionSnapshot {
        let state = self.state.lock();
        let status = self.embedded.get_state();

        let mut snapshot = ConnectionSnapshot::new(self.hostname.clone());
        snapshot.client_pid = status.client_pid;
        snapshot.complete_settings = state.complete_settings.clone();
        snapshot.should_be_connected_to_ecal = state.should_be_connected_to_record_bus;
        snapshot.enabled = state.enabled;
        snapshot.last_status_initialized = status.initialized;
        snapshot.last_status = status.job_statuses;
        snapshot.last_status_timestamp_epoch_ms = self.clock.epoch_ms();
        snapshot.last_response_ok = state.last_response.0;
        snapshot.last_response_msg = state.last_response.1.clone();
        snapshot.ever_participated_in_measurement = state.ever_participated;
        snapshot
    }

    fn get_last_response(&self) -> (bool, String) {
        self.state.lock().last_response.clone()
    }

    fn ever_participated_in_measurement(&self) -> bool {
        self.state.lock().ever_participated
    }

    fn shutdown(&self) {
        self.set_enabled(false, false);
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
