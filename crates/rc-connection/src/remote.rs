// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RemoteConnection`: a worker-thread adapter over a recorder-client
//! reached through RPC (spec §4.1.b), grounded on
//! `original_source/.../recorder/remote_recorder.cpp`. Every public method
//! only mutates queued state and wakes the worker; all RPC traffic happens
//! on the worker thread so the coordinator never blocks on the network.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use rc_adapters::{Discovery, RpcTransport, ServiceInstanceId};
use rc_core::{
    Clock, ClientIdentity, ConnectionSnapshot, JobState, RecorderCommand, RecorderSettings,
    RecorderStatus,
};
use rc_wire::rpc::{SetCommandRequest, SetConfigRequest};

use crate::client_connection::{ClientConnection, StatusCallback, StatusResponseCallback};

/// How long a settled worker waits before its next unsolicited ping, and
/// the retry backoff while unbound. `remote_recorder.cpp` uses the same
/// 200ms for both.
const PING_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
enum ActionPayload {
    Ping,
    Settings(RecorderSettings),
    Command(RecorderCommand),
}

#[derive(Debug, Clone)]
struct Action {
    payload: ActionPayload,
    /// Set on actions synthesized by `queue_autorecovery_locked`, which are
    /// the only actions purged when the plan is recomputed.
    is_autorecovery: bool,
}

impl Action {
    fn ping() -> Self {
        Self { payload: ActionPayload::Ping, is_autorecovery: false }
    }

    fn is_ping(&self) -> bool {
        matches!(self.payload, ActionPayload::Ping)
    }

    fn is_settings(&self) -> bool {
        matches!(self.payload, ActionPayload::Settings(_))
    }
}

struct RemoteState {
    bound_instance: Option<ServiceInstanceId>,
    actions: VecDeque<Action>,
    currently_executing: bool,
    enabled: bool,
    complete_settings: RecorderSettings,
    should_be_connected_to_ecal: bool,
    ever_participated: bool,
    last_response: (bool, String),
    last_status: RecorderStatus,
    last_status_timestamp_epoch_ms: u64,
    next_ping_deadline: std::time::Instant,
    interrupted: bool,
}

struct Inner<C: Clock> {
    hostname: ClientIdentity,
    discovery: Arc<dyn Discovery>,
    transport: Arc<dyn RpcTransport>,
    status_callback: StatusCallback,
    response_callback: StatusResponseCallback,
    clock: C,
    state: Mutex<RemoteState>,
    cv: Condvar,
}

/// A connection bound to a client recorder-service reached over RPC. Owns a
/// background worker thread that binds to a discovered instance, then
/// drains a FIFO action queue against it, re-binding and replaying
/// autorecovery actions whenever the bound instance goes away (spec
/// §4.1.b).
pub struct RemoteConnection<C: Clock> {
    inner: Arc<Inner<C>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Clock + 'static> RemoteConnection<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        hostname: ClientIdentity,
        discovery: Arc<dyn Discovery>,
        transport: Arc<dyn RpcTransport>,
        status_callback: StatusCallback,
        response_callback: StatusResponseCallback,
        initial_settings: RecorderSettings,
        initially_connected_to_ecal: bool,
        clock: C,
    ) -> Self {
        let inner = Arc::new(Inner {
            hostname,
            discovery,
            transport,
            status_callback,
            response_callback,
            state: Mutex::new(RemoteState {
                bound_instance: None,
                actions: VecDeque::new(),
                currently_executing: false,
                enabled: false,
                complete_settings: initial_settings,
                should_be_connected_to_ecal: initially_connected_to_ecal,
                ever_participated: false,
                last_response: (true, String::new()),
                last_status: RecorderStatus::default(),
                last_status_timestamp_epoch_ms: clock.epoch_ms(),
                next_ping_deadline: clock.now(),
                interrupted: false,
            }),
            cv: Condvar::new(),
            clock,
        });

        let worker = {
            let inner = inner.clone();
            std::thread::spawn(move || inner.run())
        };

        Self { inner, worker: Mutex::new(Some(worker)) }
    }

    /// Run exactly one non-blocking iteration of the worker state machine:
    /// bind if unbound, otherwise execute one queued action or a ping if
    /// the queue is empty and the ping deadline has elapsed. Never used by
    /// the real background thread (which blocks between iterations); only
    /// by tests, which drive a connection deterministically without
    /// starting the thread. See `new_unstarted`.
    pub fn step(&self) {
        self.inner.step();
    }

    /// Build a connection identical to `new` but without spawning the
    /// background worker thread, so tests can call `step()` to advance it
    /// deterministically under a `FakeClock`.
    #[cfg(any(test, feature = "test-support"))]
    #[allow(clippy::too_many_arguments)]
    pub fn new_unstarted(
        hostname: ClientIdentity,
        discovery: Arc<dyn Discovery>,
        transport: Arc<dyn RpcTransport>,
        status_callback: StatusCallback,
        response_callback: StatusResponseCallback,
        initial_settings: RecorderSettings,
        initially_connected_to_ecal: bool,
        clock: C,
    ) -> Self {
        let inner = Arc::new(Inner {
            hostname,
            discovery,
            transport,
            status_callback,
            response_callback,
            state: Mutex::new(RemoteState {
                bound_instance: None,
                actions: VecDeque::new(),
                currently_executing: false,
                enabled: false,
                complete_settings: initial_settings,
                should_be_connected_to_ecal: initially_connected_to_ecal,
                ever_participated: false,
                last_response: (true, String::new()),
                last_status: RecorderStatus::default(),
                last_status_timestamp_epoch_ms: clock.epoch_ms(),
                next_ping_deadline: clock.now(),
                interrupted: false,
            }),
            cv: Condvar::new(),
            clock,
        });

        Self { inner, worker: Mutex::new(None) }
    }
}

impl<C: Clock> Inner<C> {
    /// Background worker loop (spec §4.1.b step 5). Blocks in small
    /// real-time slices rather than on the injected `Clock`, since the
    /// worker thread's own scheduling is not something a test should need
    /// to control; `step()` exists precisely so tests can bypass this loop
    /// entirely.
    fn run(&self) {
        loop {
            if self.state.lock().interrupted {
                return;
            }

            if self.state.lock().bound_instance.is_none() {
                self.try_bind();
                if self.state.lock().bound_instance.is_none() {
                    self.sleep_or_interrupt(Duration::from_millis(200));
                    continue;
                }
            }

            if !self.has_work_now() {
                self.sleep_or_interrupt(Duration::from_millis(20));
                continue;
            }

            self.step();
        }
    }

    fn has_work_now(&self) -> bool {
        let state = self.state.lock();
        let has_non_ping = state.actions.front().map(|a| !a.is_ping()).unwrap_or(false);
        has_non_ping || self.clock.now() >= state.next_ping_deadline
    }

    fn sleep_or_interrupt(&self, timeout: Duration) {
        let mut state = self.state.lock();
        if state.interrupted {
            return;
        }
        self.cv.wait_for(&mut state, timeout);
    }

    /// One iteration of the state machine: bind if unbound, else dequeue
    /// and execute exactly one action.
    fn step(&self) {
        if self.state.lock().bound_instance.is_none() {
            self.try_bind();
            return;
        }

        let action = {
            let mut state = self.state.lock();
            let has_non_ping = state.actions.front().map(|a| !a.is_ping()).unwrap_or(false);
            let deadline_elapsed = self.clock.now() >= state.next_ping_deadline;
            if !has_non_ping && !deadline_elapsed {
                return;
            }
            let action = state.actions.pop_front().unwrap_or_else(Action::ping);
            state.currently_executing = !action.is_ping();
            self.cv.notify_all();
            action
        };

        self.execute(&action);

        let mut state = self.state.lock();
        state.currently_executing = false;
        state.next_ping_deadline = self.clock.now() + PING_INTERVAL;
        self.cv.notify_all();
    }

    /// Scan the discovery registry for this host and bind to the first
    /// instance that answers a `GetState` probe (spec §4.1.b step 1).
    fn try_bind(&self) {
        let candidates = self.discovery.candidate_instances(self.hostname.host());
        for instance in candidates {
            if let Ok(response) = self.transport.get_state(&instance) {
                let status = response.to_status().unwrap_or_default();
                let mut state = self.state.lock();
                state.bound_instance = Some(instance);
                state.last_status = status.clone();
                state.last_status_timestamp_epoch_ms = self.clock.epoch_ms();
                let enabled = state.enabled;
                if enabled {
                    self.queue_autorecovery_locked(&mut state);
                }
                drop(state);
                (self.status_callback)(&self.hostname, &status);
                return;
            }
        }
    }

    fn execute(&self, action: &Action) {
        match &action.payload {
            ActionPayload::Ping => self.execute_ping(),
            ActionPayload::Settings(diff) => self.execute_settings(diff),
            ActionPayload::Command(cmd) => self.execute_command(cmd),
        }
    }

    fn bound(&self) -> Option<ServiceInstanceId> {
        self.state.lock().bound_instance.clone()
    }

    /// Unbind and forget the connected instance, mirroring
    /// `CallRecorderService`'s behaviour on any RPC failure: the next loop
    /// iteration rebinds from scratch and replays autorecovery.
    fn unbind(&self) {
        let mut state = self.state.lock();
        state.bound_instance = None;
        state.last_response = (false, "unable to contact recorder".to_string());
        self.cv.notify_all();
    }

    fn execute_ping(&self) {
        let Some(instance) = self.bound() else { return };
        match self.transport.get_state(&instance) {
            Ok(response) => {
                let status = response.to_status().unwrap_or_default();
                let mut state = self.state.lock();
                state.last_status = status.clone();
                state.last_status_timestamp_epoch_ms = self.clock.epoch_ms();
                drop(state);
                (self.status_callback)(&self.hostname, &status);
            }
            Err(_) => self.unbind(),
        }
    }

    fn execute_settings(&self, diff: &RecorderSettings) {
        let Some(instance) = self.bound() else { return };
        let request = SetConfigRequest::from_settings(diff);
        match self.transport.set_config(&instance, &request) {
            Ok(response) => {
                let mut state = self.state.lock();
                state.last_response = (response.is_success(), response.error.clone());
            }
            Err(_) => self.unbind(),
        }
    }

    fn execute_command(&self, cmd: &RecorderCommand) {
        let Some(instance) = self.bound() else { return };
        let request = SetCommandRequest::from_command(cmd);
        let meas_id = cmd.meas_id();
        match self.transport.set_command(&instance, &request) {
            Ok(response) => {
                let ok = response.is_success();
                let msg = response.error.clone();
                {
                    let mut state = self.state.lock();
                    state.last_response = (ok, msg.clone());
                }
                if let Some(job_id) = meas_id {
                    (self.response_callback)(job_id, &self.hostname, (ok, msg));
                }
            }
            Err(_) => self.unbind(),
        }
    }

    /// Recompute the pending autorecovery plan (spec §4.1.b step 6),
    /// grounded on
    /// `QueueAutoRecoveryCommandsBasedOnLastStatus_NoLock`: purge any
    /// previously queued autorecovery actions, then insert in the exact
    /// order the original does (each insertion goes to the front, so the
    /// *last* insertion below ends up executed *first*):
    /// `Initialize` if due, then `Settings`, then `DeInitialize`/`StopRecording`.
    fn queue_autorecovery_locked(&self, state: &mut RemoteState) {
        state.actions.retain(|a| !a.is_autorecovery);

        if state.should_be_connected_to_ecal && !state.last_status.initialized {
            state.actions.push_front(Action {
                payload: ActionPayload::Command(RecorderCommand::Initialize),
                is_autorecovery: true,
            });
        }

        let complete_settings = state.complete_settings.clone();
        match state.actions.front_mut() {
            Some(Action { payload: ActionPayload::Settings(s), .. }) => {
                s.add_settings(&complete_settings);
            }
            _ => {
                state.actions.push_front(Action {
                    payload: ActionPayload::Settings(complete_settings),
                    is_autorecovery: true,
                });
            }
        }

        if !state.should_be_connected_to_ecal && state.last_status.initialized {
            state.actions.push_front(Action {
                payload: ActionPayload::Command(RecorderCommand::DeInitialize),
                is_autorecovery: true,
            });
        } else if state.last_status.job_statuses.iter().any(|j| j.state == JobState::Recording) {
            state.actions.push_front(Action {
                payload: ActionPayload::Command(RecorderCommand::StopRecording),
                is_autorecovery: true,
            });
        }
    }

    fn queue_settings_locked(state: &mut RemoteState, diff: RecorderSettings) {
        if let Some(Action { payload: ActionPayload::Settings(s), is_autorecovery, .. }) =
            state.actions.back_mut()
        {
            s.add_settings(&diff);
            *is_autorecovery = false;
        } else {
            state.actions.push_back(Action { payload: ActionPayload::Settings(diff), is_autorecovery: false });
        }
    }
}

impl<C: Clock> ClientConnection for RemoteConnection<C> {
    fn hostname(&self) -> &ClientIdentity {
        &self.inner.hostname
    }

    fn set_enabled(&self, on: bool, connect_to_record_bus: bool) {
        let mut state = self.inner.state.lock();

        if !state.enabled && on {
            state.enabled = true;
            if state.bound_instance.is_some() {
                state.actions.push_front(Action::ping());
            }
            if connect_to_record_bus {
                state.should_be_connected_to_ecal = true;
                if state.bound_instance.is_some() {
                    state.actions.push_back(Action {
                        payload: ActionPayload::Command(RecorderCommand::Initialize),
                        is_autorecovery: false,
                    });
                }
            }
        } else if state.enabled && !on {
            state.enabled = false;
            state.actions.clear();
            if state.should_be_connected_to_ecal && state.bound_instance.is_some() {
                state.actions.push_back(Action {
                    payload: ActionPayload::Command(RecorderCommand::DeInitialize),
                    is_autorecovery: false,
                });
            }
            state.should_be_connected_to_ecal = false;
        }

        self.inner.cv.notify_all();
    }

    fn is_enabled(&self) -> bool {
        self.inner.state.lock().enabled
    }

    fn set_settings(&self, diff: &RecorderSettings) {
        let mut state = self.inner.state.lock();
        state.complete_settings.add_settings(diff);

        if state.enabled && state.bound_instance.is_some() {
            Inner::<C>::queue_settings_locked(&mut state, diff.clone());
            self.inner.cv.notify_all();
        }
    }

    fn set_command(&self, cmd: &RecorderCommand) {
        let bypasses_enabled_gate = matches!(
            cmd,
            RecorderCommand::UploadMeasurement { .. }
                | RecorderCommand::AddComment { .. }
                | RecorderCommand::DeleteMeasurement { .. }
        );

        let mut state = self.inner.state.lock();
        if !state.enabled && !bypasses_enabled_gate {
            return;
        }

        match cmd {
            RecorderCommand::Initialize | RecorderCommand::StartRecording(_) => {
                state.should_be_connected_to_ecal = true;
            }
            RecorderCommand::DeInitialize => {
                state.should_be_connected_to_ecal = false;
            }
            _ => {}
        }
        if matches!(cmd, RecorderCommand::SavePreBuffer(_) | RecorderCommand::StartRecording(_)) {
            state.ever_participated = true;
        }

        state.actions.push_back(Action { payload: ActionPayload::Command(cmd.clone()), is_autorecovery: false });
        self.inner.cv.notify_all();
    }

    fn is_alive(&self) -> bool {
        self.inner.state.lock().bound_instance.is_some()
    }

    fn is_request_pending(&self) -> bool {
        let state = self.inner.state.lock();
        !state.actions.is_empty() || state.currently_executing
    }

    fn wait_for_pending_requests(&self) {
        let mut state = self.inner.state.lock();
        while !state.interrupted && (!state.actions.is_empty() || state.currently_executing) {
            self.inner.cv.wait_for(&mut state, Duration::from_millis(20));
        }
    }

    fn snapshot(&self) -> ConnectionSnapshot {
        let state = self.inner.state.lock();
        let mut snapshot = ConnectionSnapshot::new(self.inner.hostname.clone());
        snapshot.client_pid = state.last_status.client_pid;
        snapshot.complete_settings = state.complete_settings.clone();
        snapshot.should_be_connected_to_ecal = state.should_be_connected_to_ecal;
        snapshot.enabled = state.enabled;
        snapshot.last_status_initialized = state.last_status.initialized;
        snapshot.last_status = state.last_status.job_statuses.clone();
        snapshot.last_status_timestamp_epoch_ms = state.last_status_timestamp_epoch_ms;
        snapshot.last_response_ok = state.last_response.0;
        snapshot.last_response_msg = state.last_response.1.clone();
        snapshot.ever_participated_in_measurement = state.ever_participated;
        snapshot
    }

    fn get_last_response(&self) -> (bool, String) {
        self.inner.state.lock().last_response.clone()
    }

    fn ever_participated_in_measurement(&self) -> bool {
        self.inner.state.lock().ever_participated
    }

    fn shutdown(&self) {
        {
            let mut state = self.inner.state.lock();
            state.interrupted = true;
            self.inner.cv.notify_all();
        }
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }
}

impl<C: Clock> Drop for RemoteConnection<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
