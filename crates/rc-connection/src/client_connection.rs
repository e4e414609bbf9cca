// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The common contract shared by `LocalConnection` and `RemoteConnection`
//! (spec §4.1), grounded on
//! `original_source/.../recorder/abstract_recorder.h`.

use std::sync::Arc;

use rc_core::{ClientIdentity, ConnectionSnapshot, RecorderCommand, RecorderSettings};

/// Invoked by a connection whenever it obtains a fresh status report from
/// its peer (GetState poll, local synchronous call). Feeds the Job-History
/// Store's `update_from_client_status` (spec §4.3).
pub type StatusCallback = Arc<dyn Fn(&ClientIdentity, &rc_core::RecorderStatus) + Send + Sync>;

/// Invoked once per job-bearing command dispatch with the command's
/// response. Feeds the Job-History Store's `update_from_command_response`.
pub type StatusResponseCallback = Arc<dyn Fn(i64, &ClientIdentity, (bool, String)) + Send + Sync>;

/// A recording client's connection: either the in-process `LocalConnection`
/// or a `RemoteConnection` bound to a peer recorder-service over RPC. The
/// coordinator holds these as `Arc<dyn ClientConnection>` in its connection
/// map, so it never needs to know which variant it is talking to.
pub trait ClientConnection: Send + Sync {
    fn hostname(&self) -> &ClientIdentity;

    /// Enable or disable this connection, optionally also requesting it
    /// join the record bus. See the variant-specific enable/disable
    /// semantics documented on `LocalConnection`/`RemoteConnection`.
    fn set_enabled(&self, on: bool, connect_to_record_bus: bool);

    fn is_enabled(&self) -> bool;

    /// Merge a settings diff into the accumulated complete settings and, if
    /// connected, forward it to the peer.
    fn set_settings(&self, diff: &RecorderSettings);

    /// Dispatch a command. Upload/AddComment/DeleteMeasurement bypass the
    /// enabled gate (spec §4.1.b): those are always dispatched.
    fn set_command(&self, cmd: &RecorderCommand);

    fn is_alive(&self) -> bool;

    fn is_request_pending(&self) -> bool;

    /// Block the calling thread until the action queue has drained (no-op
    /// for `LocalConnection`, which has no queue).
    fn wait_for_pending_requests(&self);

    /// A read-only snapshot of the connection's observable state (spec
    /// §4.1's `get_status`, plus the fields a coordinator needs for
    /// autorecovery planning and pruning decisions).
    fn snapshot(&self) -> ConnectionSnapshot;

    fn get_last_response(&self) -> (bool, String);

    fn ever_participated_in_measurement(&self) -> bool;

    /// Stop any background work (worker thread for `RemoteConnection`;
    /// no-op for `LocalConnection`). Called when a connection is pruned.
    fn shutdown(&self);
}
