// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The recorder-client RPC transport a remote connection's worker thread
//! dispatches actions through. Out of scope per spec.md §1 (the pub/sub
//! request/response mechanism); represented here as a trait over
//! `rc-wire`'s DTOs plus an in-memory fake.

use crate::discovery::ServiceInstanceId;
use rc_wire::rpc::{GetStateResponse, SetCommandRequest, SetConfigRequest};
use thiserror::Error;

/// RPC-boundary failures never become an `ErrorKind` (spec §7): they are
/// absorbed at the connection boundary into `is_alive()`/`last_response`.
/// This type exists only to let `RpcTransport` implementations report which
/// of the two broad failure modes occurred.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request to {0} timed out")]
    Timeout(ServiceInstanceId),

    #[error("{0} is no longer registered")]
    PeerGone(ServiceInstanceId),

    #[error("transport failure: {0}")]
    Unreachable(String),
}

/// Synchronous RPC client to a single bound recorder-service instance.
/// Every method blocks the calling (worker) thread until a response arrives
/// or the transport's own timeout elapses.
pub trait RpcTransport: Send + Sync {
    fn get_state(&self, instance: &ServiceInstanceId) -> Result<GetStateResponse, TransportError>;

    fn set_config(
        &self,
        instance: &ServiceInstanceId,
        request: &SetConfigRequest,
    ) -> Result<rc_wire::rpc::GenericResponse, TransportError>;

    fn set_command(
        &self,
        instance: &ServiceInstanceId,
        request: &SetCommandRequest,
    ) -> Result<rc_wire::rpc::GenericResponse, TransportError>;

    /// Whether `instance` is still present in the discovery registry. Used
    /// to tell a genuine timeout (peer alive, slow) apart from a peer that
    /// has already vanished (spec §4.1.b step 5).
    fn instance_still_registered(&self, instance: &ServiceInstanceId) -> bool;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use rc_wire::rpc::GenericResponse;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    /// Recorded RPC call, for assertions on what a connection actually sent.
    #[derive(Debug, Clone)]
    pub enum RpcCall {
        GetState(ServiceInstanceId),
        SetConfig(ServiceInstanceId, SetConfigRequest),
        SetCommand(ServiceInstanceId, SetCommandRequest),
    }

    #[derive(Default)]
    struct FakeRpcTransportState {
        registered: BTreeMap<ServiceInstanceId, bool>,
        get_state_responses: BTreeMap<ServiceInstanceId, Result<GetStateResponse, TransportError>>,
        command_responses: BTreeMap<ServiceInstanceId, Result<GenericResponse, TransportError>>,
        calls: Vec<RpcCall>,
    }

    /// In-memory RPC transport, scriptable per instance. Responses default
    /// to `TransportError::Unreachable` until a test sets them, so an
    /// unconfigured instance behaves like one that never answers.
    #[derive(Clone, Default)]
    pub struct FakeRpcTransport {
        inner: Arc<Mutex<FakeRpcTransportState>>,
    }

    impl FakeRpcTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn mark_registered(&self, instance: ServiceInstanceId, registered: bool) {
            self.inner.lock().registered.insert(instance, registered);
        }

        pub fn set_get_state_response(
            &self,
            instance: ServiceInstanceId,
            response: Result<GetStateResponse, TransportError>,
        ) {
            self.inner.lock().get_state_responses.insert(instance, response);
        }

        pub fn set_command_response(
            &self,
            instance: ServiceInstanceId,
            response: Result<GenericResponse, TransportError>,
        ) {
            self.inner.lock().command_responses.insert(instance, response);
        }

        pub fn calls(&self) -> Vec<RpcCall> {
            self.inner.lock().calls.clone()
        }
    }

    impl RpcTransport for FakeRpcTransport {
        fn get_state(&self, instance: &ServiceInstanceId) -> Result<GetStateResponse, TransportError> {
            let mut inner = self.inner.lock();
            inner.calls.push(RpcCall::GetState(instance.clone()));
            inner
                .get_state_responses
                .get(instance)
                .cloned()
                .unwrap_or_else(|| Err(TransportError::Unreachable(instance.to_string())))
        }

        fn set_config(
            &self,
            instance: &ServiceInstanceId,
            request: &SetConfigRequest,
        ) -> Result<GenericResponse, TransportError> {
            let mut inner = self.inner.lock();
            inner.calls.push(RpcCall::SetConfig(instance.clone(), request.clone()));
            inner
                .command_responses
                .get(instance)
                .cloned()
                .unwrap_or_else(|| Ok(GenericResponse::success()))
        }

        fn set_command(
            &self,
            instance: &ServiceInstanceId,
            request: &SetCommandRequest,
        ) -> Result<GenericResponse, TransportError> {
            let mut inner = self.inner.lock();
            inner.calls.push(RpcCall::SetCommand(instance.clone(), request.clone()));
            inner
                .command_responses
                .get(instance)
                .cloned()
                .unwrap_or_else(|| Ok(GenericResponse::success()))
        }

        fn instance_still_registered(&self, instance: &ServiceInstanceId) -> bool {
            self.inner.lock().registered.get(instance).copied().unwrap_or(true)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRpcTransport, RpcCall};

#[cfg(test)]
#[path = "rpc_transport_tests.rs"]
mod tests;
