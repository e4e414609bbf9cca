// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rc_wire::rpc::{GenericResponse, GetStateResponse};

#[test]
fn unconfigured_instance_is_unreachable() {
    let transport = FakeRpcTransport::new();
    let instance = ServiceInstanceId::new("a");

    let err = transport.get_state(&instance).unwrap_err();
    assert!(matches!(err, TransportError::Unreachable(_)));
}

#[test]
fn configured_get_state_response_is_returned() {
    let transport = FakeRpcTransport::new();
    let instance = ServiceInstanceId::new("a");
    transport.set_get_state_response(
        instance.clone(),
        Ok(GetStateResponse { serialized_status: "idle".to_string() }),
    );

    let response = transport.get_state(&instance).unwrap();
    assert_eq!(response.serialized_status, "idle");
}

#[test]
fn set_command_defaults_to_success_and_records_the_call() {
    let transport = FakeRpcTransport::new();
    let instance = ServiceInstanceId::new("a");
    let request = SetCommandRequest { command: rc_wire::rpc::SetCommandKind::Initialize, params: Default::default() };

    let response = transport.set_command(&instance, &request).unwrap();
    assert!(response.is_success());
    assert_eq!(transport.calls().len(), 1);
}

#[test]
fn scripted_failure_is_returned_on_set_command() {
    let transport = FakeRpcTransport::new();
    let instance = ServiceInstanceId::new("a");
    transport.set_command_response(instance.clone(), Ok(GenericResponse::failed("disk full")));

    let request = SetCommandRequest { command: rc_wire::rpc::SetCommandKind::StartRecording, params: Default::default() };
    let response = transport.set_command(&instance, &request).unwrap();
    assert!(!response.is_success());
    assert_eq!(response.error, "disk full");
}

#[test]
fn instance_still_registered_defaults_to_true() {
    let transport = FakeRpcTransport::new();
    let instance = ServiceInstanceId::new("a");
    assert!(transport.instance_still_registered(&instance));

    transport.mark_registered(instance.clone(), false);
    assert!(!transport.instance_still_registered(&instance));
}
