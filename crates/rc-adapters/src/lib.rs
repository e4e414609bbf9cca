// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rc-adapters: the pub/sub-facing collaborators the coordinator talks to
//! but does not own — discovery, the recorder-client RPC transport, the
//! in-process embedded recorder, the FTP user manager, and the template
//! evaluator. Each is a trait with an in-memory `Fake*` for tests; a real
//! implementation lives outside this workspace.

pub mod discovery;
pub mod embedded_recorder;
pub mod ftp_user_manager;
pub mod monitoring_source;
pub mod rpc_transport;
pub mod template_evaluator;

pub use discovery::{Discovery, ServiceInstanceId};
pub use embedded_recorder::EmbeddedRecorder;
pub use ftp_user_manager::{FtpError, FtpPermissions, FtpUserManager};
pub use monitoring_source::{MonitoringSnapshot, MonitoringSource, ProcessInfo, PublisherInfo, SubscriberInfo};
pub use rpc_transport::{RpcTransport, TransportError};
pub use template_evaluator::{TemplateContext, TemplateEvaluator};

#[cfg(any(test, feature = "test-support"))]
pub use discovery::FakeDiscovery;
#[cfg(any(test, feature = "test-support"))]
pub use embedded_recorder::FakeEmbeddedRecorder;
#[cfg(any(test, feature = "test-support"))]
pub use ftp_user_manager::FakeFtpUserManager;
#[cfg(any(test, feature = "test-support"))]
pub use monitoring_source::FakeMonitoringSource;
#[cfg(any(test, feature = "test-support"))]
pub use rpc_transport::FakeRpcTransport;
#[cfg(any(test, feature = "test-support"))]
pub use template_evaluator::FakeTemplateEvaluator;
