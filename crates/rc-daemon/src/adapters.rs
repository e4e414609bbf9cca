// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wiring for the pub/sub-facing collaborators spec.md §1/§6 treats as
//! external: discovery, the recorder-client RPC transport, the embedded
//! recorder, the FTP user manager, the template evaluator, and the
//! monitoring snapshot source. None of these has a real implementation in
//! this workspace — the pub/sub middleware, the FTP server, and the
//! embedded recorder are separate processes this spec explicitly does not
//! cover. This binary runs them as the in-memory `Fake*` adapters
//! `rc-adapters` already exposes for tests, which makes `rcd` a
//! fully-functional *local* coordinator (the built-in recorder works, and
//! any host reported through `FakeMonitoringSource`/`FakeDiscovery` can be
//! driven), but with no real fleet connectivity until those adapters are
//! swapped for production ones.

use std::sync::Arc;

use rc_adapters::{
    Discovery, EmbeddedRecorder, FakeDiscovery, FakeEmbeddedRecorder, FakeFtpUserManager,
    FakeMonitoringSource, FakeRpcTransport, FakeTemplateEvaluator, FtpUserManager, MonitoringSource,
    RpcTransport, TemplateEvaluator,
};

pub struct Adapters {
    pub discovery: Arc<dyn Discovery>,
    pub transport: Arc<dyn RpcTransport>,
    pub embedded_recorder: Arc<dyn EmbeddedRecorder>,
    pub ftp_user_manager: Arc<dyn FtpUserManager>,
    pub template_evaluator: Arc<dyn TemplateEvaluator>,
    pub monitoring_source: Arc<dyn MonitoringSource>,
}

impl Adapters {
    pub fn demo() -> Self {
        Self {
            discovery: Arc::new(FakeDiscovery::new()),
            transport: Arc::new(FakeRpcTransport::new()),
            embedded_recorder: Arc::new(FakeEmbeddedRecorder::new()),
            ftp_user_manager: Arc::new(FakeFtpUserManager::new()),
            template_evaluator: Arc::new(FakeTemplateEvaluator::new()),
            monitoring_source: Arc::new(FakeMonitoringSource::new()),
        }
    }
}
