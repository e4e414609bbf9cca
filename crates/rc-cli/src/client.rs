// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin client over the control-IPC channel, grounded on the teacher's
//! `crates/cli/src/client_queries.rs` "one method per query" shape, minus
//! the Hello handshake (no versioning concerns at this scale).

use std::path::PathBuf;
use std::time::Duration;

use rc_wire::control::{Query, Response};
use tokio::net::UnixStream;

const TIMEOUT: Duration = Duration::from_secs(10);

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    pub async fn send(&self, query: Query) -> anyhow::Result<Response> {
        let mut stream = tokio::time::timeout(TIMEOUT, UnixStream::connect(&self.socket_path))
            .await
            .map_err(|_| anyhow::anyhow!("timed out connecting to {}", self.socket_path.display()))?
            .map_err(|e| anyhow::anyhow!("cannot connect to {}: {e} (is rcd running?)", self.socket_path.display()))?;

        rc_wire::write_frame(&mut stream, &query).await?;
        let response: Response = tokio::time::timeout(TIMEOUT, rc_wire::read_frame(&mut stream))
            .await
            .map_err(|_| anyhow::anyhow!("timed out waiting for a response"))??;
        Ok(response)
    }
}
