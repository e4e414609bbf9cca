// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access, grounded on the teacher's
//! `crates/daemon/src/env.rs` (`RC_*` in place of `OJ_*`).

use std::path::PathBuf;
use std::time::Duration;

/// Resolve the state directory: `RC_STATE_DIR` > `XDG_STATE_HOME/rc` >
/// `~/.local/state/rc`.
pub fn state_dir() -> anyhow::Result<PathBuf> {
    if let Ok(dir) = std::env::var("RC_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("rc"));
    }
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot resolve $HOME"))?;
    Ok(home.join(".local/state/rc"))
}

pub fn socket_path(state_dir: &std::path::Path) -> PathBuf {
    state_dir.join("rc.sock")
}

pub fn lock_path(state_dir: &std::path::Path) -> PathBuf {
    state_dir.join("rc.lock")
}

/// Control-channel read/write timeout.
pub fn ipc_timeout() -> Duration {
    std::env::var("RC_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}
