// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State-directory/socket-path resolution, kept in lockstep with
//! `rc-daemon::env` (`RC_STATE_DIR` > `XDG_STATE_HOME/rc` >
//! `~/.local/state/rc`) so `rc` finds the socket `rcd` bound without
//! either binary depending on the other.

use std::path::PathBuf;

pub fn socket_path(override_path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path);
    }
    let state_dir = if let Ok(dir) = std::env::var("RC_STATE_DIR") {
        PathBuf::from(dir)
    } else if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        PathBuf::from(xdg).join("rc")
    } else {
        let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot resolve $HOME"))?;
        home.join(".local/state/rc")
    };
    Ok(state_dir.join("rc.sock"))
}
