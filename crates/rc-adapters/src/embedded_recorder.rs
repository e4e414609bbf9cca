// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-process recorder a `LocalConnection` adapts over (spec §4.1,
//! "a thin in-process adapter over the embedded recorder"). Out of scope
//! per spec.md §1 — represented here as a trait plus an in-memory fake.

use rc_core::{RecorderCommand, RecorderSettings, RecorderStatus};

/// Synchronous, always-reachable local recorder. `LocalConnection` calls
/// these directly with no queue: "calls are synchronous... Local is always
/// alive when enabled" (spec §4.1).
pub trait EmbeddedRecorder: Send + Sync {
    fn set_enabled(&self, enabled: bool);

    /// Apply a settings diff. The adapter is responsible for caching the
    /// accumulated settings and re-applying them on re-enable; this method
    /// only needs to apply what it is given.
    fn set_settings(&self, settings: &RecorderSettings);

    fn set_command(&self, command: &RecorderCommand) -> (bool, String);

    fn get_state(&self) -> RecorderStatus;

    fn pid(&self) -> u32;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;

    struct FakeEmbeddedRecorderState {
        enabled: bool,
        settings: RecorderSettings,
        status: RecorderStatus,
        commands: Vec<RecorderCommand>,
        pid: u32,
        next_command_response: Option<(bool, String)>,
    }

    /// In-memory embedded recorder. Tests script `get_state`'s response and
    /// inspect `commands()`/`settings()` to assert what `LocalConnection`
    /// forwarded.
    pub struct FakeEmbeddedRecorder {
        inner: Mutex<FakeEmbeddedRecorderState>,
    }

    impl Default for FakeEmbeddedRecorder {
        fn default() -> Self {
            Self {
                inner: Mutex::new(FakeEmbeddedRecorderState {
                    enabled: false,
                    settings: RecorderSettings::new(),
                    status: RecorderStatus::new(4242, false),
                    commands: Vec::new(),
                    pid: 4242,
                    next_command_response: None,
                }),
            }
        }
    }

    impl FakeEmbeddedRecorder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_pid(pid: u32) -> Self {
            let recorder = Self::new();
            recorder.inner.lock().pid = pid;
            recorder.inner.lock().status.client_pid = pid;
            recorder
        }

        pub fn set_pid(&self, pid: u32) {
            let mut inner = self.inner.lock();
            inner.pid = pid;
            inner.status.client_pid = pid;
        }

        pub fn set_status(&self, status: RecorderStatus) {
            self.inner.lock().status = status;
        }

        pub fn script_command_response(&self, response: (bool, String)) {
            self.inner.lock().next_command_response = Some(response);
        }

        pub fn is_enabled(&self) -> bool {
            self.inner.lock().enabled
        }

        pub fn settings(&self) -> RecorderSettings {
            self.inner.lock().settings.clone()
        }

        pub fn commands(&self) -> Vec<RecorderCommand> {
            self.inner.lock().commands.clone()
        }
    }

    impl EmbeddedRecorder for FakeEmbeddedRecorder {
        fn set_enabled(&self, enabled: bool) {
            self.inner.lock().enabled = enabled;
        }

        fn set_settings(&self, settings: &RecorderSettings) {
            self.inner.lock().settings.add_settings(settings);
        }

        fn set_command(&self, command: &RecorderCommand) -> (bool, String) {
            let mut inner = self.inner.lock();
            inner.commands.push(command.clone());
            inner.next_command_response.take().unwrap_or((true, String::new()))
        }

        fn get_state(&self) -> RecorderStatus {
            self.inner.lock().status.clone()
        }

        fn pid(&self) -> u32 {
            self.inner.lock().pid
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeEmbeddedRecorder;

#[cfg(test)]
#[path = "embedded_recorder_tests.rs"]
mod tests;
