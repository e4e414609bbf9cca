// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pub/sub middleware's periodic monitoring snapshot (spec §2 C2, §6:
//! "periodic monitoring snapshots (processes, publishers, subscribers with
//! host/pid/unit-name/frequency)"). Out of scope per spec.md §1;
//! represented here as a trait plus an in-memory fake.

use rc_core::topic::HostPid;

/// One running process as seen by the middleware, enough to tell whether
/// it is a recorder-client instance (spec §4.2 step 2: "A host appears in
/// `hosts_running_client` iff any process on it matches the recorder-client
/// unit name").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub host: String,
    pub pid: u32,
    pub unit_name: String,
}

/// One publisher of a topic (spec §4.2 step 3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherInfo {
    pub topic: String,
    pub type_info: String,
    pub host: String,
    pub process_name: String,
}

/// One subscriber of a topic, with its reported data frequency in
/// milli-hertz (spec §4.2 step 3: "divided by 1000 to convert
/// milli-Hz→Hz").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberInfo {
    pub topic: String,
    pub host: String,
    pub pid: u32,
    pub unit_name: String,
    pub frequency_milli_hz: u64,
}

/// The full periodic snapshot the monitor thread reads each tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitoringSnapshot {
    pub processes: Vec<ProcessInfo>,
    pub publishers: Vec<PublisherInfo>,
    pub subscribers: Vec<SubscriberInfo>,
}

/// Read-only access to the middleware's monitoring snapshot. Every call
/// returns an owned, independent copy; the monitor thread never holds a
/// reference into the middleware's own state (spec §4.2 step 1).
pub trait MonitoringSource: Send + Sync {
    fn snapshot(&self) -> MonitoringSnapshot;
}

/// Helper constructor, reused by `MonitoringLoop`'s subscriber filter and
/// tests alike.
pub fn host_pid(host: impl Into<String>, pid: u32) -> HostPid {
    HostPid { host: host.into(), pid }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// In-memory monitoring source. Tests script the next snapshot and
    /// assert the monitor loop rebuilt its maps from it.
    #[derive(Clone, Default)]
    pub struct FakeMonitoringSource {
        inner: Arc<Mutex<MonitoringSnapshot>>,
    }

    impl FakeMonitoringSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_snapshot(&self, snapshot: MonitoringSnapshot) {
            *self.inner.lock() = snapshot;
        }
    }

    impl MonitoringSource for FakeMonitoringSource {
        fn snapshot(&self) -> MonitoringSnapshot {
            self.inner.lock().clone()
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeMonitoringSource;

#[cfg(test)]
#[path = "monitoring_source_tests.rs"]
mod tests;
