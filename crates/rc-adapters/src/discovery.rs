// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pub/sub discovery registry a remote connection scans when binding to
//! a host (spec §4.1.b step 1). Out of scope per spec.md §1; represented
//! here purely as a trait plus an in-memory fake.

/// Opaque handle to one discovered recorder-service instance. A restart of
/// the recorder-client process on a host produces a fresh `ServiceInstanceId`
/// even though the hostname is unchanged, which is how a bound connection
/// notices its peer has respawned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceInstanceId(String);

impl ServiceInstanceId {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self(entity_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ServiceInstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Discovery registry lookup. A remote connection calls
/// `candidate_instances` for its host and tries each in turn until one
/// responds to a `GetState` probe (spec §4.1.b step 1).
pub trait Discovery: Send + Sync {
    fn candidate_instances(&self, host: &str) -> Vec<ServiceInstanceId>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    /// In-memory discovery registry. Tests register/unregister instances to
    /// simulate a recorder-client process appearing, disappearing, or
    /// restarting under a new entity id on the same host.
    #[derive(Clone, Default)]
    pub struct FakeDiscovery {
        inner: Arc<Mutex<BTreeMap<String, Vec<ServiceInstanceId>>>>,
    }

    impl FakeDiscovery {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn register(&self, host: impl Into<String>, instance: ServiceInstanceId) {
            self.inner.lock().entry(host.into()).or_default().push(instance);
        }

        pub fn unregister(&self, host: &str, instance: &ServiceInstanceId) {
            if let Some(instances) = self.inner.lock().get_mut(host) {
                instances.retain(|i| i != instance);
            }
        }

        pub fn clear(&self, host: &str) {
            self.inner.lock().remove(host);
        }
    }

    impl Discovery for FakeDiscovery {
        fn candidate_instances(&self, host: &str) -> Vec<ServiceInstanceId> {
            self.inner.lock().get(host).cloned().unwrap_or_default()
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeDiscovery;

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
