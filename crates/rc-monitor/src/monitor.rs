// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The 1Hz Monitoring Loop thread (spec §4.2), grounded on
//! `original_source/.../monitoring_thread.cpp`: each tick re-reads the
//! middleware's snapshot, rebuilds `hosts_running_client`/`topic_info_map`
//! under a writer lock, then downgrades to a reader lock to invoke
//! post-update hooks in order.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, RwLock};
use rc_adapters::MonitoringSource;
use rc_core::topic::HostPid;
use rc_core::TopicInfo;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Invoked once per tick, in registration order, with the freshly rebuilt
/// `hosts_running_client` set. Must not call the monitor's own getters
/// (`hosts_running_client()`/`topic_info_map()`) — they are invoked while
/// this hook runs under the monitor's own reader lock, and taking it again
/// would deadlock (spec §4.2 "Contract on hooks").
pub type PostUpdateHook = Box<dyn Fn(&BTreeSet<String>) + Send + Sync>;

#[derive(Default)]
struct MonitorState {
    hosts_running_client: BTreeSet<String>,
    topic_info_map: BTreeMap<String, TopicInfo>,
}

struct Inner {
    source: Arc<dyn MonitoringSource>,
    recorder_client_unit_names: BTreeSet<String>,
    running_enabled_clients: Box<dyn Fn() -> BTreeSet<HostPid> + Send + Sync>,
    state: RwLock<MonitorState>,
    hooks: Mutex<Vec<PostUpdateHook>>,
    interrupted: AtomicBool,
    tick_lock: Mutex<()>,
    cv: Condvar,
}

/// The Monitoring Loop (C2). Owns a single background thread; all public
/// getters return owned copies so callers never hold a reference into
/// monitor-internal state (spec §5 "copy-returning getters").
pub struct MonitoringLoop {
    inner: Arc<Inner>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MonitoringLoop {
    /// `recorder_client_unit_names` identifies which middleware process
    /// unit names count as a recorder-client instance (spec §4.2 step 2).
    /// `running_enabled_clients` is supplied by the coordinator: the set of
    /// `(host, pid)` pairs it currently considers enabled and running,
    /// used to gate which subscribers' frequencies get recorded (spec §4.2
    /// step 3).
    pub fn new(
        source: Arc<dyn MonitoringSource>,
        recorder_client_unit_names: BTreeSet<String>,
        running_enabled_clients: impl Fn() -> BTreeSet<HostPid> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                recorder_client_unit_names,
                running_enabled_clients: Box::new(running_enabled_clients),
                state: RwLock::new(MonitorState::default()),
                hooks: Mutex::new(Vec::new()),
                interrupted: AtomicBool::new(false),
                tick_lock: Mutex::new(()),
                cv: Condvar::new(),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Register a post-update hook. The first hook registered is always
    /// the coordinator's `update_connections` (spec §4.2 step 4); later
    /// hooks run after it, in registration order. Must be called before
    /// `start()`.
    pub fn add_post_update_hook(&self, hook: PostUpdateHook) {
        self.inner.hooks.lock().push(hook);
    }

    /// Spawn the background 1Hz thread. No-op if already started.
    pub fn start(&self) {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return;
        }
        let inner = self.inner.clone();
        *worker = Some(std::thread::spawn(move || inner.run()));
    }

    /// Run exactly one tick synchronously. Exposed so tests can drive the
    /// loop deterministically without waiting on the real 1Hz thread.
    pub fn tick(&self) {
        self.inner.tick();
    }

    pub fn hosts_running_client(&self) -> BTreeSet<String> {
        self.inner.state.read().hosts_running_client.clone()
    }

    pub fn topic_info_map(&self) -> BTreeMap<String, TopicInfo> {
        self.inner.state.read().topic_info_map.clone()
    }

    /// Signal the thread to stop and join it. Checked at every lock
    /// boundary and before every hook invocation (spec §4.2
    /// "Cancellation").
    pub fn shutdown(&self) {
        self.inner.interrupted.store(true, Ordering::SeqCst);
        {
            let _guard = self.inner.tick_lock.lock();
            self.inner.cv.notify_all();
        }
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MonitoringLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    fn interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    fn run(&self) {
        loop {
            if self.interrupted() {
                return;
            }
            self.tick();
            if self.interrupted() {
                return;
            }
            self.sleep_or_interrupt(TICK_INTERVAL);
        }
    }

    fn sleep_or_interrupt(&self, timeout: Duration) {
        let mut guard = self.tick_lock.lock();
        if self.interrupted() {
            return;
        }
        self.cv.wait_for(&mut guard, timeout);
    }

    /// One full tick: snapshot → rebuild under writer lock → downgrade to
    /// reader lock → run hooks (spec §4.2 steps 1-4).
    fn tick(&self) {
        if self.interrupted() {
            return;
        }
        let snapshot = self.source.snapshot();

        if self.interrupted() {
            return;
        }
        let running = (self.running_enabled_clients)();

        {
            let mut state = self.state.write();
            state.hosts_running_client.clear();
            state.topic_info_map.clear();

            for process in &snapshot.processes {
                if self.recorder_client_unit_names.contains(&process.unit_name) {
                    state.hosts_running_client.insert(process.host.clone());
                }
            }

            for publisher in &snapshot.publishers {
                state
                    .topic_info_map
                    .entry(publisher.topic.clone())
                    .or_insert_with(|| TopicInfo::new(publisher.type_info.clone()))
                    .add_publisher(publisher.host.clone(), publisher.process_name.clone());
            }

            for subscriber in &snapshot.subscribers {
                if !self.recorder_client_unit_names.contains(&subscriber.unit_name) {
                    continue;
                }
                let host_pid = HostPid { host: subscriber.host.clone(), pid: subscriber.pid };
                if !running.contains(&host_pid) {
                    continue;
                }
                state
                    .topic_info_map
                    .entry(subscriber.topic.clone())
                    .or_insert_with(TopicInfo::default)
                    .set_subscriber_frequency_hz(host_pid, subscriber.frequency_milli_hz as f64 / 1000.0);
            }
        }

        if self.interrupted() {
            return;
        }

        // "Downgrade to reader lock": released the writer above, now take a
        // reader for the duration of the hook calls, matching the original
        // locking discipline without requiring a true lock downgrade.
        let state = self.state.read();
        let hooks = self.hooks.lock();
        for hook in hooks.iter() {
            if self.interrupted() {
                return;
            }
            hook(&state.hosts_running_client);
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
