// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex as PlMutex;
use rc_adapters::monitoring_source::{MonitoringSnapshot, ProcessInfo, PublisherInfo, SubscriberInfo};
use rc_adapters::FakeMonitoringSource;
use std::collections::BTreeSet;
use std::sync::Arc;

fn unit_names() -> BTreeSet<String> {
    ["rec_client"].iter().map(|s| s.to_string()).collect()
}

#[test]
fn tick_populates_hosts_running_client_from_matching_units() {
    let source = Arc::new(FakeMonitoringSource::new());
    source.set_snapshot(MonitoringSnapshot {
        processes: vec![
            ProcessInfo { host: "h1".to_string(), pid: 10, unit_name: "rec_client".to_string() },
            ProcessInfo { host: "h2".to_string(), pid: 11, unit_name: "other_process".to_string() },
        ],
        publishers: vec![],
        subscribers: vec![],
    });

    let monitor = MonitoringLoop::new(source, unit_names(), || BTreeSet::new());
    monitor.tick();

    let hosts = monitor.hosts_running_client();
    assert!(hosts.contains("h1"));
    assert!(!hosts.contains("h2"));
}

#[test]
fn tick_rebuilds_topic_publishers() {
    let source = Arc::new(FakeMonitoringSource::new());
    source.set_snapshot(MonitoringSnapshot {
        processes: vec![],
        publishers: vec![PublisherInfo {
            topic: "/odom".to_string(),
            type_info: "nav_msgs/Odometry".to_string(),
            host: "h1".to_string(),
            process_name: "driver".to_string(),
        }],
        subscribers: vec![],
    });

    let monitor = MonitoringLoop::new(source, unit_names(), || BTreeSet::new());
    monitor.tick();

    let topics = monitor.topic_info_map();
    let topic = topics.get("/odom").expect("topic present");
    assert_eq!(topic.type_info, "nav_msgs/Odometry");
    assert!(topic.publishers.get("h1").unwrap().contains("driver"));
}

#[test]
fn subscriber_frequency_only_recorded_for_running_enabled_clients() {
    let source = Arc::new(FakeMonitoringSource::new());
    source.set_snapshot(MonitoringSnapshot {
        processes: vec![],
        publishers: vec![],
        subscribers: vec![
            SubscriberInfo {
                topic: "/odom".to_string(),
                host: "h1".to_string(),
                pid: 10,
                unit_name: "rec_client".to_string(),
                frequency_milli_hz: 10_000,
            },
            SubscriberInfo {
                topic: "/odom".to_string(),
                host: "h2".to_string(),
                pid: 11,
                unit_name: "rec_client".to_string(),
                frequency_milli_hz: 5_000,
            },
        ],
    });

    let monitor =
        MonitoringLoop::new(source, unit_names(), || BTreeSet::from([rc_core::topic::HostPid { host: "h1".to_string(), pid: 10 }]));
    monitor.tick();

    let topics = monitor.topic_info_map();
    let topic = topics.get("/odom").expect("topic present");
    assert_eq!(topic.rec_subscribers.len(), 1);
    let hz = topic.rec_subscribers.get(&rc_core::topic::HostPid { host: "h1".to_string(), pid: 10 }).copied();
    assert_eq!(hz, Some(10.0));
}

#[test]
fn hooks_run_in_registration_order_with_hosts_running_client() {
    let source = Arc::new(FakeMonitoringSource::new());
    source.set_snapshot(MonitoringSnapshot {
        processes: vec![ProcessInfo {
            host: "h1".to_string(),
            pid: 10,
            unit_name: "rec_client".to_string(),
        }],
        publishers: vec![],
        subscribers: vec![],
    });

    let monitor = MonitoringLoop::new(source, unit_names(), || BTreeSet::new());
    let calls = Arc::new(PlMutex::new(Vec::new()));

    let calls_a = calls.clone();
    monitor.add_post_update_hook(Box::new(move |hosts| {
        calls_a.lock().push(("a", hosts.clone()));
    }));
    let calls_b = calls.clone();
    monitor.add_post_update_hook(Box::new(move |hosts| {
        calls_b.lock().push(("b", hosts.clone()));
    }));

    monitor.tick();

    let recorded = calls.lock();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].0, "a");
    assert_eq!(recorded[1].0, "b");
    assert!(recorded[0].1.contains("h1"));
}

#[test]
fn repeated_ticks_clear_stale_entries() {
    let source = Arc::new(FakeMonitoringSource::new());
    source.set_snapshot(MonitoringSnapshot {
        processes: vec![ProcessInfo {
            host: "h1".to_string(),
            pid: 10,
            unit_name: "rec_client".to_string(),
        }],
        publishers: vec![],
        subscribers: vec![],
    });
    let monitor = MonitoringLoop::new(source.clone(), unit_names(), || BTreeSet::new());
    monitor.tick();
    assert!(monitor.hosts_running_client().contains("h1"));

    source.set_snapshot(MonitoringSnapshot::default());
    monitor.tick();
    assert!(monitor.hosts_running_client().is_empty());
}
