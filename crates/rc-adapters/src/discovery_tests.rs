// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn unregistered_host_has_no_candidates() {
    let discovery = FakeDiscovery::new();
    assert!(discovery.candidate_instances("H1").is_empty());
}

#[test]
fn register_then_lookup_returns_in_registration_order() {
    let discovery = FakeDiscovery::new();
    discovery.register("H1", ServiceInstanceId::new("a"));
    discovery.register("H1", ServiceInstanceId::new("b"));

    let candidates = discovery.candidate_instances("H1");
    assert_eq!(candidates, vec![ServiceInstanceId::new("a"), ServiceInstanceId::new("b")]);
}

#[test]
fn unregister_removes_only_the_matching_instance() {
    let discovery = FakeDiscovery::new();
    discovery.register("H1", ServiceInstanceId::new("a"));
    discovery.register("H1", ServiceInstanceId::new("b"));

    discovery.unregister("H1", &ServiceInstanceId::new("a"));

    assert_eq!(discovery.candidate_instances("H1"), vec![ServiceInstanceId::new("b")]);
}

#[test]
fn restart_replaces_instance_id_on_the_same_host() {
    let discovery = FakeDiscovery::new();
    let first = ServiceInstanceId::new("pid-100");
    discovery.register("H1", first.clone());
    discovery.unregister("H1", &first);
    discovery.register("H1", ServiceInstanceId::new("pid-200"));

    let candidates = discovery.candidate_instances("H1");
    assert_eq!(candidates, vec![ServiceInstanceId::new("pid-200")]);
}

#[test]
fn clear_drops_all_instances_for_a_host() {
    let discovery = FakeDiscovery::new();
    discovery.register("H1", ServiceInstanceId::new("a"));
    discovery.clear("H1");
    assert!(discovery.candidate_instances("H1").is_empty());
}
