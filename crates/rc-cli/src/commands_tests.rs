// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_client_spec_bare_host() {
    let (host, cfg) = parse_client_spec("H1").unwrap();
    assert_eq!(host, "H1");
    assert!(cfg.enabled_addons.is_empty());
    assert!(cfg.host_filter.is_empty());
}

#[test]
fn parse_client_spec_with_addons() {
    let (host, cfg) = parse_client_spec("H1:cam0,cam1").unwrap();
    assert_eq!(host, "H1");
    assert_eq!(cfg.enabled_addons, vec!["cam0".to_string(), "cam1".to_string()]);
    assert!(cfg.host_filter.is_empty());
}

#[test]
fn parse_client_spec_with_filter() {
    let (host, cfg) = parse_client_spec("H1@H1,H2").unwrap();
    assert_eq!(host, "H1");
    assert!(cfg.enabled_addons.is_empty());
    assert_eq!(cfg.host_filter, vec!["H1".to_string(), "H2".to_string()]);
}

#[test]
fn parse_client_spec_with_addons_and_filter() {
    let (host, cfg) = parse_client_spec("H1:cam0@H1,H2").unwrap();
    assert_eq!(host, "H1");
    assert_eq!(cfg.enabled_addons, vec!["cam0".to_string()]);
    assert_eq!(cfg.host_filter, vec!["H1".to_string(), "H2".to_string()]);
}

#[test]
fn parse_client_spec_rejects_empty_host() {
    assert!(parse_client_spec("").is_err());
    assert!(parse_client_spec(":cam0").is_err());
    assert!(parse_client_spec("@H1").is_err());
}

#[test]
fn split_csv_drops_empty_segments() {
    assert_eq!(split_csv("a,,b,"), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(split_csv(""), Vec::<String>::new());
}
