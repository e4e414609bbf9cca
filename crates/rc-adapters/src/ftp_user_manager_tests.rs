// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;

#[test]
fn add_user_then_lookup_roundtrips() {
    let manager = FakeFtpUserManager::new();
    manager.add_user("42", "42", Path::new("/meas/42"), FtpPermissions::upload_user()).unwrap();

    let user = manager.user("42").unwrap();
    assert_eq!(user.password, "42");
    assert_eq!(user.home_dir, Path::new("/meas/42"));
    assert!(user.permissions.write);
    assert!(user.permissions.rename_dir);
}

#[test]
fn adding_a_duplicate_username_errors() {
    let manager = FakeFtpUserManager::new();
    manager.add_user("42", "42", Path::new("/meas/42"), FtpPermissions::upload_user()).unwrap();

    let err = manager.add_user("42", "42", Path::new("/meas/42"), FtpPermissions::upload_user()).unwrap_err();
    assert!(matches!(err, FtpError::UserAlreadyExists(u) if u == "42"));
}

#[test]
fn remove_user_drops_it_from_the_registry() {
    let manager = FakeFtpUserManager::new();
    manager.add_user("42", "42", Path::new("/meas/42"), FtpPermissions::upload_user()).unwrap();

    manager.remove_user("42").unwrap();
    assert!(manager.user("42").is_none());
}

#[test]
fn removing_an_unknown_user_errors() {
    let manager = FakeFtpUserManager::new();
    let err = manager.remove_user("missing").unwrap_err();
    assert!(matches!(err, FtpError::UserNotFound(u) if u == "missing"));
}
