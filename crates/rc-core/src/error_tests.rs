// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn context_suffix_empty_for_none() {
    let e = ErrorKind::MeasIdNotFound(None);
    assert_eq!(e.to_string(), "measurement id not found");
    assert_eq!(e.context(), None);
}

#[test]
fn context_suffix_present_for_some() {
    let e = ErrorKind::CurrentlyFlushing(Some("H2".to_string()));
    assert_eq!(e.to_string(), "currently flushing: H2");
    assert_eq!(e.context(), Some("H2"));
}

#[test]
fn ok_has_no_context() {
    assert_eq!(ErrorKind::Ok.context(), None);
    assert!(ErrorKind::Ok.is_ok());
    assert!(!ErrorKind::GenericError(None).is_ok());
}
