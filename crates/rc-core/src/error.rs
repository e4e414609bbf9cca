// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tagged error kinds surfaced by the measurement lifecycle and config layer.
//!
//! RPC-boundary failures (timeouts, peer-gone) are absorbed at the
//! connection boundary and never produce an [`ErrorKind`]; these variants
//! are reserved for the invariants and lifecycle errors a caller needs to
//! branch on (see spec §7).

use thiserror::Error;

/// Crate-wide result alias for fallible coordinator/config operations.
pub type Result<T> = std::result::Result<T, ErrorKind>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("ok")]
    Ok,

    #[error("generic error{}", context_suffix(.0))]
    GenericError(Option<String>),

    #[error("not initialized{}", context_suffix(.0))]
    NotInitialized(Option<String>),

    #[error("already initialized{}", context_suffix(.0))]
    AlreadyInitialized(Option<String>),

    #[error("parameter error{}", context_suffix(.0))]
    ParameterError(Option<String>),

    #[error("unsupported action{}", context_suffix(.0))]
    UnsupportedAction(Option<String>),

    #[error("resource unavailable{}", context_suffix(.0))]
    ResourceUnavailable(Option<String>),

    #[error("action superfluous{}", context_suffix(.0))]
    ActionSuperfluous(Option<String>),

    #[error("already uploaded{}", context_suffix(.0))]
    AlreadyUploaded(Option<String>),

    #[error("currently recording{}", context_suffix(.0))]
    CurrentlyRecording(Option<String>),

    #[error("currently flushing{}", context_suffix(.0))]
    CurrentlyFlushing(Option<String>),

    #[error("currently uploading{}", context_suffix(.0))]
    CurrentlyUploading(Option<String>),

    #[error("measurement id not found{}", context_suffix(.0))]
    MeasIdNotFound(Option<String>),

    #[error("measurement is deleted{}", context_suffix(.0))]
    MeasIsDeleted(Option<String>),
}

fn context_suffix(ctx: &Option<String>) -> String {
    match ctx {
        Some(s) => format!(": {s}"),
        None => String::new(),
    }
}

impl ErrorKind {
    /// The contextual string carried by this variant, if any (e.g. a
    /// comma-joined list of offending hosts).
    pub fn context(&self) -> Option<&str> {
        match self {
            ErrorKind::Ok => None,
            ErrorKind::GenericError(c)
            | ErrorKind::NotInitialized(c)
            | ErrorKind::AlreadyInitialized(c)
            | ErrorKind::ParameterError(c)
            | ErrorKind::UnsupportedAction(c)
            | ErrorKind::ResourceUnavailable(c)
            | ErrorKind::ActionSuperfluous(c)
            | ErrorKind::AlreadyUploaded(c)
            | ErrorKind::CurrentlyRecording(c)
            | ErrorKind::CurrentlyFlushing(c)
            | ErrorKind::CurrentlyUploading(c)
            | ErrorKind::MeasIdNotFound(c)
            | ErrorKind::MeasIsDeleted(c) => c.as_deref(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ErrorKind::Ok)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
