// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rc-connection: the Client Connection (C1) — `LocalConnection` and
//! `RemoteConnection`, sharing the `ClientConnection` trait so the
//! coordinator's connection map is homogeneous over both variants.

pub mod client_connection;
pub mod local;
pub mod remote;

pub use client_connection::{ClientConnection, StatusCallback, StatusResponseCallback};
pub use local::LocalConnection;
pub use remote::RemoteConnection;
