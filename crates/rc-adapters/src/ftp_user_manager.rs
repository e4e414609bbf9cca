// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The FTP server used as an upload sink (spec §1, §4.4.4 step 4, Internal
//! FTP mode). Out of scope per spec.md §1 — represented here as a trait
//! plus an in-memory fake.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Permissions granted to a temporary upload user (spec §4.4.4 step 4:
/// "permissions = write/append/rename + list/mkdir/renamedir").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FtpPermissions {
    pub write: bool,
    pub append: bool,
    pub rename: bool,
    pub list: bool,
    pub mkdir: bool,
    pub rename_dir: bool,
}

impl FtpPermissions {
    /// The fixed permission set every internal-FTP upload user gets.
    pub fn upload_user() -> Self {
        Self { write: true, append: true, rename: true, list: true, mkdir: true, rename_dir: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FtpError {
    #[error("ftp user {0:?} already exists")]
    UserAlreadyExists(String),

    #[error("ftp user {0:?} not found")]
    UserNotFound(String),

    #[error("could not create home directory {0:?}: {1}")]
    HomeDirectoryError(PathBuf, String),
}

/// Manages ephemeral FTP users for internal-FTP-mode uploads. One user is
/// created per upload, scoped to that measurement's home directory, and
/// removed once the upload finishes (spec §4.4.4 step 4).
pub trait FtpUserManager: Send + Sync {
    fn add_user(
        &self,
        username: &str,
        password: &str,
        home_dir: &Path,
        permissions: FtpPermissions,
    ) -> Result<(), FtpError>;

    fn remove_user(&self, username: &str) -> Result<(), FtpError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FakeFtpUser {
        pub password: String,
        pub home_dir: PathBuf,
        pub permissions: FtpPermissions,
    }

    /// In-memory FTP user manager. Tracks live users so tests can assert a
    /// user was created with the right home directory and permissions, and
    /// that it was removed once the upload completed.
    #[derive(Clone, Default)]
    pub struct FakeFtpUserManager {
        inner: Arc<Mutex<BTreeMap<String, FakeFtpUser>>>,
    }

    impl FakeFtpUserManager {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn users(&self) -> BTreeMap<String, FakeFtpUser> {
            self.inner.lock().clone()
        }

        pub fn user(&self, username: &str) -> Option<FakeFtpUser> {
            self.inner.lock().get(username).cloned()
        }
    }

    impl FtpUserManager for FakeFtpUserManager {
        fn add_user(
            &self,
            username: &str,
            password: &str,
            home_dir: &Path,
            permissions: FtpPermissions,
        ) -> Result<(), FtpError> {
            let mut users = self.inner.lock();
            if users.contains_key(username) {
                return Err(FtpError::UserAlreadyExists(username.to_string()));
            }
            users.insert(
                username.to_string(),
                FakeFtpUser { password: password.to_string(), home_dir: home_dir.to_path_buf(), permissions },
            );
            Ok(())
        }

        fn remove_user(&self, username: &str) -> Result<(), FtpError> {
            match self.inner.lock().remove(username) {
                Some(_) => Ok(()),
                None => Err(FtpError::UserNotFound(username.to_string())),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeFtpUser, FakeFtpUserManager};

#[cfg(test)]
#[path = "ftp_user_manager_tests.rs"]
mod tests;
