// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server-wide upload sink configuration (spec §3, §6).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadProtocol {
    InternalFtp,
    ExternalFtp,
}

crate::simple_display! {
    UploadProtocol {
        InternalFtp => "InternalFTP",
        ExternalFtp => "ExternalFTP",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UploadConfig {
    #[serde(rename = "type")]
    pub protocol: UploadProtocolSerde,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub root_path: String,
    pub delete_after_upload: bool,
}

/// Serde-friendly mirror of [`UploadProtocol`] (which intentionally has no
/// derived Serialize/Deserialize so its Display stays free to diverge from
/// its wire representation if the two ever need to).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UploadProtocolSerde {
    InternalFtp,
    ExternalFtp,
}

impl From<UploadProtocol> for UploadProtocolSerde {
    fn from(p: UploadProtocol) -> Self {
        match p {
            UploadProtocol::InternalFtp => UploadProtocolSerde::InternalFtp,
            UploadProtocol::ExternalFtp => UploadProtocolSerde::ExternalFtp,
        }
    }
}

impl From<UploadProtocolSerde> for UploadProtocol {
    fn from(p: UploadProtocolSerde) -> Self {
        match p {
            UploadProtocolSerde::InternalFtp => UploadProtocol::InternalFtp,
            UploadProtocolSerde::ExternalFtp => UploadProtocol::ExternalFtp,
        }
    }
}

impl UploadConfig {
    pub fn protocol(&self) -> UploadProtocol {
        self.protocol.into()
    }

    pub fn internal_ftp() -> Self {
        Self {
            protocol: UploadProtocolSerde::InternalFtp,
            host: String::new(),
            port: 0,
            username: String::new(),
            password: String::new(),
            root_path: String::new(),
            delete_after_upload: false,
        }
    }

    pub fn external_ftp(host: impl Into<String>, port: u16, root_path: impl Into<String>) -> Self {
        Self {
            protocol: UploadProtocolSerde::ExternalFtp,
            host: host.into(),
            port,
            username: String::new(),
            password: String::new(),
            root_path: root_path.into(),
            delete_after_upload: false,
        }
    }

    /// Normalise `root_path` to forward slashes with a leading and trailing
    /// `/`, then append `meas_name` (§4.4.4 step 4, External FTP mode).
    pub fn external_upload_path(&self, meas_name: &str) -> String {
        let mut path = self.root_path.replace('\\', "/");
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        if !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(meas_name);
        clean_path(&path)
    }
}

fn clean_path(path: &str) -> String {
    let mut cleaned = String::with_capacity(path.len());
    let mut last_was_slash = false;
    for c in path.chars() {
        if c == '/' {
            if last_was_slash {
                continue;
            }
            last_was_slash = true;
        } else {
            last_was_slash = false;
        }
        cleaned.push(c);
    }
    cleaned
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;
