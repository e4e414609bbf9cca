// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Measurement job configuration, in both its host- and local-evaluated
//! forms (see the GLOSSARY in spec.md).

/// A measurement's numeric job identifier. Strictly increasing across the
/// lifetime of a coordinator (invariant 4, spec §3).
pub type JobId = i64;

/// `{job_id, meas_root_dir, meas_name, description, max_file_size_mib,
/// one_file_per_topic}` with template variables already expanded.
///
/// The coordinator renders two variants from the same template: a
/// "host-evaluated" copy (path separators left portable) sent to remote
/// connections, and a "local-evaluated" copy (further canonicalised for the
/// local filesystem) used for the server's own bookkeeping and sent to the
/// in-process recorder. Both are represented by this same struct; which
/// variant a value holds is a matter of how it was produced, not its type.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct JobConfig {
    pub job_id: JobId,
    pub meas_root_dir: String,
    pub meas_name: String,
    pub description: String,
    pub max_file_size_mib: u64,
    pub one_file_per_topic: bool,
}

impl JobConfig {
    pub fn new(job_id: JobId, meas_root_dir: impl Into<String>, meas_name: impl Into<String>) -> Self {
        Self {
            job_id,
            meas_root_dir: meas_root_dir.into(),
            meas_name: meas_name.into(),
            description: String::new(),
            max_file_size_mib: 0,
            one_file_per_topic: false,
        }
    }

    /// Canonicalise `meas_root_dir`'s path separators for the local host,
    /// producing a "local-evaluated" copy from a "host-evaluated" one.
    pub fn to_local_evaluated(&self) -> Self {
        let mut local = self.clone();
        local.meas_root_dir = canonicalize_separators(&local.meas_root_dir);
        local
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct JobConfigBuilder => JobConfig {
        set { job_id: JobId = 0 }
        into { meas_root_dir: String = "" }
        into { meas_name: String = "" }
        into { description: String = "" }
        set { max_file_size_mib: u64 = 0 }
        set { one_file_per_topic: bool = false }
    }
}

fn canonicalize_separators(path: &str) -> String {
    if std::path::MAIN_SEPARATOR == '/' {
        path.replace('\\', "/")
    } else {
        path.replace('/', &std::path::MAIN_SEPARATOR.to_string())
    }
}

#[cfg(test)]
#[path = "job_config_tests.rs"]
mod tests;
