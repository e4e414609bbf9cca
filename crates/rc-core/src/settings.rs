// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Partial-update recorder settings and the record-mode enum.
//!
//! Grounded on `original_source/.../recorder_settings.h`: the C++ type uses
//! `std::pair<bool, T>` per field so a diff can omit fields that shouldn't
//! change. `Option<T>` is the idiomatic Rust equivalent (`Some` == present).

use std::collections::BTreeSet;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordMode {
    All,
    Blacklist,
    Whitelist,
}

crate::simple_display! {
    RecordMode {
        All => "all",
        Blacklist => "blacklist",
        Whitelist => "whitelist",
    }
}

impl std::str::FromStr for RecordMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(RecordMode::All),
            "blacklist" => Ok(RecordMode::Blacklist),
            "whitelist" => Ok(RecordMode::Whitelist),
            other => Err(format!("unknown record mode: {other:?}")),
        }
    }
}

/// A partial update to a remote client's settings. Every field is optional;
/// `add_settings` merges a diff into an accumulated "complete" settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecorderSettings {
    pub max_pre_buffer_length: Option<Duration>,
    pub pre_buffering_enabled: Option<bool>,
    pub host_filter: Option<BTreeSet<String>>,
    pub record_mode: Option<RecordMode>,
    pub listed_topics: Option<BTreeSet<String>>,
    pub enabled_addons: Option<BTreeSet<String>>,
}

impl RecorderSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `other` into `self`: for each field, `other`'s value overrides
    /// iff it is present. Associative and idempotent when `other` is
    /// applied to itself repeatedly (§8 round-trip property).
    pub fn add_settings(&mut self, other: &RecorderSettings) {
        if let Some(v) = &other.max_pre_buffer_length {
            self.max_pre_buffer_length = Some(*v);
        }
        if let Some(v) = other.pre_buffering_enabled {
            self.pre_buffering_enabled = Some(v);
        }
        if let Some(v) = &other.host_filter {
            self.host_filter = Some(v.clone());
        }
        if let Some(v) = other.record_mode {
            self.record_mode = Some(v);
        }
        if let Some(v) = &other.listed_topics {
            self.listed_topics = Some(v.clone());
        }
        if let Some(v) = &other.enabled_addons {
            self.enabled_addons = Some(v.clone());
        }
    }

    pub fn merged(mut self, other: &RecorderSettings) -> Self {
        self.add_settings(other);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &RecorderSettings::default()
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct RecorderSettingsBuilder => RecorderSettings {
        option { max_pre_buffer_length: Duration = None }
        option { pre_buffering_enabled: bool = None }
        option { host_filter: BTreeSet<String> = None }
        option { record_mode: RecordMode = None }
        option { listed_topics: BTreeSet<String> = None }
        option { enabled_addons: BTreeSet<String> = None }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
