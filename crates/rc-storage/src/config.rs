// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted XML config load/save (spec §6), grounded on
//! `original_source/.../config/config.cpp` and
//! `original_source/.../config/config_v2to3.h`.
//!
//! The on-disk root element is `ecalRecServerConfig` (v2-v4, with a
//! `config_version` attribute). A single file may carry multiple root-level
//! blocks for forward/backward compatibility; on load we prefer the highest
//! recognised version ≤ [`NATIVE_CONFIG_VERSION`], else any higher-version
//! block, else an unversioned block, else fail. Save always writes the
//! native version. The real implementation's v1 root (`eCALRecGUI`) is not
//! recognised here: `readConfigFromFile()`'s read loop never calls the v1
//! reader (it only branches on `v>=2`/`v==0`/`v>NATIVE`), so v1 support is
//! dead code in ground truth and is not carried forward.
//!
//! `quick-xml` is a new dependency here — the teacher persists its own
//! state as TOML (`serde` + `thiserror` wrapping), and `quick-xml`'s serde
//! integration is the closest same-shaped substitute for this externally
//! mandated XML format (see `DESIGN.md`).

use std::collections::BTreeMap;
use std::path::Path;

use rc_core::{ClientConfig, ErrorKind, RecordMode, UploadConfig, UploadProtocol};
use serde::{Deserialize, Serialize};

/// Native/current config version this binary writes. spec.md §6 states the
/// recognised range as v2-v4; the original C++ snapshot hardcodes
/// `NATIVE_CONFIG_VERSION = 3` (`original_source/.../config.h`) but
/// spec.md's stated range is authoritative here — see `DESIGN.md`.
pub const NATIVE_CONFIG_VERSION: u32 = 4;

const ELEMENT_MAIN_CONFIG_V2TO4: &str = "ecalRecServerConfig";
const ATTRIBUTE_CONFIG_VERSION: &str = "config_version";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedEnabledClient {
    pub name: String,
    #[serde(default)]
    pub host_filter: HostFilterXml,
    #[serde(default)]
    pub enabled_addons: EnabledAddonsXml,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFilterXml {
    #[serde(rename = "host", default)]
    pub host: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledAddonsXml {
    #[serde(rename = "addon", default)]
    pub addon: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordersXml {
    #[serde(rename = "client", default)]
    pub client: Vec<PersistedEnabledClient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicListXml {
    #[serde(rename = "@type")]
    pub record_mode: String,
    #[serde(rename = "topic", default)]
    pub topic: Vec<String>,
}

impl Default for TopicListXml {
    fn default() -> Self {
        Self { record_mode: "all".to_string(), topic: Vec::new() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedUploadConfig {
    #[serde(rename = "@protocol")]
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    #[serde(rename = "rootDirectory")]
    pub root_directory: String,
    #[serde(rename = "deleteAfterUpload")]
    pub delete_after_upload: bool,
}

impl From<&UploadConfig> for PersistedUploadConfig {
    fn from(cfg: &UploadConfig) -> Self {
        Self {
            protocol: cfg.protocol().to_string(),
            host: cfg.host.clone(),
            port: cfg.port,
            username: cfg.username.clone(),
            password: cfg.password.clone(),
            root_directory: cfg.root_path.clone(),
            delete_after_upload: cfg.delete_after_upload,
        }
    }
}

impl PersistedUploadConfig {
    fn into_upload_config(self) -> rc_core::Result<UploadConfig> {
        let protocol = match self.protocol.as_str() {
            "InternalFTP" => UploadProtocol::InternalFtp,
            "ExternalFTP" => UploadProtocol::ExternalFtp,
            other => {
                return Err(ErrorKind::UnsupportedAction(Some(format!("unsupported protocol {other:?}"))))
            }
        };
        Ok(UploadConfig {
            protocol: protocol.into(),
            host: self.host,
            port: self.port,
            username: self.username,
            password: self.password,
            root_path: self.root_directory,
            delete_after_upload: self.delete_after_upload,
        })
    }
}

/// The full persisted server configuration (root directory, job template
/// fields, enabled clients, pre-buffer settings, topic list, upload sink).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "ecalRecServerConfig")]
pub struct PersistedConfig {
    #[serde(rename = "rootDirectory")]
    pub root_directory: String,
    #[serde(rename = "measurementName")]
    pub measurement_name: String,
    #[serde(rename = "maxFileSizeMib")]
    pub max_file_size_mib: u64,
    pub description: String,
    #[serde(rename = "recorders", default)]
    pub recorders: RecordersXml,
    #[serde(rename = "preBufferEnabled")]
    pub pre_buffer_enabled: bool,
    #[serde(rename = "preBufferLengthSecs")]
    pub pre_buffer_length_secs: f64,
    #[serde(rename = "useBuiltInRecorder")]
    pub built_in_recorder_enabled: bool,
    #[serde(rename = "topicList", default)]
    pub topic_list: TopicListXml,
    #[serde(rename = "uploadConfig", skip_serializing_if = "Option::is_none", default)]
    pub upload_config: Option<PersistedUploadConfig>,
}

impl PersistedConfig {
    pub fn enabled_clients(&self) -> BTreeMap<String, ClientConfig> {
        self.recorders
            .client
            .iter()
            .map(|c| {
                let cfg = ClientConfig {
                    enabled_addons: c.enabled_addons.addon.iter().cloned().collect(),
                    host_filter: c.host_filter.host.iter().cloned().collect(),
                };
                (c.name.clone(), cfg)
            })
            .collect()
    }

    pub fn record_mode(&self) -> RecordMode {
        self.topic_list.record_mode.parse().unwrap_or(RecordMode::All)
    }

    pub fn upload_config(&self) -> rc_core::Result<Option<UploadConfig>> {
        self.upload_config.clone().map(PersistedUploadConfig::into_upload_config).transpose()
    }
}

/// Top-level-element spans found while scanning the raw document, keyed by
/// their declared config version (`None` for an element with no
/// `config_version` attribute).
struct ScannedElement {
    name: String,
    version: Option<u32>,
    xml: String,
}

fn scan_top_level_elements(xml: &str) -> rc_core::Result<Vec<ScannedElement>> {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text = true;

    let mut elements = Vec::new();
    let mut depth: u32 = 0;
    let mut current_start: Option<usize> = None;
    let mut current_name = String::new();
    let mut current_version: Option<u32> = None;

    loop {
        let pos_before = reader.buffer_position() as usize;
        match reader
            .read_event()
            .map_err(|e| ErrorKind::GenericError(Some(format!("xml parse error: {e}"))))?
        {
            Event::Start(e) => {
                if depth == 0 {
                    current_start = Some(pos_before);
                    current_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    current_version = None;
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == ATTRIBUTE_CONFIG_VERSION.as_bytes() {
                            if let Ok(v) = String::from_utf8_lossy(&attr.value).parse::<u32>() {
                                current_version = Some(v);
                            }
                        }
                    }
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if depth == 0 {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let end = reader.buffer_position() as usize;
                    elements.push(ScannedElement { name, version: None, xml: xml[pos_before..end].to_string() });
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(start) = current_start.take() {
                        let end = reader.buffer_position() as usize;
                        elements.push(ScannedElement {
                            name: std::mem::take(&mut current_name),
                            version: current_version.take(),
                            xml: xml[start..end].to_string(),
                        });
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(elements)
}

/// Load a persisted config from `path`, applying the version-fallback
/// algorithm. Returns the config and the version it was read as.
pub fn load_config(path: &Path) -> rc_core::Result<(PersistedConfig, u32)> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ErrorKind::GenericError(Some(format!("error opening file {path:?}: {e}"))))?;

    let elements = scan_top_level_elements(&raw)?;

    let mut by_version: BTreeMap<u32, &ScannedElement> = BTreeMap::new();
    let mut unversioned: Option<&ScannedElement> = None;

    for el in &elements {
        if el.name == ELEMENT_MAIN_CONFIG_V2TO4 {
            match el.version {
                Some(v) => {
                    by_version.insert(v, el);
                }
                None => unversioned = Some(el),
            }
        }
    }

    for v in (2..=NATIVE_CONFIG_VERSION).rev() {
        if let Some(el) = by_version.get(&v) {
            let cfg = parse_v2to4(&el.xml)?;
            return Ok((cfg, v));
        }
    }

    if let Some((&v, el)) = by_version.iter().find(|(&v, _)| v > NATIVE_CONFIG_VERSION) {
        let cfg = parse_v2to4(&el.xml)?;
        return Ok((cfg, v));
    }

    if let Some(el) = unversioned {
        let cfg = parse_v2to4(&el.xml)?;
        return Ok((cfg, 0));
    }

    Err(ErrorKind::GenericError(Some(format!(
        "{path:?} is not a valid eCAL Rec config"
    ))))
}

fn parse_v2to4(xml: &str) -> rc_core::Result<PersistedConfig> {
    quick_xml::de::from_str(xml).map_err(|e| ErrorKind::GenericError(Some(format!("invalid config: {e}"))))
}

/// Save `config` to `path`, always writing the native version.
pub fn save_config(path: &Path, config: &PersistedConfig) -> rc_core::Result<()> {
    let body = quick_xml::se::to_string(config)
        .map_err(|e| ErrorKind::GenericError(Some(format!("failed to serialize config: {e}"))))?;
    // quick-xml's serde serializer doesn't emit attributes on the document
    // root from a derive alone in every version; the version attribute is
    // spliced onto the opening tag explicitly so `load_config` always finds it.
    let versioned = splice_version_attribute(&body, NATIVE_CONFIG_VERSION);
    std::fs::write(path, versioned)
        .map_err(|e| ErrorKind::GenericError(Some(format!("error writing file {path:?}: {e}"))))?;
    tracing::info!(path = %path.display(), version = NATIVE_CONFIG_VERSION, "saved config");
    Ok(())
}

fn splice_version_attribute(xml: &str, version: u32) -> String {
    let needle = format!("<{ELEMENT_MAIN_CONFIG_V2TO4}>");
    if let Some(pos) = xml.find(&needle) {
        let mut out = String::with_capacity(xml.len() + 24);
        out.push_str(&xml[..pos]);
        out.push_str(&format!("<{ELEMENT_MAIN_CONFIG_V2TO4} {ATTRIBUTE_CONFIG_VERSION}=\"{version}\">"));
        out.push_str(&xml[pos + needle.len()..]);
        out
    } else {
        xml.to_string()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
