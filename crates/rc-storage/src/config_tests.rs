// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sample_config() -> PersistedConfig {
    PersistedConfig {
        root_directory: "/mnt/measurements".to_string(),
        measurement_name: "$YYYY-$MM-$DD".to_string(),
        max_file_size_mib: 1000,
        description: "nightly run".to_string(),
        recorders: RecordersXml {
            client: vec![PersistedEnabledClient {
                name: "H1".to_string(),
                host_filter: HostFilterXml { host: vec!["H1".to_string()] },
                enabled_addons: EnabledAddonsXml { addon: vec!["cam0".to_string()] },
            }],
        },
        pre_buffer_enabled: true,
        pre_buffer_length_secs: 5.0,
        built_in_recorder_enabled: true,
        topic_list: TopicListXml { record_mode: "blacklist".to_string(), topic: vec!["/rosout".to_string()] },
        upload_config: Some(PersistedUploadConfig {
            protocol: "ExternalFTP".to_string(),
            host: "store".to_string(),
            port: 21,
            username: "u".to_string(),
            password: "p".to_string(),
            root_directory: "/m".to_string(),
            delete_after_upload: false,
        }),
    }
}

#[test]
fn save_then_load_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.xml");
    let original = sample_config();

    save_config(&path, &original).unwrap();
    let (loaded, version) = load_config(&path).unwrap();

    assert_eq!(version, NATIVE_CONFIG_VERSION);
    assert_eq!(loaded, original);
}

#[test]
fn load_prefers_highest_recognised_version_at_or_below_native() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.xml");

    let doc = format!(
        r#"<ecalRecServerConfig config_version="2"><rootDirectory>/a</rootDirectory><measurementName>old</measurementName><maxFileSizeMib>0</maxFileSizeMib><description></description><recorders></recorders><preBufferEnabled>false</preBufferEnabled><preBufferLengthSecs>0</preBufferLengthSecs><useBuiltInRecorder>false</useBuiltInRecorder><topicList type="all"></topicList></ecalRecServerConfig>
<ecalRecServerConfig config_version="{v}"><rootDirectory>/b</rootDirectory><measurementName>new</measurementName><maxFileSizeMib>0</maxFileSizeMib><description></description><recorders></recorders><preBufferEnabled>false</preBufferEnabled><preBufferLengthSecs>0</preBufferLengthSecs><useBuiltInRecorder>false</useBuiltInRecorder><topicList type="all"></topicList></ecalRecServerConfig>"#,
        v = NATIVE_CONFIG_VERSION
    );
    std::fs::write(&path, doc).unwrap();

    let (loaded, version) = load_config(&path).unwrap();
    assert_eq!(version, NATIVE_CONFIG_VERSION);
    assert_eq!(loaded.measurement_name, "new");
}

#[test]
fn load_falls_back_to_higher_than_native_version_when_present() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.xml");
    let future_version = NATIVE_CONFIG_VERSION + 7;

    let doc = format!(
        r#"<ecalRecServerConfig config_version="{v}"><rootDirectory>/future</rootDirectory><measurementName>future</measurementName><maxFileSizeMib>0</maxFileSizeMib><description></description><recorders></recorders><preBufferEnabled>false</preBufferEnabled><preBufferLengthSecs>0</preBufferLengthSecs><useBuiltInRecorder>false</useBuiltInRecorder><topicList type="all"></topicList></ecalRecServerConfig>"#,
        v = future_version
    );
    std::fs::write(&path, doc).unwrap();

    let (loaded, version) = load_config(&path).unwrap();
    assert_eq!(version, future_version);
    assert_eq!(loaded.root_directory, "/future");
}

#[test]
fn load_rejects_file_with_no_recognised_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.xml");
    std::fs::write(&path, "<somethingElse/>").unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, ErrorKind::GenericError(_)));
}

/// The real implementation's v1 root (`eCALRecGUI`) is dead code in ground
/// truth (`readConfigFromFile()` never reaches it) and isn't recognised
/// here either — it falls through to the same rejection as any other
/// unrecognised root.
#[test]
fn load_does_not_recognise_legacy_v1_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.xml");

    let doc = r#"<eCALRecGUI><rootFolder>/legacy</rootFolder></eCALRecGUI>"#;
    std::fs::write(&path, doc).unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, ErrorKind::GenericError(_)));
}

#[test]
fn upload_config_rejects_unsupported_protocol() {
    let mut cfg = sample_config();
    cfg.upload_config = Some(PersistedUploadConfig {
        protocol: "SFTP".to_string(),
        host: "store".to_string(),
        port: 22,
        username: "u".to_string(),
        password: "p".to_string(),
        root_directory: "/m".to_string(),
        delete_after_upload: false,
    });

    let err = cfg.upload_config().unwrap_err();
    assert!(matches!(err, ErrorKind::UnsupportedAction(_)));
}

#[test]
fn enabled_clients_and_record_mode_helpers() {
    let cfg = sample_config();
    let clients = cfg.enabled_clients();
    assert_eq!(clients.len(), 1);
    assert!(clients["H1"].enabled_addons.contains("cam0"));
    assert_eq!(cfg.record_mode(), RecordMode::Blacklist);
    assert_eq!(cfg.upload_config().unwrap().unwrap().protocol(), UploadProtocol::ExternalFtp);
}
