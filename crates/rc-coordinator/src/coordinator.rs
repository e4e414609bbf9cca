// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Coordinator (C4, spec §4.4): owns the connection set, settings, and
//! upload config; drives the measurement lifecycle; mediates between the
//! Client Connections (C1), the Monitoring Loop (C2), and the Job-History
//! Store (C3).
//!
//! Two `RwLock`s guard coordinator state: `clients` (connections + enabled
//! set) and the Job-History Store's own internal lock. Acquisition order is
//! always `clients` before job-history — never the reverse (spec §4.4,
//! §5) — enforced here by never holding a `clients` guard across a call
//! into `rc_storage::JobHistoryStore`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use rc_adapters::{Discovery, EmbeddedRecorder, FtpPermissions, FtpUserManager, RpcTransport, TemplateContext, TemplateEvaluator};
use rc_connection::{ClientConnection, LocalConnection, RemoteConnection};
use rc_core::topic::HostPid;
use rc_core::{
    AddonJobStatus, ClientConfig, ClientIdentity, ClientJobStatus, Clock, ConnectionSnapshot,
    ErrorKind, JobConfig, JobHistoryEntry, JobStatus, RecordMode, RecorderCommand, RecorderSettings,
    Result, UploadConfig, UploadProtocol, UploadStatus,
};
use rc_storage::JobHistoryStore;

use crate::oracle;

struct ClientsState {
    connections: BTreeMap<ClientIdentity, Arc<dyn ClientConnection>>,
    enabled_clients: BTreeMap<ClientIdentity, ClientConfig>,
}

/// Composite status snapshot (spec §4.4.6). Plain data, no lock held by the
/// caller afterwards — matches the coordinator's copy-returning-getter
/// discipline (spec §5).
#[derive(Debug, Clone)]
pub struct CoordinatorStatus {
    pub config_path: Option<PathBuf>,
    pub config_version: Option<u32>,
    pub bound_to_record_bus: bool,
    pub recording: bool,
    pub currently_recording_job_id: Option<i64>,
    pub history: Vec<JobHistorySummary>,
    pub client_statuses: BTreeMap<ClientIdentity, ConnectionSnapshot>,
}

#[derive(Debug, Clone)]
pub struct JobHistorySummary {
    pub job_id: i64,
    pub meas_name: String,
    pub is_uploaded: bool,
    pub is_deleted: bool,
    pub can_upload: bool,
    pub can_comment: bool,
    pub client_hosts: Vec<String>,
}

/// The Coordinator (C4). Generic over `Clock` so tests can drive job
/// timestamps and template rendering deterministically with `FakeClock`,
/// the same pattern `LocalConnection`/`RemoteConnection`/`MonitoringLoop`
/// use.
pub struct Coordinator<C: Clock> {
    local_host: ClientIdentity,
    clients: RwLock<ClientsState>,
    job_history: Arc<JobHistoryStore>,
    clock: C,

    discovery: Arc<dyn Discovery>,
    transport: Arc<dyn RpcTransport>,
    embedded_recorder: Arc<dyn EmbeddedRecorder>,
    ftp_user_manager: Arc<dyn FtpUserManager>,
    template_evaluator: Arc<dyn TemplateEvaluator>,

    complete_settings: RwLock<RecorderSettings>,
    job_config_template: RwLock<JobConfig>,
    upload_config: RwLock<Option<UploadConfig>>,

    built_in_recorder_enabled: AtomicBool,
    connection_to_clients_active: AtomicBool,
    bound_to_record_bus: AtomicBool,
    recording: AtomicBool,
    currently_recording_job_id: RwLock<Option<i64>>,
    loaded_config: RwLock<Option<(PathBuf, u32)>>,
    next_job_id: AtomicI64,
}

impl<C: Clock + 'static> Coordinator<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        local_host: ClientIdentity,
        discovery: Arc<dyn Discovery>,
        transport: Arc<dyn RpcTransport>,
        embedded_recorder: Arc<dyn EmbeddedRecorder>,
        ftp_user_manager: Arc<dyn FtpUserManager>,
        template_evaluator: Arc<dyn TemplateEvaluator>,
        clock: C,
    ) -> Self {
        Self {
            local_host,
            clients: RwLock::new(ClientsState { connections: BTreeMap::new(), enabled_clients: BTreeMap::new() }),
            job_history: Arc::new(JobHistoryStore::new()),
            clock,
            discovery,
            transport,
            embedded_recorder,
            ftp_user_manager,
            template_evaluator,
            complete_settings: RwLock::new(RecorderSettings::new()),
            job_config_template: RwLock::new(JobConfig::new(0, "", "")),
            upload_config: RwLock::new(None),
            built_in_recorder_enabled: AtomicBool::new(true),
            connection_to_clients_active: AtomicBool::new(false),
            bound_to_record_bus: AtomicBool::new(false),
            recording: AtomicBool::new(false),
            currently_recording_job_id: RwLock::new(None),
            loaded_config: RwLock::new(None),
            next_job_id: AtomicI64::new(1),
        }
    }

    pub fn local_host(&self) -> &ClientIdentity {
        &self.local_host
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    pub fn is_bound_to_record_bus(&self) -> bool {
        self.bound_to_record_bus.load(Ordering::Acquire)
    }

    pub fn currently_recording_job_id(&self) -> Option<i64> {
        *self.currently_recording_job_id.read()
    }

    pub fn job_history(&self) -> Arc<JobHistoryStore> {
        self.job_history.clone()
    }

    /// Everything the monitoring loop's first post-update hook needs: the
    /// set of `(host, pid)` pairs the coordinator currently considers
    /// enabled and running (spec §4.2 step 3, "running-enabled-clients").
    pub fn running_enabled_clients(&self) -> BTreeSet<HostPid> {
        let clients = self.clients.read();
        clients
            .enabled_clients
            .keys()
            .filter_map(|host| {
                let conn = clients.connections.get(host)?;
                if !conn.is_alive() {
                    return None;
                }
                Some(HostPid { host: host.host().to_string(), pid: conn.snapshot().client_pid })
            })
            .collect()
    }

    fn make_connection(&self, host: ClientIdentity) -> Arc<dyn ClientConnection> {
        let history_for_status = self.job_history.clone();
        let status_callback = Arc::new(move |host: &ClientIdentity, status: &rc_core::RecorderStatus| {
            history_for_status.update_from_client_status(host, status);
        });
        let history_for_response = self.job_history.clone();
        let response_callback = Arc::new(move |job_id: i64, host: &ClientIdentity, response: (bool, String)| {
            history_for_response.update_from_command_response(job_id, host, response);
        });

        let initial_settings = self.complete_settings.read().clone();
        let bus_bound = self.bound_to_record_bus.load(Ordering::Acquire);

        if host == self.local_host && self.built_in_recorder_enabled.load(Ordering::Acquire) {
            Arc::new(LocalConnection::new(
                host,
                self.embedded_recorder.clone(),
                status_callback,
                response_callback,
                initial_settings,
                bus_bound,
                self.clock.clone(),
            ))
        } else {
            Arc::new(RemoteConnection::new(
                host,
                self.discovery.clone(),
                self.transport.clone(),
                status_callback,
                response_callback,
                initial_settings,
                bus_bound,
                self.clock.clone(),
            ))
        }
    }

    /// Insert a pre-built connection directly, bypassing `make_connection`.
    /// Used by tests that want deterministic control over the connection
    /// (e.g. a `RemoteConnection::new_unstarted` driven by `step()`, or a
    /// `LocalConnection` standing in for a simulated "remote" host so the
    /// whole measurement lifecycle can be exercised without real threads).
    #[cfg(any(test, feature = "test-support"))]
    pub fn test_register_connection(&self, host: ClientIdentity, connection: Arc<dyn ClientConnection>) {
        self.clients.write().connections.insert(host, connection);
    }

    // ---- client-set management (spec §4.4.1) -------------------------

    /// Reject while recording (invariant 3/testable property: the enabled
    /// set is immutable during a recording).
    pub fn set_enabled_clients(&self, new_map: BTreeMap<ClientIdentity, ClientConfig>) -> Result<()> {
        if self.is_recording() {
            return Err(ErrorKind::CurrentlyRecording(None));
        }

        let mut clients = self.clients.write();
        let active = self.connection_to_clients_active.load(Ordering::Acquire);
        let bus_bound = self.bound_to_record_bus.load(Ordering::Acquire);

        for (host, cfg) in &new_map {
            if let Some(previous_cfg) = clients.enabled_clients.get(host) {
                if previous_cfg != cfg {
                    if let Some(conn) = clients.connections.get(host) {
                        conn.set_settings(&scoping_diff(cfg));
                    }
                }
                continue;
            }

            let conn = match clients.connections.get(host) {
                Some(conn) => conn.clone(),
                None => {
                    let connection = self.make_connection(host.clone());
                    clients.connections.insert(host.clone(), connection.clone());
                    connection
                }
            };
            conn.set_settings(&scoping_diff(cfg));
            if active {
                conn.set_enabled(true, bus_bound);
            }
        }

        let previously_enabled: Vec<ClientIdentity> = clients.enabled_clients.keys().cloned().collect();
        for host in previously_enabled {
            if !new_map.contains_key(&host) {
                if let Some(conn) = clients.connections.get(&host) {
                    conn.set_enabled(false, false);
                }
            }
        }

        clients.enabled_clients = new_map;
        Ok(())
    }

    /// Monitor post-update hook (spec §4.4.1). Must not block on I/O; only
    /// manipulates the in-memory connection map.
    pub fn update_connections(&self, hosts_running_client: &BTreeSet<String>) {
        let mut clients = self.clients.write();

        for host_str in hosts_running_client {
            let host = ClientIdentity::new(host_str.clone());
            if clients.connections.contains_key(&host) {
                continue;
            }
            if host == self.local_host && self.built_in_recorder_enabled.load(Ordering::Acquire) {
                continue;
            }
            let connection = self.make_connection(host.clone());
            clients.connections.insert(host, connection);
        }

        let stale: Vec<ClientIdentity> = clients
            .connections
            .iter()
            .filter(|(host, conn)| {
                !conn.is_alive()
                    && !clients.enabled_clients.contains_key(*host)
                    && !hosts_running_client.contains((*host).host())
                    && !conn.ever_participated_in_measurement()
            })
            .map(|(host, _)| host.clone())
            .collect();

        for host in stale {
            if let Some(conn) = clients.connections.remove(&host) {
                tracing::debug!(host = %host, "pruning connection not seen by the monitor");
                conn.shutdown();
            }
        }
    }

    fn set_connection_to_clients_active(&self, active: bool) {
        self.connection_to_clients_active.store(active, Ordering::Release);
        let clients = self.clients.read();
        let bus_bound = self.bound_to_record_bus.load(Ordering::Acquire);
        for host in clients.enabled_clients.keys() {
            if let Some(conn) = clients.connections.get(host) {
                conn.set_enabled(active, bus_bound);
            }
        }
    }

    fn ensure_connections_active(&self) {
        if !self.connection_to_clients_active.load(Ordering::Acquire) {
            self.set_connection_to_clients_active(true);
        }
    }

    // ---- record-bus lifecycle (spec §4.4.2) ---------------------------

    pub fn connect_to_record_bus(&self) {
        self.bound_to_record_bus.store(true, Ordering::Release);
        if self.connection_to_clients_active.load(Ordering::Acquire) {
            self.broadcast_to_enabled(&RecorderCommand::Initialize);
        }
    }

    pub fn disconnect_from_record_bus(&self) -> Result<()> {
        if self.is_recording() {
            return Err(ErrorKind::CurrentlyRecording(None));
        }
        self.bound_to_record_bus.store(false, Ordering::Release);
        if self.connection_to_clients_active.load(Ordering::Acquire) {
            self.broadcast_to_enabled(&RecorderCommand::DeInitialize);
        }
        Ok(())
    }

    fn broadcast_to_enabled(&self, cmd: &RecorderCommand) {
        let clients = self.clients.read();
        for host in clients.enabled_clients.keys() {
            if let Some(conn) = clients.connections.get(host) {
                conn.set_command(cmd);
            }
        }
    }

    pub fn set_built_in_recorder_enabled(&self, enabled: bool) -> Result<()> {
        if self.is_recording() {
            return Err(ErrorKind::CurrentlyRecording(None));
        }
        self.built_in_recorder_enabled.store(enabled, Ordering::Release);
        Ok(())
    }

    pub fn set_record_mode(&self, mode: RecordMode, listed_topics: BTreeSet<String>) -> Result<()> {
        if self.is_recording() {
            return Err(ErrorKind::CurrentlyRecording(None));
        }
        let diff = RecorderSettings {
            record_mode: Some(mode),
            listed_topics: Some(listed_topics),
            ..RecorderSettings::default()
        };
        self.complete_settings.write().add_settings(&diff);
        let clients = self.clients.read();
        for conn in clients.connections.values() {
            if conn.is_enabled() {
                conn.set_settings(&diff);
            }
        }
        Ok(())
    }

    pub fn set_upload_config(&self, config: UploadConfig) {
        *self.upload_config.write() = Some(config);
    }

    pub fn set_job_config_template(&self, template: JobConfig) {
        *self.job_config_template.write() = template;
    }

    // ---- measurement lifecycle (spec §4.4.3) ---------------------------

    /// Render the job template and dispatch it to every enabled connection
    /// (local gets the local-evaluated config, remote the host-evaluated
    /// one — spec §4.4.3 rationale). Shared by `start_recording` and
    /// `save_pre_buffer`, which differ only in the command they issue and
    /// the flags they flip afterwards.
    fn begin_job(&self, make_command: fn(JobConfig) -> RecorderCommand) -> i64 {
        let job_id = self.next_job_id.fetch_add(1, Ordering::AcqRel);
        let start_time_epoch_ms = self.clock.epoch_ms();
        let context = TemplateContext::new(job_id, start_time_epoch_ms / 1000);

        let template = self.job_config_template.read().clone();
        let host_evaluated = self.template_evaluator.evaluate(&template, &context);
        let local_evaluated = host_evaluated.to_local_evaluated();

        let mut entry = JobHistoryEntry::new(start_time_epoch_ms, local_evaluated.clone());
        {
            let clients = self.clients.read();
            for (host, cfg) in &clients.enabled_clients {
                let pid = clients.connections.get(host).map(|c| c.snapshot().client_pid).unwrap_or(0);
                let mut job_status = JobStatus::not_started(job_id);
                for addon in &cfg.enabled_addons {
                    job_status.addon_statuses.insert(addon.clone(), AddonJobStatus::not_started(addon.clone()));
                }
                entry.client_statuses.insert(
                    host.clone(),
                    ClientJobStatus { client_pid: pid, job_status, info_last_command_response: UploadStatus::default() },
                );
            }
        }
        self.job_history.append(entry);

        self.ensure_connections_active();

        let clients = self.clients.read();
        let built_in_enabled = self.built_in_recorder_enabled.load(Ordering::Acquire);
        for (host, conn) in clients.connections.iter() {
            if !clients.enabled_clients.contains_key(host) {
                continue;
            }
            let is_local = *host == self.local_host && built_in_enabled;
            let cfg = if is_local { local_evaluated.clone() } else { host_evaluated.clone() };
            conn.set_command(&make_command(cfg));
        }

        tracing::info!(job_id, meas_name = %local_evaluated.meas_name, "job dispatched");
        job_id
    }

    pub fn start_recording(&self) -> Result<i64> {
        if self.is_recording() {
            return Err(ErrorKind::CurrentlyRecording(None));
        }
        let job_id = self.begin_job(RecorderCommand::StartRecording);
        self.bound_to_record_bus.store(true, Ordering::Release);
        self.recording.store(true, Ordering::Release);
        *self.currently_recording_job_id.write() = Some(job_id);
        Ok(job_id)
    }

    pub fn save_pre_buffer(&self) -> Result<i64> {
        if !self.is_bound_to_record_bus() {
            return Err(ErrorKind::NotInitialized(Some("not connected to the record bus".to_string())));
        }
        let pre_buffering_enabled = self.complete_settings.read().pre_buffering_enabled.unwrap_or(false);
        if !pre_buffering_enabled {
            return Err(ErrorKind::ActionSuperfluous(Some("pre-buffering is disabled".to_string())));
        }
        Ok(self.begin_job(RecorderCommand::SavePreBuffer))
    }

    pub fn stop_recording(&self) -> Result<()> {
        if !self.is_recording() {
            return Err(ErrorKind::NotInitialized(Some("not recording".to_string())));
        }
        self.broadcast_to_enabled(&RecorderCommand::StopRecording);
        self.recording.store(false, Ordering::Release);
        *self.currently_recording_job_id.write() = None;
        Ok(())
    }

    // ---- upload (spec §4.4.4) -------------------------------------------

    pub fn upload_measurement(&self, meas_id: i64) -> Result<Vec<ClientIdentity>> {
        let entry = self.job_history.find(meas_id).ok_or(ErrorKind::MeasIdNotFound(Some(meas_id.to_string())))?;
        let upload_config = self
            .upload_config
            .read()
            .clone()
            .ok_or_else(|| ErrorKind::ParameterError(Some("no upload destination configured".to_string())))?;
        let protocol = upload_config.protocol();

        if protocol == UploadProtocol::InternalFtp && oracle::internal_ftp_is_superfluous(&entry, &self.local_host) {
            return Err(ErrorKind::ActionSuperfluous(Some(
                "only the local host participated in this measurement".to_string(),
            )));
        }
        let verdict = oracle::simulate_upload(&entry, protocol, &upload_config.host);
        if !verdict.is_ok() {
            return Err(verdict);
        }

        let clients_to_upload = oracle::clients_needing_upload(&entry, protocol, &self.local_host);
        let metadata_uploader = oracle::choose_metadata_uploader(&entry, &self.local_host);

        let clients = self.clients.read();
        for host in &clients_to_upload {
            let Some(conn) = clients.connections.get(host) else { continue };
            let upload_metadata_files = metadata_uploader.as_ref() == Some(host);

            let per_client_config = match protocol {
                UploadProtocol::InternalFtp => {
                    self.build_internal_ftp_config(&entry, meas_id, &upload_config)?
                }
                UploadProtocol::ExternalFtp => {
                    let mut cfg = upload_config.clone();
                    cfg.root_path = upload_config.external_upload_path(&entry.local_evaluated_job_config.meas_name);
                    cfg
                }
            };

            conn.set_command(&RecorderCommand::UploadMeasurement {
                meas_id,
                config: per_client_config,
                upload_metadata_files,
            });
        }
        drop(clients);

        self.job_history.mutate(meas_id, |e| {
            e.is_uploaded = true;
            e.upload_config_used = Some(upload_config.clone());
        });

        tracing::info!(job_id = meas_id, clients = clients_to_upload.len(), "upload dispatched");
        Ok(clients_to_upload.into_iter().collect())
    }

    fn build_internal_ftp_config(&self, entry: &JobHistoryEntry, meas_id: i64, base: &UploadConfig) -> Result<UploadConfig> {
        if entry.local_evaluated_job_config.meas_root_dir.is_empty()
            || entry.local_evaluated_job_config.meas_name.is_empty()
        {
            return Err(ErrorKind::ParameterError(Some("measurement path is empty".to_string())));
        }

        let home_dir = Path::new(&entry.local_evaluated_job_config.meas_root_dir)
            .join(&entry.local_evaluated_job_config.meas_name);
        if !home_dir.exists() {
            std::fs::create_dir_all(&home_dir)
                .map_err(|e| ErrorKind::ResourceUnavailable(Some(format!("mkdir {home_dir:?}: {e}"))))?;
        }

        let credential = meas_id.to_string();
        self.ftp_user_manager
            .add_user(&credential, &credential, &home_dir, FtpPermissions::upload_user())
            .map_err(|e| ErrorKind::ResourceUnavailable(Some(e.to_string())))?;

        Ok(UploadConfig {
            protocol: UploadProtocol::InternalFtp.into(),
            host: base.host.clone(),
            port: base.port,
            username: credential.clone(),
            password: credential,
            root_path: home_dir.to_string_lossy().into_owned(),
            delete_after_upload: base.delete_after_upload,
        })
    }

    pub fn upload_non_uploaded(&self) -> usize {
        let Some(upload_config) = self.upload_config.read().clone() else { return 0 };
        let protocol = upload_config.protocol();
        let entries = self.job_history.snapshot();

        let mut attempted = 0;
        for entry in entries {
            if oracle::can_upload(&entry, protocol, &upload_config.host, &self.local_host)
                && self.upload_measurement(entry.job_id()).is_ok()
            {
                attempted += 1;
            }
        }
        attempted
    }

    // ---- comment / delete (spec §4.4.5) ---------------------------------

    fn local_current_pid(&self) -> Option<u32> {
        let clients = self.clients.read();
        let conn = clients.connections.get(&self.local_host)?;
        conn.is_alive().then(|| conn.snapshot().client_pid)
    }

    pub fn add_comment(&self, meas_id: i64, text: &str) -> Result<()> {
        let entry = self.job_history.find(meas_id).ok_or(ErrorKind::MeasIdNotFound(Some(meas_id.to_string())))?;
        let verdict = oracle::simulate_add_comment(&entry, &self.local_host, self.local_current_pid());
        if !verdict.is_ok() {
            return Err(verdict);
        }

        let stamp = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(self.clock.epoch_ms() as i64)
            .unwrap_or_default()
            .format("%Y-%m-%d, %H:%M");
        let annotated = format!("[{stamp}] {text}");

        let clients = self.clients.read();
        for (host, status) in &entry.client_statuses {
            if status.job_status.is_deleted {
                continue;
            }
            if let Some(conn) = clients.connections.get(host) {
                conn.set_command(&RecorderCommand::AddComment { meas_id, text: annotated.clone() });
            }
        }
        Ok(())
    }

    pub fn delete_measurement(&self, meas_id: i64) -> Result<()> {
        let entry = self.job_history.find(meas_id).ok_or(ErrorKind::MeasIdNotFound(Some(meas_id.to_string())))?;
        let verdict = oracle::simulate_delete(&entry);
        if !verdict.is_ok() {
            return Err(verdict);
        }

        self.job_history.mutate(meas_id, |e| e.is_deleted = true);

        let clients = self.clients.read();
        for (host, status) in &entry.client_statuses {
            if status.job_status.is_deleted {
                continue;
            }
            if let Some(conn) = clients.connections.get(host) {
                conn.set_command(&RecorderCommand::DeleteMeasurement { meas_id });
            }
        }
        Ok(())
    }

    // ---- status (spec §4.4.6) -------------------------------------------

    pub fn status(&self) -> CoordinatorStatus {
        let upload_config = self.upload_config.read().clone();
        let local_pid = self.local_current_pid();
        let entries = self.job_history.snapshot();

        let history = entries
            .iter()
            .map(|entry| {
                let can_upload = upload_config
                    .as_ref()
                    .map(|cfg| oracle::can_upload(entry, cfg.protocol(), &cfg.host, &self.local_host))
                    .unwrap_or(false);
                JobHistorySummary {
                    job_id: entry.job_id(),
                    meas_name: entry.local_evaluated_job_config.meas_name.clone(),
                    is_uploaded: entry.is_uploaded,
                    is_deleted: entry.is_deleted,
                    can_upload,
                    can_comment: oracle::can_comment(entry, &self.local_host, local_pid),
                    client_hosts: entry.client_statuses.keys().map(|h| h.host().to_string()).collect(),
                }
            })
            .collect();

        let loaded = self.loaded_config.read().clone();
        let client_statuses =
            self.clients.read().connections.iter().map(|(host, conn)| (host.clone(), conn.snapshot())).collect();

        CoordinatorStatus {
            config_path: loaded.as_ref().map(|(p, _)| p.clone()),
            config_version: loaded.as_ref().map(|(_, v)| *v),
            bound_to_record_bus: self.is_bound_to_record_bus(),
            recording: self.is_recording(),
            currently_recording_job_id: self.currently_recording_job_id(),
            history,
            client_statuses,
        }
    }

    // ---- persisted config (spec §6) -------------------------------------

    pub fn load_config(&self, path: &Path) -> Result<()> {
        let (persisted, version) = rc_storage::load_config(path)?;

        *self.job_config_template.write() = JobConfig {
            job_id: 0,
            meas_root_dir: persisted.root_directory.clone(),
            meas_name: persisted.measurement_name.clone(),
            description: persisted.description.clone(),
            max_file_size_mib: persisted.max_file_size_mib,
            one_file_per_topic: false,
        };
        self.built_in_recorder_enabled.store(persisted.built_in_recorder_enabled, Ordering::Release);
        if let Some(cfg) = persisted.upload_config()? {
            *self.upload_config.write() = Some(cfg);
        }
        {
            let mut settings = self.complete_settings.write();
            settings.pre_buffering_enabled = Some(persisted.pre_buffer_enabled);
            settings.max_pre_buffer_length = Some(Duration::from_secs_f64(persisted.pre_buffer_length_secs));
            settings.record_mode = Some(persisted.record_mode());
            settings.listed_topics = Some(persisted.topic_list.topic.iter().cloned().collect());
        }

        let enabled = persisted
            .enabled_clients()
            .into_iter()
            .map(|(host, cfg)| (ClientIdentity::new(host), cfg))
            .collect();
        self.set_enabled_clients(enabled)?;

        *self.loaded_config.write() = Some((path.to_path_buf(), version));
        tracing::info!(path = %path.display(), version, "loaded config");
        Ok(())
    }

    pub fn save_config(&self, path: &Path) -> Result<()> {
        let template = self.job_config_template.read().clone();
        let settings = self.complete_settings.read().clone();
        let enabled = self.clients.read().enabled_clients.clone();
        let upload = self.upload_config.read().clone();

        let persisted = rc_storage::config::PersistedConfig {
            root_directory: template.meas_root_dir,
            measurement_name: template.meas_name,
            max_file_size_mib: template.max_file_size_mib,
            description: template.description,
            recorders: rc_storage::config::RecordersXml {
                client: enabled
                    .into_iter()
                    .map(|(host, cfg)| rc_storage::config::PersistedEnabledClient {
                        name: host.host().to_string(),
                        host_filter: rc_storage::config::HostFilterXml { host: cfg.host_filter.into_iter().collect() },
                        enabled_addons: rc_storage::config::EnabledAddonsXml {
                            addon: cfg.enabled_addons.into_iter().collect(),
                        },
                    })
                    .collect(),
            },
            pre_buffer_enabled: settings.pre_buffering_enabled.unwrap_or(false),
            pre_buffer_length_secs: settings.max_pre_buffer_length.map(|d| d.as_secs_f64()).unwrap_or(0.0),
            built_in_recorder_enabled: self.built_in_recorder_enabled.load(Ordering::Acquire),
            topic_list: rc_storage::config::TopicListXml {
                record_mode: settings.record_mode.unwrap_or(RecordMode::All).to_string(),
                topic: settings.listed_topics.unwrap_or_default().into_iter().collect(),
            },
            upload_config: upload.as_ref().map(rc_storage::config::PersistedUploadConfig::from),
        };

        rc_storage::save_config(path, &persisted)?;
        *self.loaded_config.write() = Some((path.to_path_buf(), rc_storage::config::NATIVE_CONFIG_VERSION));
        Ok(())
    }
}

fn scoping_diff(cfg: &ClientConfig) -> RecorderSettings {
    RecorderSettings {
        host_filter: Some(cfg.host_filter.clone()),
        enabled_addons: Some(cfg.enabled_addons.clone()),
        ..RecorderSettings::default()
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
