// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rcd` — the recording coordinator daemon. Process wiring: logging,
//! a lock file guarding a single instance per state directory, the
//! Monitoring Loop (C2), the Coordinator (C4), and the control-IPC
//! listener the CLI talks to. Grounded on the teacher's
//! `crates/daemon/src/lifecycle/startup.rs` sequencing (lock file before
//! anything else; directories created up front; logging initialised
//! early) with this spec's own components substituted for the teacher's
//! WAL/snapshot engine.

mod adapters;
mod env;
mod listener;

use std::collections::BTreeSet;
use std::sync::Arc;

use clap::Parser;
use fs2::FileExt;
use rc_core::{ClientIdentity, SystemClock};
use rc_coordinator::Coordinator;
use rc_monitor::MonitoringLoop;
use tokio::net::UnixListener;
use tokio::sync::Notify;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Recorder-client middleware unit name the monitor matches against
/// (spec §4.2 step 2). Configurable so a demo deployment can point the
/// fake monitoring source at whatever unit name it is faking.
const DEFAULT_RECORDER_CLIENT_UNIT_NAME: &str = "rc-recorder-client";

#[derive(Parser, Debug)]
#[command(name = "rcd", about = "Multi-host recording coordinator daemon")]
struct Cli {
    /// Hostname this daemon runs on — identifies the "local" connection
    /// (spec §4.4: the built-in recorder, the metadata-uploader tiebreak).
    #[arg(long)]
    host: Option<String>,

    /// Directory for the control socket, lock file, and log file.
    #[arg(long)]
    state_dir: Option<std::path::PathBuf>,

    /// Disable the built-in (local, in-process) recorder entirely.
    #[arg(long)]
    no_built_in_recorder: bool,

    /// Load a persisted XML config (spec §6) at startup.
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let state_dir = match &cli.state_dir {
        Some(dir) => dir.clone(),
        None => env::state_dir()?,
    };
    std::fs::create_dir_all(&state_dir)?;

    let _guard = init_logging(&state_dir)?;
    let _lock = acquire_lock(&env::lock_path(&state_dir))?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cli, state_dir))
}

/// Holds the lock file open for the process lifetime; the exclusive lock
/// is released when this is dropped.
struct LockGuard(#[allow(dead_code)] std::fs::File);

fn acquire_lock(path: &std::path::Path) -> anyhow::Result<LockGuard> {
    let file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(path)?;
    file.try_lock_exclusive().map_err(|e| anyhow::anyhow!("another rcd instance is already running: {e}"))?;
    use std::io::Write;
    file.set_len(0)?;
    let mut file = file;
    writeln!(file, "{}", std::process::id())?;
    Ok(LockGuard(file))
}

const LOG_FILE_NAME: &str = "rc.log";

fn init_logging(state_dir: &std::path::Path) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let file_appender = tracing_appender::rolling::never(state_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    Ok(guard)
}

async fn run(cli: Cli, state_dir: std::path::PathBuf) -> anyhow::Result<()> {
    let local_host = ClientIdentity::new(cli.host.unwrap_or_else(hostname));
    info!(host = %local_host, state_dir = %state_dir.display(), "starting recording coordinator");

    let fakes = adapters::Adapters::demo();
    let coordinator = Arc::new(Coordinator::new(
        local_host,
        fakes.discovery,
        fakes.transport,
        fakes.embedded_recorder,
        fakes.ftp_user_manager,
        fakes.template_evaluator,
        SystemClock,
    ));

    if cli.no_built_in_recorder {
        coordinator.set_built_in_recorder_enabled(false).ok();
    }
    if let Some(path) = &cli.config {
        if let Err(e) = coordinator.load_config(path) {
            warn!(error = %e, path = %path.display(), "failed to load config at startup");
        }
    }

    let monitor = Arc::new(MonitoringLoop::new(
        fakes.monitoring_source,
        BTreeSet::from([DEFAULT_RECORDER_CLIENT_UNIT_NAME.to_string()]),
        {
            let coordinator = coordinator.clone();
            move || coordinator.running_enabled_clients()
        },
    ));
    monitor.add_post_update_hook(Box::new({
        let coordinator = coordinator.clone();
        move |hosts| coordinator.update_connections(hosts)
    }));
    monitor.start();

    let socket_path = env::socket_path(&state_dir);
    let _ = std::fs::remove_file(&socket_path);
    let socket = UnixListener::bind(&socket_path)?;
    info!(socket = %socket_path.display(), "listening for control connections");

    let shutdown = Arc::new(Notify::new());
    let listener = listener::Listener::new(socket, coordinator.clone(), shutdown.clone());

    let listener_task = tokio::spawn(listener.run());
    wait_for_shutdown_signal(&shutdown).await?;

    monitor.shutdown();
    listener_task.abort();
    let _ = std::fs::remove_file(&socket_path);
    info!("recording coordinator stopped");
    Ok(())
}

async fn wait_for_shutdown_signal(shutdown: &Notify) -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut term = signal(SignalKind::terminate())?;
    let mut int = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = term.recv() => info!("received SIGTERM"),
        _ = int.recv() => info!("received SIGINT"),
        _ = shutdown.notified() => info!("shutdown requested over control channel"),
    }
    Ok(())
}

fn hostname() -> String {
    std::fs::read_to_string("/proc/sys/kernel/hostname")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| "localhost".to_string())
}
