// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rc` — the operator CLI for the recording coordinator daemon (`rcd`).
//! Thin dispatcher: parse a subcommand, translate it to a control-channel
//! `Query`, send it, print the `Response`. Grounded on the teacher's
//! `crates/cli` command-module convention.

mod client;
mod commands;
mod env;
mod output;

use clap::Parser;
use client::DaemonClient;
use commands::Command;

#[derive(Parser)]
#[command(name = "rc", about = "Operator CLI for the recording coordinator daemon")]
struct Cli {
    /// Path to the daemon's control socket. Defaults to the same
    /// `RC_STATE_DIR`/`XDG_STATE_HOME`/`~/.local/state/rc` resolution `rcd` uses.
    #[arg(long, global = true)]
    socket: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let socket_path = env::socket_path(cli.socket)?;
    let client = DaemonClient::new(socket_path);
    let json = cli.command.wants_json();
    let query = cli.command.into_query()?;
    let response = client.send(query).await?;
    output::print(&response, json)
}
