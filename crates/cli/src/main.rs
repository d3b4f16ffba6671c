//! release-gate CLI entry point.
//!
//! This binary is the composition root for the workspace. Responsibilities:
//!
//! 1. **Load configuration** from `RELEASE_GATE_*` environment variables (and
//!    an optional `.env` file), then apply `--store-path`.
//! 2. **Wire observability**: `tracing-subscriber` with a plain or JSON layer
//!    on stderr, plus an OpenTelemetry OTLP exporter when
//!    `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
//! 3. **Construct infrastructure**: open the configured approval store and
//!    inject it into [`gate::ApprovalService`] and [`gate::ApprovalGate`].
//! 4. **Dispatch** the operator command. `exec` blocks behind the gate and
//!    exits with the wrapped command's exit code.

mod cli;
mod commands;
mod config;
mod telemetry;

use std::sync::Arc;

use clap::Parser;
use tracing::{debug, warn};

use approvals::StoreSelector;
use gate::{ApprovalGate, ApprovalService};
use store::ApprovalStoreBackend;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load()?.with_store_path(cli.store_path);
    let telemetry = telemetry::init(config.log_format)?;

    let result = run(cli.command, config).await;
    telemetry.shutdown();

    let code = result?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

async fn run(command: Commands, config: config::Config) -> anyhow::Result<i32> {
    let backend = ApprovalStoreBackend::open(&config.store)?;
    debug!(store = %backend.describe(), "approval store opened");

    let store = backend.into_shared();
    let service = ApprovalService::new(Arc::clone(&store));

    match command {
        Commands::List { json } => commands::list(&service, json).await?,
        Commands::Get { id } => commands::get(&service, id).await?,
        Commands::Approve { id } => commands::approve(&service, id).await?,
        Commands::Reject { id } => commands::reject(&service, id).await?,
        Commands::Delete { id } => commands::delete(&service, id).await?,
        Commands::Prune => commands::prune(&service).await?,
        Commands::Exec { name, command } => {
            if matches!(config.store, StoreSelector::InMemory) && config.gate.enabled {
                warn!("in-memory store selected; no other process can approve this request");
            }
            let gate = ApprovalGate::new(store, config.gate)?;
            let status = commands::exec(&gate, &name, command).await?;
            return Ok(status.code().unwrap_or(1));
        }
    }
    Ok(0)
}
