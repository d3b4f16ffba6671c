//! Runtime configuration from environment variables (and an optional `.env`).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};

use approvals::{GateConfig, StoreSelector, DEFAULT_SNAPSHOT_PATH};

/// Output format of the log layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Plain,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub gate: GateConfig,
    pub store: StoreSelector,
    pub log_format: LogFormat,
}

impl Config {
    /// Replaces the snapshot path if the file backend is selected.
    pub fn with_store_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            if matches!(self.store, StoreSelector::File { .. }) {
                self.store = StoreSelector::File { path };
            }
        }
        self
    }
}

/// Loads `.env` (if present) and reads the process environment.
pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    load_from(|key| std::env::var(key).ok())
}

/// Builds the configuration from an arbitrary variable lookup.
///
/// | Variable | Default |
/// |----------|---------|
/// | `RELEASE_GATE_ENABLED` | `true` |
/// | `RELEASE_GATE_TIMEOUT_SECONDS` | `120` |
/// | `RELEASE_GATE_POLL_INTERVAL_MS` | `1000` |
/// | `RELEASE_GATE_STORE_BACKEND` | `file` |
/// | `RELEASE_GATE_STORE_PATH` | `.release-gate/approvals.json` |
/// | `RELEASE_GATE_LOG_FORMAT` | `plain` |
pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
    let defaults = GateConfig::default();

    let enabled = match lookup("RELEASE_GATE_ENABLED") {
        Some(v) => parse_bool(&v).with_context(|| format!("RELEASE_GATE_ENABLED={v}"))?,
        None => defaults.enabled,
    };
    let timeout = match lookup("RELEASE_GATE_TIMEOUT_SECONDS") {
        Some(v) => Duration::from_secs(
            v.trim()
                .parse()
                .with_context(|| format!("RELEASE_GATE_TIMEOUT_SECONDS={v} is not a whole number"))?,
        ),
        None => defaults.timeout,
    };
    let poll_interval = match lookup("RELEASE_GATE_POLL_INTERVAL_MS") {
        Some(v) => Duration::from_millis(
            v.trim()
                .parse()
                .with_context(|| format!("RELEASE_GATE_POLL_INTERVAL_MS={v} is not a whole number"))?,
        ),
        None => defaults.poll_interval,
    };

    let gate = GateConfig {
        enabled,
        timeout,
        poll_interval,
    };
    gate.validate()?;

    let backend = lookup("RELEASE_GATE_STORE_BACKEND").unwrap_or_else(|| "file".into());
    let path = lookup("RELEASE_GATE_STORE_PATH").unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.into());
    let store = StoreSelector::from_parts(&backend, path)?;

    let log_format = match lookup("RELEASE_GATE_LOG_FORMAT").as_deref().map(str::trim) {
        None | Some("") | Some("plain") => LogFormat::Plain,
        Some("json") => LogFormat::Json,
        Some(other) => bail!("RELEASE_GATE_LOG_FORMAT={other} (expected 'plain' or 'json')"),
    };

    Ok(Config {
        gate,
        store,
        log_format,
    })
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("expected a boolean"),
    }
}
