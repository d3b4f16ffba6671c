//! Configuration consumed by the approval gate and the store factory.
//!
//! These are plain values. Reading them from the environment is the job of the
//! composition root (`cli`); this crate only defines and validates them.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ApprovalError, Timestamp};

/// Default approval window.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default delay between two store polls while a call is pending.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default location of the file-backed snapshot, relative to the working directory.
pub const DEFAULT_SNAPSHOT_PATH: &str = ".release-gate/approvals.json";

// ---------------------------------------------------------------------------
// Gate configuration
// ---------------------------------------------------------------------------

/// Runtime behaviour of the approval gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// When `false`, every gated operation runs immediately and no record is
    /// ever created.
    pub enabled: bool,

    /// Approval window: how long a call may stay pending before it fails with
    /// a timeout.
    pub timeout: Duration,

    /// Fixed delay between two status checks. Independent of `timeout`.
    pub poll_interval: Duration,
}

impl GateConfig {
    /// A configuration with the gate turned off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Checks that the gate can terminate and actually yields while waiting.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::Configuration`] if `timeout` or `poll_interval` is zero,
    /// or if `timeout` is too large to compute an expiry time from.
    pub fn validate(&self) -> Result<(), ApprovalError> {
        if self.timeout.is_zero() {
            return Err(ApprovalError::Configuration {
                message: "approval timeout must be greater than zero".to_string(),
            });
        }
        if Timestamp::now().checked_add(self.timeout).is_none() {
            return Err(ApprovalError::Configuration {
                message: format!("approval timeout {:?} is out of range", self.timeout),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(ApprovalError::Configuration {
                message: "approval poll interval must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

// ---------------------------------------------------------------------------
// Store selection
// ---------------------------------------------------------------------------

/// Which approval store implementation to construct.
///
/// Chosen once at start-up and handed to the store factory; the set is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreSelector {
    /// JSON snapshot on local disk with an in-process cache.
    File {
        /// Snapshot location.
        path: PathBuf,
    },
    /// Process-local map; nothing survives a restart.
    InMemory,
}

impl StoreSelector {
    /// Builds a selector from a backend name (`"file"` or `"memory"`) and the
    /// snapshot path used by the file backend.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::Configuration`] for an unknown backend name.
    pub fn from_parts(backend: &str, path: impl Into<PathBuf>) -> Result<Self, ApprovalError> {
        match backend.parse::<BackendKind>()? {
            BackendKind::File => Ok(StoreSelector::File { path: path.into() }),
            BackendKind::InMemory => Ok(StoreSelector::InMemory),
        }
    }
}

impl Default for StoreSelector {
    fn default() -> Self {
        StoreSelector::File {
            path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackendKind {
    File,
    InMemory,
}

impl FromStr for BackendKind {
    type Err = ApprovalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(BackendKind::File),
            "memory" | "in_memory" | "in-memory" => Ok(BackendKind::InMemory),
            other => Err(ApprovalError::Configuration {
                message: format!("unknown approval store backend '{other}' (expected 'file' or 'memory')"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = GateConfig::default();
        assert!(cfg.enabled);
        assert_eq!(cfg.timeout, Duration::from_secs(120));
        assert_eq!(cfg.poll_interval, Duration::from_secs(1));
        assert!(cfg.validate().is_ok());
        assert!(!GateConfig::disabled().enabled);
    }

    #[test]
    fn zero_durations_are_rejected() {
        let cfg = GateConfig {
            timeout: Duration::ZERO,
            ..GateConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ApprovalError::Configuration { .. })));

        let cfg = GateConfig {
            poll_interval: Duration::ZERO,
            ..GateConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ApprovalError::Configuration { .. })));
    }

    #[test]
    fn unrepresentable_timeout_is_rejected() {
        let cfg = GateConfig {
            timeout: Duration::from_secs(u64::MAX),
            ..GateConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ApprovalError::Configuration { .. })));
    }

    #[test]
    fn selector_from_backend_name() {
        assert_eq!(
            StoreSelector::from_parts("file", "/tmp/a.json").unwrap(),
            StoreSelector::File {
                path: PathBuf::from("/tmp/a.json")
            }
        );
        assert_eq!(
            StoreSelector::from_parts(" Memory ", "ignored").unwrap(),
            StoreSelector::InMemory
        );
        assert!(StoreSelector::from_parts("redis", "x").is_err());
    }
}
