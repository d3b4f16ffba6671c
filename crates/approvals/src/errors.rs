//! Error type for the approval domain.
//!
//! [`ApprovalError`] covers every failure the gate, the store, and the
//! management service can introduce. Failures of a gated operation itself are
//! *not* represented here: the gate returns them to the caller exactly as the
//! operation produced them.
//!
//! ## Propagation
//!
//! | Variant | Surfaces to |
//! |---------|-------------|
//! | `Timeout`, `Rejected` | the original caller of the gated operation |
//! | `NotFound`, `AlreadyResolved` | callers of the management surface only |
//! | `StoreIo` | whoever touched the store; never swallowed |
//! | `DuplicateId`, `Configuration` | start-up / programmer errors |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ApprovalId, ApprovalStatus, OperationName};

/// Why a gated call was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// An operator explicitly rejected the request.
    Explicit,
    /// The record disappeared from the store while it was still pending
    /// (e.g. an operator deleted it). Treated as an implicit rejection.
    Withdrawn,
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::Explicit => f.write_str("rejected by an operator"),
            RejectionReason::Withdrawn => {
                f.write_str("approval request was deleted while still pending")
            }
        }
    }
}

// ---------------------------------------------------------------------------

/// Errors produced by the approval gate, the approval store, and the approval
/// service.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ApprovalError {
    /// The approval window elapsed without an operator decision.
    ///
    /// The record has been removed from the store by the time this is returned.
    #[error("Operation '{operation}' timed out waiting for approval (approval id {id})")]
    Timeout {
        /// Identifier of the expired approval request.
        id: ApprovalId,
        /// The gated operation that was waiting.
        operation: OperationName,
    },

    /// The request was rejected, or withdrawn while pending.
    #[error("Operation '{operation}' was not approved: {reason} (approval id {id})")]
    Rejected {
        /// Identifier of the rejected approval request.
        id: ApprovalId,
        /// The gated operation that was refused.
        operation: OperationName,
        /// Explicit rejection or disappearance of the record.
        reason: RejectionReason,
    },

    /// A management action referenced an id with no corresponding record.
    #[error("Approval request {id} not found")]
    NotFound {
        /// The unknown identifier.
        id: ApprovalId,
    },

    /// A management action tried to decide a request that already has a
    /// terminal status.
    #[error("Approval request {id} is already {status}")]
    AlreadyResolved {
        /// Identifier of the already-decided request.
        id: ApprovalId,
        /// Its current (terminal) status.
        status: ApprovalStatus,
    },

    /// A record with this id is already stored.
    ///
    /// Indicates a programmer error: the gate always generates fresh random ids.
    #[error("Approval request {id} already exists")]
    DuplicateId {
        /// The conflicting identifier.
        id: ApprovalId,
    },

    /// The underlying persistence failed (snapshot unreadable, unparseable, or
    /// unwritable).
    #[error("Approval store I/O failure while {context}: {message}")]
    StoreIo {
        /// What the store was doing (e.g. `"writing snapshot /var/lib/...json"`).
        context: String,
        /// The underlying error, rendered.
        message: String,
    },

    /// The gate or store configuration is invalid.
    ///
    /// Produced at start-up; a gate never runs with an invalid configuration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl ApprovalError {
    /// Builds a [`ApprovalError::StoreIo`] from any displayable error.
    pub fn store_io(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ApprovalError::StoreIo {
            context: context.into(),
            message: err.to_string(),
        }
    }

    /// Returns the approval id this error refers to, if any.
    pub fn approval_id(&self) -> Option<ApprovalId> {
        match self {
            ApprovalError::Timeout { id, .. }
            | ApprovalError::Rejected { id, .. }
            | ApprovalError::NotFound { id }
            | ApprovalError::AlreadyResolved { id, .. }
            | ApprovalError::DuplicateId { id } => Some(*id),
            ApprovalError::StoreIo { .. } | ApprovalError::Configuration { .. } => None,
        }
    }

    /// Returns `true` for the two failures the gate itself introduces into a
    /// gated call (`Timeout` and `Rejected`).
    pub fn is_gate_refusal(&self) -> bool {
        matches!(
            self,
            ApprovalError::Timeout { .. } | ApprovalError::Rejected { .. }
        )
    }
}
