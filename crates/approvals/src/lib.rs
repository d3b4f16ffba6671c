//! Core domain for release approvals.
//!
//! This crate contains every domain concept used by the human-in-the-loop
//! approval gate: the approval record and its status, newtype identifiers, the
//! gate configuration, the error taxonomy, and the [`ApprovalStore`] port.
//! Infrastructure crates implement the port; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; the `store` crate defines *how* records are kept
//! and the `gate` crate defines how callers wait on them.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ApprovalId`, `OperationName`) |
//! | [`types`] | Shared value types (`ApprovalStatus`, `CallArguments`, `Timestamp`) |
//! | [`record`] | `ApprovalRecord` |
//! | [`config`] | `GateConfig`, `StoreSelector` |
//! | [`errors`] | `ApprovalError`, `RejectionReason` |
//! | [`store`] | The `ApprovalStore` trait |

pub mod config;
pub mod errors;
pub mod identifiers;
pub mod record;
pub mod store;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::{
    GateConfig, StoreSelector, DEFAULT_POLL_INTERVAL, DEFAULT_SNAPSHOT_PATH, DEFAULT_TIMEOUT,
};
pub use errors::{ApprovalError, RejectionReason};
pub use identifiers::{ApprovalId, OperationName};
pub use record::ApprovalRecord;
pub use store::ApprovalStore;
pub use types::{ApprovalStatus, CallArguments, Timestamp};
