//! Approval store infrastructure.
//!
//! Implements the [`approvals::ApprovalStore`] port twice:
//!
//! - [`FileApprovalStore`]: JSON snapshot on local disk, cached in memory,
//!   rewritten atomically on every mutation. The production backend.
//! - [`InMemoryApprovalStore`]: process-local map. Used by tests and
//!   short-lived single-process runs.
//!
//! [`ApprovalStoreBackend`] is the closed set of both, selected once from an
//! [`approvals::StoreSelector`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** File layout, serialisation, and locking live here. The
//! `gate` crate sees only [`approvals::ApprovalStore`].

mod backend;
mod file;
mod memory;
mod records;

pub use backend::ApprovalStoreBackend;
pub use file::FileApprovalStore;
pub use memory::InMemoryApprovalStore;
