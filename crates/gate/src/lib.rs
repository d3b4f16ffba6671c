//! Human-in-the-loop approval gate for release operations.
//!
//! This crate provides the two things that sit on either side of an approval
//! request:
//!
//! - [`ApprovalGate`]: wraps any gated operation (a release branch, a tag push,
//!   a CI trigger) so that invoking it creates a pending approval request and
//!   suspends the caller until an operator approves, rejects, or the approval
//!   window elapses.
//! - [`ApprovalService`]: the operator side: list, inspect, approve, reject,
//!   delete, and prune requests.
//!
//! The two never talk to each other directly. The shared
//! [`approvals::ApprovalStore`] is their only channel.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Sequences calls between the domain types in
//! [`approvals`] and whatever store implementation is injected. Contains no
//! persistence logic of its own.

mod gate;
mod service;

pub use gate::{ApprovalGate, GatedOperation};
pub use service::{ApprovalService, PRUNE_GRACE};
