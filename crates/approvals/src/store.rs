//! The approval store port.
//!
//! The gate and the management service both talk to approvals exclusively
//! through [`ApprovalStore`]; the store is the only state they share. Concrete
//! implementations live in the `store` crate.

use async_trait::async_trait;

use crate::{ApprovalError, ApprovalId, ApprovalRecord, ApprovalStatus};

/// Durable, concurrency-safe collection of [`ApprovalRecord`]s.
///
/// Every method must be safe to call concurrently from many tasks. Mutations are
/// whole-record: there are no partial-field updates.
#[async_trait]
pub trait ApprovalStore: Send + Sync {
    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// - [`ApprovalError::DuplicateId`] if a record with the same id exists
    ///   (a programmer error; the store is left unchanged).
    /// - [`ApprovalError::StoreIo`] if the record could not be persisted.
    async fn add(&self, record: ApprovalRecord) -> Result<(), ApprovalError>;

    /// Returns the current record for `id`, or `None` if there is none.
    async fn get(&self, id: ApprovalId) -> Result<Option<ApprovalRecord>, ApprovalError>;

    /// Returns every live record, soonest-expiring first.
    async fn list(&self) -> Result<Vec<ApprovalRecord>, ApprovalError>;

    /// Replaces the stored record that has the same id as `record`.
    ///
    /// # Errors
    ///
    /// - [`ApprovalError::NotFound`] if no such record exists. An update never
    ///   re-creates a record that was deleted concurrently.
    /// - [`ApprovalError::StoreIo`] if the change could not be persisted.
    async fn update(&self, record: ApprovalRecord) -> Result<(), ApprovalError>;

    /// Atomically moves a `pending` record to `status` (`approved` or
    /// `rejected`) and returns the updated record.
    ///
    /// The status check and the write happen in one critical section, so of two
    /// racing decisions on the same id exactly one succeeds.
    ///
    /// # Errors
    ///
    /// - [`ApprovalError::NotFound`] if no such record exists.
    /// - [`ApprovalError::AlreadyResolved`] if the record is no longer pending.
    /// - [`ApprovalError::StoreIo`] if the change could not be persisted.
    async fn transition(
        &self,
        id: ApprovalId,
        status: ApprovalStatus,
    ) -> Result<ApprovalRecord, ApprovalError>;

    /// Removes the record for `id`. Removing an absent id is a no-op.
    async fn delete(&self, id: ApprovalId) -> Result<(), ApprovalError>;
}
