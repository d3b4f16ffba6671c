//! Operator-facing approval actions.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use approvals::{ApprovalError, ApprovalId, ApprovalRecord, ApprovalStatus, ApprovalStore, Timestamp};

/// How long past `expires_at` a request is kept before [`ApprovalService::prune_expired`]
/// may remove it.
///
/// A live gate measures its window from after the record was stored, on a
/// monotonic clock, so its own cleanup lands slightly after `expires_at`.
/// Pruning inside that overlap would turn the gate's timeout into a withdrawn
/// rejection.
pub const PRUNE_GRACE: Duration = Duration::from_secs(30);

/// Management surface over an [`ApprovalStore`].
///
/// Used by operators (CLI, review tooling) to inspect and decide approval
/// requests. The gate never calls this; it talks to the store directly.
#[derive(Clone)]
pub struct ApprovalService {
    store: Arc<dyn ApprovalStore>,
}

impl ApprovalService {
    pub fn new(store: Arc<dyn ApprovalStore>) -> Self {
        Self { store }
    }

    /// Marks a pending request as approved and returns the updated record.
    ///
    /// # Errors
    ///
    /// - [`ApprovalError::NotFound`] if there is no such request.
    /// - [`ApprovalError::AlreadyResolved`] if it is not pending, including when
    ///   a concurrent decision got there first.
    pub async fn approve(&self, id: ApprovalId) -> Result<ApprovalRecord, ApprovalError> {
        self.decide(id, ApprovalStatus::Approved).await
    }

    /// Marks a pending request as rejected and returns the updated record.
    ///
    /// # Errors
    ///
    /// Same as [`approve`](Self::approve).
    pub async fn reject(&self, id: ApprovalId) -> Result<ApprovalRecord, ApprovalError> {
        self.decide(id, ApprovalStatus::Rejected).await
    }

    async fn decide(
        &self,
        id: ApprovalId,
        status: ApprovalStatus,
    ) -> Result<ApprovalRecord, ApprovalError> {
        let record = self.store.transition(id, status).await?;
        info!(
            approval_id = %id,
            operation = %record.operation_name(),
            %status,
            "approval request decided"
        );
        Ok(record)
    }

    /// Removes a request. Idempotent: deleting an unknown id succeeds.
    ///
    /// A gate still waiting on the request fails with a withdrawn rejection.
    pub async fn delete(&self, id: ApprovalId) -> Result<(), ApprovalError> {
        self.store.delete(id).await?;
        info!(approval_id = %id, "approval request deleted");
        Ok(())
    }

    /// Every live request, soonest-expiring first.
    pub async fn list(&self) -> Result<Vec<ApprovalRecord>, ApprovalError> {
        self.store.list().await
    }

    /// One request by id.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::NotFound`] if there is no such request.
    pub async fn get(&self, id: ApprovalId) -> Result<ApprovalRecord, ApprovalError> {
        self.store
            .get(id)
            .await?
            .ok_or(ApprovalError::NotFound { id })
    }

    /// Deletes every request whose approval window ended at least
    /// [`PRUNE_GRACE`] before `now`.
    ///
    /// Normally the waiting gate removes its own record on timeout; leftovers
    /// only exist when a gated process died while waiting. Returns how many
    /// records were removed.
    pub async fn prune_expired(&self, now: Timestamp) -> Result<usize, ApprovalError> {
        let expired: Vec<ApprovalId> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|r| {
                r.expires_at()
                    .checked_add(PRUNE_GRACE)
                    .is_some_and(|deadline| now >= deadline)
            })
            .map(|r| r.id())
            .collect();

        for id in &expired {
            self.store.delete(*id).await?;
        }
        if !expired.is_empty() {
            info!(count = expired.len(), "pruned expired approval requests");
        }
        Ok(expired.len())
    }
}
