//! The approval record: one pending or decided request to run a gated operation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ApprovalError, ApprovalId, ApprovalStatus, CallArguments, OperationName, Timestamp};

/// One approval request.
///
/// Created by the gate when a gated operation is invoked, decided by an operator
/// through the management surface, and deleted by the gate once it observes the
/// outcome. Records are ephemeral; no history is kept.
///
/// Every field except [`status`](Self::status) is fixed at creation, including
/// [`expires_at`](Self::expires_at). Two records are equal when their ids are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRecord {
    id: ApprovalId,
    operation_name: OperationName,
    arguments: CallArguments,
    status: ApprovalStatus,
    created_at: Timestamp,
    expires_at: Timestamp,
}

impl ApprovalRecord {
    /// Creates a fresh `pending` record with a random id whose approval window
    /// ends at `created_at + timeout`.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::Configuration`] if `created_at + timeout` overflows the
    /// representable time range.
    pub fn pending(
        operation_name: OperationName,
        arguments: CallArguments,
        created_at: Timestamp,
        timeout: Duration,
    ) -> Result<Self, ApprovalError> {
        let expires_at = created_at.checked_add(timeout).ok_or_else(|| {
            ApprovalError::Configuration {
                message: format!("approval timeout {timeout:?} is out of range"),
            }
        })?;

        Ok(Self {
            id: ApprovalId::new_random(),
            operation_name,
            arguments,
            status: ApprovalStatus::Pending,
            created_at,
            expires_at,
        })
    }

    pub fn id(&self) -> ApprovalId {
        self.id
    }

    pub fn operation_name(&self) -> &OperationName {
        &self.operation_name
    }

    pub fn arguments(&self) -> &CallArguments {
        &self.arguments
    }

    pub fn status(&self) -> ApprovalStatus {
        self.status
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// Replaces the status. This is the only mutable field.
    pub fn set_status(&mut self, status: ApprovalStatus) {
        self.status = status;
    }

    /// Returns `true` once `now` has reached the end of the approval window.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

impl PartialEq for ApprovalRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ApprovalRecord {}
