//! Process-local approval store.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use approvals::{ApprovalError, ApprovalId, ApprovalRecord, ApprovalStatus, ApprovalStore};

use crate::records::RecordSet;

/// [`ApprovalStore`] backed by a map behind a single lock.
///
/// Nothing is persisted; every record is lost when the process exits. Used by
/// tests and by deployments that only gate operations within one short-lived
/// process.
#[derive(Debug, Default)]
pub struct InMemoryApprovalStore {
    records: Mutex<RecordSet>,
}

impl InMemoryApprovalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ApprovalStore for InMemoryApprovalStore {
    async fn add(&self, record: ApprovalRecord) -> Result<(), ApprovalError> {
        let id = record.id();
        self.records.lock().await.insert(record)?;
        debug!(approval_id = %id, "approval record added");
        Ok(())
    }

    async fn get(&self, id: ApprovalId) -> Result<Option<ApprovalRecord>, ApprovalError> {
        Ok(self.records.lock().await.get(id))
    }

    async fn list(&self) -> Result<Vec<ApprovalRecord>, ApprovalError> {
        Ok(self.records.lock().await.sorted())
    }

    async fn update(&self, record: ApprovalRecord) -> Result<(), ApprovalError> {
        let id = record.id();
        let status = record.status();
        self.records.lock().await.replace(record)?;
        debug!(approval_id = %id, %status, "approval record updated");
        Ok(())
    }

    async fn transition(
        &self,
        id: ApprovalId,
        status: ApprovalStatus,
    ) -> Result<ApprovalRecord, ApprovalError> {
        let record = self.records.lock().await.transition(id, status)?;
        debug!(approval_id = %id, %status, "approval record decided");
        Ok(record)
    }

    async fn delete(&self, id: ApprovalId) -> Result<(), ApprovalError> {
        if self.records.lock().await.remove(id) {
            debug!(approval_id = %id, "approval record deleted");
        }
        Ok(())
    }
}
