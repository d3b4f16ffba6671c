//! Store selection: the closed set of approval store implementations.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use approvals::{
    ApprovalError, ApprovalId, ApprovalRecord, ApprovalStatus, ApprovalStore, StoreSelector,
};

use crate::{FileApprovalStore, InMemoryApprovalStore};

/// One of the supported approval store implementations.
///
/// Built once at start-up by [`ApprovalStoreBackend::open`] and then injected
/// into the service and the gate, usually as an `Arc<dyn ApprovalStore>`.
#[derive(Debug)]
pub enum ApprovalStoreBackend {
    File(FileApprovalStore),
    InMemory(InMemoryApprovalStore),
}

impl ApprovalStoreBackend {
    /// Constructs the store named by `selector`.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::Configuration`] if the file backend is given an empty path.
    pub fn open(selector: &StoreSelector) -> Result<Self, ApprovalError> {
        let backend = match selector {
            StoreSelector::File { path } => {
                if path.as_os_str().is_empty() {
                    return Err(ApprovalError::Configuration {
                        message: "file approval store requires a snapshot path".to_string(),
                    });
                }
                ApprovalStoreBackend::File(FileApprovalStore::new(path.clone()))
            }
            StoreSelector::InMemory => ApprovalStoreBackend::InMemory(InMemoryApprovalStore::new()),
        };
        info!(backend = %backend.describe(), "approval store selected");
        Ok(backend)
    }

    /// Short human-readable description for logs (`file:<path>` or `memory`).
    pub fn describe(&self) -> String {
        match self {
            ApprovalStoreBackend::File(store) => format!("file:{}", store.path().display()),
            ApprovalStoreBackend::InMemory(_) => "memory".to_string(),
        }
    }

    /// Wraps the backend for sharing between the service and any number of gates.
    pub fn into_shared(self) -> Arc<dyn ApprovalStore> {
        Arc::new(self)
    }
}

#[async_trait]
impl ApprovalStore for ApprovalStoreBackend {
    async fn add(&self, record: ApprovalRecord) -> Result<(), ApprovalError> {
        match self {
            ApprovalStoreBackend::File(s) => s.add(record).await,
            ApprovalStoreBackend::InMemory(s) => s.add(record).await,
        }
    }

    async fn get(&self, id: ApprovalId) -> Result<Option<ApprovalRecord>, ApprovalError> {
        match self {
            ApprovalStoreBackend::File(s) => s.get(id).await,
            ApprovalStoreBackend::InMemory(s) => s.get(id).await,
        }
    }

    async fn list(&self) -> Result<Vec<ApprovalRecord>, ApprovalError> {
        match self {
            ApprovalStoreBackend::File(s) => s.list().await,
            ApprovalStoreBackend::InMemory(s) => s.list().await,
        }
    }

    async fn update(&self, record: ApprovalRecord) -> Result<(), ApprovalError> {
        match self {
            ApprovalStoreBackend::File(s) => s.update(record).await,
            ApprovalStoreBackend::InMemory(s) => s.update(record).await,
        }
    }

    async fn transition(
        &self,
        id: ApprovalId,
        status: ApprovalStatus,
    ) -> Result<ApprovalRecord, ApprovalError> {
        match self {
            ApprovalStoreBackend::File(s) => s.transition(id, status).await,
            ApprovalStoreBackend::InMemory(s) => s.transition(id, status).await,
        }
    }

    async fn delete(&self, id: ApprovalId) -> Result<(), ApprovalError> {
        match self {
            ApprovalStoreBackend::File(s) => s.delete(id).await,
            ApprovalStoreBackend::InMemory(s) => s.delete(id).await,
        }
    }
}
