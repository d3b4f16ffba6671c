//! File-backed approval store.
//!
//! The whole collection is kept as one JSON array on disk. The store caches the
//! collection in memory and rewrites the full snapshot on every mutation, always
//! under one lock, so each mutation is a complete "load → mutate → persist"
//! cycle. Cost per mutation grows with the number of outstanding records, which
//! is expected to stay small.
//!
//! ## Snapshot freshness
//!
//! Before every operation the store compares the snapshot's modification time
//! and length with the values it saw last. If they differ (another process, such
//! as the operator CLI, rewrote the file) the cache is reloaded. Writers in
//! different processes are still not mutually excluded: two processes mutating
//! the same snapshot at the same moment can lose one of the writes.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use approvals::{ApprovalError, ApprovalId, ApprovalRecord, ApprovalStatus, ApprovalStore};

use crate::records::RecordSet;

/// Identity of one version of the snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SnapshotStamp {
    modified: Option<SystemTime>,
    len: u64,
}

#[derive(Debug, Default)]
struct Cache {
    records: Option<RecordSet>,
    /// Stamp of the snapshot `records` was loaded from or last written to.
    /// `None` means the file did not exist.
    stamp: Option<SnapshotStamp>,
}

/// [`ApprovalStore`] persisted as a JSON snapshot at a fixed path.
#[derive(Debug)]
pub struct FileApprovalStore {
    path: PathBuf,
    cache: Mutex<Cache>,
}

impl FileApprovalStore {
    /// Creates a store for the snapshot at `path`. Nothing is read until the
    /// first operation; a missing file is an empty store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(Cache::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn stamp(&self) -> Result<Option<SnapshotStamp>, ApprovalError> {
        match fs::metadata(&self.path).await {
            Ok(meta) => Ok(Some(SnapshotStamp {
                modified: meta.modified().ok(),
                len: meta.len(),
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApprovalError::store_io(
                format!("inspecting snapshot {}", self.path.display()),
                e,
            )),
        }
    }

    async fn read_snapshot(&self) -> Result<RecordSet, ApprovalError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(RecordSet::default()),
            Err(e) => {
                return Err(ApprovalError::store_io(
                    format!("reading snapshot {}", self.path.display()),
                    e,
                ))
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(RecordSet::default());
        }

        let records: Vec<ApprovalRecord> = serde_json::from_slice(&bytes).map_err(|e| {
            ApprovalError::store_io(format!("parsing snapshot {}", self.path.display()), e)
        })?;
        RecordSet::from_records(records).map_err(|e| {
            ApprovalError::store_io(format!("loading snapshot {}", self.path.display()), e)
        })
    }

    /// Writes `records` to a sibling temporary file, syncs it, and renames it
    /// over the snapshot so readers only ever see a complete file.
    async fn write_snapshot(&self, records: &RecordSet) -> Result<(), ApprovalError> {
        let context = || format!("writing snapshot {}", self.path.display());

        let bytes = serde_json::to_vec_pretty(&records.sorted())
            .map_err(|e| ApprovalError::store_io(context(), e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ApprovalError::store_io(context(), e))?;
        }

        let tmp = self.tmp_path();
        let mut file = fs::File::create(&tmp)
            .await
            .map_err(|e| ApprovalError::store_io(context(), e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| ApprovalError::store_io(context(), e))?;
        file.sync_all()
            .await
            .map_err(|e| ApprovalError::store_io(context(), e))?;
        drop(file);

        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| ApprovalError::store_io(context(), e))?;

        debug!(path = %self.path.display(), records = records.len(), "approval snapshot written");
        Ok(())
    }

    /// Returns the cached collection, (re)loading it if it was never loaded or
    /// the snapshot changed on disk since it was last seen.
    async fn refresh<'a>(&self, cache: &'a mut Cache) -> Result<&'a RecordSet, ApprovalError> {
        let stamp = self.stamp().await?;
        if cache.records.is_none() || cache.stamp != stamp {
            let records = self.read_snapshot().await?;
            if cache.records.is_some() {
                info!(path = %self.path.display(), records = records.len(), "approval snapshot changed on disk; reloaded");
            } else {
                debug!(path = %self.path.display(), records = records.len(), "approval snapshot loaded");
            }
            cache.records = Some(records);
            cache.stamp = stamp;
        }
        Ok(cache.records.get_or_insert_with(RecordSet::default))
    }

    /// Runs one load → mutate → persist cycle under the store lock.
    ///
    /// `mutate` returns its result together with whether it changed anything;
    /// unchanged collections are not rewritten. The cache only adopts the new
    /// collection once it has been persisted.
    async fn mutate<T, F>(&self, mutate: F) -> Result<T, ApprovalError>
    where
        F: FnOnce(&mut RecordSet) -> Result<(T, bool), ApprovalError> + Send,
        T: Send,
    {
        let mut cache = self.cache.lock().await;
        let mut next = self.refresh(&mut cache).await?.clone();
        let (out, changed) = mutate(&mut next)?;
        if !changed {
            return Ok(out);
        }
        self.write_snapshot(&next).await?;
        cache.stamp = self.stamp().await?;
        cache.records = Some(next);
        Ok(out)
    }
}

#[async_trait]
impl ApprovalStore for FileApprovalStore {
    async fn add(&self, record: ApprovalRecord) -> Result<(), ApprovalError> {
        self.mutate(|records| records.insert(record).map(|()| ((), true)))
            .await
    }

    async fn get(&self, id: ApprovalId) -> Result<Option<ApprovalRecord>, ApprovalError> {
        let mut cache = self.cache.lock().await;
        Ok(self.refresh(&mut cache).await?.get(id))
    }

    async fn list(&self) -> Result<Vec<ApprovalRecord>, ApprovalError> {
        let mut cache = self.cache.lock().await;
        Ok(self.refresh(&mut cache).await?.sorted())
    }

    async fn update(&self, record: ApprovalRecord) -> Result<(), ApprovalError> {
        self.mutate(|records| records.replace(record).map(|()| ((), true)))
            .await
    }

    async fn transition(
        &self,
        id: ApprovalId,
        status: ApprovalStatus,
    ) -> Result<ApprovalRecord, ApprovalError> {
        self.mutate(|records| records.transition(id, status).map(|r| (r, true)))
            .await
    }

    async fn delete(&self, id: ApprovalId) -> Result<(), ApprovalError> {
        self.mutate(|records| Ok(((), records.remove(id)))).await
    }
}
