//! Keyed record collection shared by both store implementations.

use std::collections::HashMap;

use approvals::{ApprovalError, ApprovalId, ApprovalRecord, ApprovalStatus};

/// The full set of live approval records, keyed by id.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordSet {
    records: HashMap<ApprovalId, ApprovalRecord>,
}

impl RecordSet {
    /// Builds a set from a deserialised snapshot.
    ///
    /// A snapshot listing the same id twice is corrupt.
    pub(crate) fn from_records(records: Vec<ApprovalRecord>) -> Result<Self, ApprovalError> {
        let mut set = Self::default();
        for record in records {
            set.insert(record)?;
        }
        Ok(set)
    }

    pub(crate) fn insert(&mut self, record: ApprovalRecord) -> Result<(), ApprovalError> {
        let id = record.id();
        if self.records.contains_key(&id) {
            return Err(ApprovalError::DuplicateId { id });
        }
        self.records.insert(id, record);
        Ok(())
    }

    pub(crate) fn get(&self, id: ApprovalId) -> Option<ApprovalRecord> {
        self.records.get(&id).cloned()
    }

    /// Replaces the record with the same id wholesale.
    pub(crate) fn replace(&mut self, record: ApprovalRecord) -> Result<(), ApprovalError> {
        match self.records.get_mut(&record.id()) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(ApprovalError::NotFound { id: record.id() }),
        }
    }

    /// Moves a pending record to `status` and returns the updated record.
    pub(crate) fn transition(
        &mut self,
        id: ApprovalId,
        status: ApprovalStatus,
    ) -> Result<ApprovalRecord, ApprovalError> {
        let slot = self
            .records
            .get_mut(&id)
            .ok_or(ApprovalError::NotFound { id })?;
        if slot.status().is_terminal() {
            return Err(ApprovalError::AlreadyResolved {
                id,
                status: slot.status(),
            });
        }
        slot.set_status(status);
        Ok(slot.clone())
    }

    /// Returns `true` if a record was removed.
    pub(crate) fn remove(&mut self, id: ApprovalId) -> bool {
        self.records.remove(&id).is_some()
    }

    /// All records, soonest-expiring first. Ties are broken by id so the order
    /// is stable across calls.
    pub(crate) fn sorted(&self) -> Vec<ApprovalRecord> {
        let mut out: Vec<ApprovalRecord> = self.records.values().cloned().collect();
        out.sort_by(|a, b| {
            a.expires_at()
                .cmp(&b.expires_at())
                .then_with(|| a.id().cmp(&b.id()))
        });
        out
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}
