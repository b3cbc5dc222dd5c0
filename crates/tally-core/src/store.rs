//! The in-memory record store.
//!
//! Exclusive owner of one dataset's collection. Mutations are synchronous and
//! atomic with respect to each other; every component reads and writes the
//! collection only through these operations. Each successful mutation writes
//! the full collection through to the durable cache mirror.

use std::sync::Arc;

use tally_domain::{FieldKind, FieldValue, Record, RecordId};

use crate::cache::CacheMirror;
use crate::error::{Result, SyncError};

pub struct RecordStore<R: Record> {
    records: Vec<R>,
    mirror: Arc<CacheMirror>,
}

impl<R: Record> RecordStore<R> {
    pub fn new(mirror: Arc<CacheMirror>) -> Self {
        Self {
            records: Vec::new(),
            mirror,
        }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&R> {
        self.records.get(index).ok_or(SyncError::Index {
            index,
            len: self.records.len(),
        })
    }

    /// Append a new record optimistically: temporary identity, ordinal = new
    /// length, derived field recomputed. Visible to readers before any remote
    /// acknowledgment.
    pub fn create(&mut self, mut draft: R) -> &R {
        draft.set_id(RecordId::temporary());
        draft.set_ordinal(self.records.len() as u32 + 1);
        draft.recompute_derived();
        self.records.push(draft);
        self.write_through();
        self.records.last().expect("record was just pushed")
    }

    /// Replace one field. Out-of-bounds indices abort without mutating.
    /// Editing an amount field recomputes the derived field; editing the
    /// derived field itself or a descriptive field does not.
    pub fn update(&mut self, index: usize, field: R::Field, value: FieldValue) -> Result<()> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(SyncError::Index { index, len })?;
        record.set(field, value)?;
        if R::kind(field) == FieldKind::Amount {
            record.recompute_derived();
        }
        self.write_through();
        Ok(())
    }

    /// Delete at index and renumber the records after it. Returns the removed
    /// record so a failed remote delete can be compensated.
    pub fn remove(&mut self, index: usize) -> Result<R> {
        if index >= self.records.len() {
            return Err(SyncError::Index {
                index,
                len: self.records.len(),
            });
        }
        let removed = self.records.remove(index);
        self.renumber();
        self.write_through();
        Ok(removed)
    }

    /// Reinsert a record at its original index (rollback of a remove).
    pub fn insert_at(&mut self, index: usize, record: R) -> Result<()> {
        if index > self.records.len() {
            return Err(SyncError::Index {
                index,
                len: self.records.len(),
            });
        }
        self.records.insert(index, record);
        self.renumber();
        self.write_through();
        Ok(())
    }

    /// Swap a temporary identity for the remote-assigned one.
    pub fn assign_remote_id(&mut self, index: usize, id: RecordId) -> Result<()> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(SyncError::Index { index, len })?;
        record.set_id(id);
        self.write_through();
        Ok(())
    }

    /// Replace the whole collection (initial load, reload after submit).
    pub fn replace_all(&mut self, records: Vec<R>) {
        self.records = records;
        self.renumber();
        self.write_through();
    }

    /// Read the mirrored snapshot for this dataset.
    pub fn load_mirrored(&self) -> Result<Option<Vec<R>>> {
        Ok(self.mirror.load(R::CACHE_KEY)?)
    }

    fn renumber(&mut self) {
        for (position, record) in self.records.iter_mut().enumerate() {
            record.set_ordinal(position as u32 + 1);
        }
    }

    fn write_through(&self) {
        // The mirror is a fallback read source; a failed write must not fail
        // the local mutation.
        if let Err(err) = self.mirror.store(R::CACHE_KEY, &self.records) {
            tracing::warn!(dataset = R::DATASET, %err, "cache mirror write failed");
        }
    }
}
