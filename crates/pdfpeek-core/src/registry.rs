//! Ordered collection of file records plus the active-file pointer.
//!
//! Invariants kept by every mutation:
//! - `active` is `Some` exactly when the registry is non-empty,
//! - `active` always names a record that is present.

use crate::FileId;
use crate::intake::Candidate;
use crate::record::FileRecord;

#[derive(Debug, Default)]
pub struct Registry {
    /// Records in insertion order (tab/list order).
    records: Vec<FileRecord>,
    active: Option<FileId>,
    next_id: u64,
    /// Bumped on every `clear()` so work issued before a teardown is stale.
    epoch: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a pending record for `candidate` and append it. The first
    /// record of an empty registry becomes active.
    pub fn create(&mut self, candidate: &Candidate) -> FileId {
        self.next_id += 1;
        let id = FileId::new(self.next_id);
        self.records.push(FileRecord::new(
            id,
            candidate.name.clone(),
            candidate.size_bytes,
            candidate.path.clone(),
        ));
        if self.active.is_none() {
            self.active = Some(id);
        }
        id
    }

    /// Delete a record. When it was active, the first remaining record
    /// becomes active, or nothing when the registry is now empty.
    pub fn remove(&mut self, id: FileId) -> Option<FileRecord> {
        let pos = self.records.iter().position(|r| r.id == id)?;
        let removed = self.records.remove(pos);
        if self.active == Some(id) {
            self.active = self.records.first().map(|r| r.id);
        }
        Some(removed)
    }

    /// Make `id` active. No-op when `id` is absent.
    pub fn set_active(&mut self, id: FileId) -> bool {
        if self.contains(id) {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    /// Advance the active pointer to the next record, wrapping around.
    pub fn cycle_next(&mut self) -> Option<FileId> {
        if self.records.len() < 2 {
            return self.active;
        }
        let current = self
            .active
            .and_then(|id| self.position(id))
            .unwrap_or(0);
        let next = self.records[(current + 1) % self.records.len()].id;
        self.active = Some(next);
        Some(next)
    }

    /// Drop every record and its surfaces. Pending work becomes stale.
    pub fn clear(&mut self) {
        for record in &mut self.records {
            record.release_surfaces();
        }
        self.records.clear();
        self.active = None;
        self.epoch += 1;
    }

    pub fn active_id(&self) -> Option<FileId> {
        self.active
    }

    pub fn active(&self) -> Option<&FileRecord> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn is_active(&self, id: FileId) -> bool {
        self.active == Some(id)
    }

    pub fn get(&self, id: FileId) -> Option<&FileRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: FileId) -> Option<&mut FileRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    pub fn contains(&self, id: FileId) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: FileId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn ids(&self) -> Vec<FileId> {
        self.records.iter().map(|r| r.id).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}
