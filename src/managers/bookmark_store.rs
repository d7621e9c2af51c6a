//! Local Bookmark Store.
//!
//! The in-session, ordered list of bookmarks that the UI renders. It is fed by
//! a snapshot at session start, by change-feed events and by optimistic
//! deletes, and it guarantees that no two records share an id.
//!
//! An optimistic delete parks the removed record until the upstream call
//! settles. Any `remove` of that id in the meantime, such as a delete event
//! from the feed, drops the parked copy so it can no longer be restored.

use std::collections::{HashMap, HashSet};

use crate::types::bookmark::BookmarkRecord;

/// Ordered, id-unique collection of bookmarks.
#[derive(Debug, Default, Clone)]
pub struct LocalBookmarkStore {
    records: Vec<BookmarkRecord>,
    ids: HashSet<String>,
    parked: HashMap<String, (usize, BookmarkRecord)>,
    revision: u64,
}

impl LocalBookmarkStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole contents with `snapshot`, keeping its order.
    ///
    /// A snapshot that repeats an id keeps only the first occurrence.
    pub fn initialize(&mut self, snapshot: Vec<BookmarkRecord>) {
        self.records.clear();
        self.ids.clear();
        self.parked.clear();
        for record in snapshot {
            if self.ids.insert(record.id.clone()) {
                self.records.push(record);
            }
        }
        self.revision += 1;
    }

    /// Appends `record` unless a record with the same id is already present.
    ///
    /// Returns whether the store changed. Applying the same record twice is
    /// the same as applying it once.
    pub fn insert_if_absent(&mut self, record: BookmarkRecord) -> bool {
        if !self.ids.insert(record.id.clone()) {
            return false;
        }
        self.records.push(record);
        self.revision += 1;
        true
    }

    /// Removes the record with `id`, returning its former position and value.
    ///
    /// Absent ids leave the list alone. Either way a parked copy of `id`
    /// is dropped.
    pub fn remove(&mut self, id: &str) -> Option<(usize, BookmarkRecord)> {
        self.parked.remove(id);
        if !self.ids.remove(id) {
            return None;
        }
        let pos = self.records.iter().position(|r| r.id == id)?;
        let record = self.records.remove(pos);
        self.revision += 1;
        Some((pos, record))
    }

    /// Puts a previously removed record back at `position` (clamped to the
    /// end). Does nothing if the id has reappeared in the meantime.
    pub fn restore(&mut self, position: usize, record: BookmarkRecord) -> bool {
        if !self.ids.insert(record.id.clone()) {
            return false;
        }
        let at = position.min(self.records.len());
        self.records.insert(at, record);
        self.revision += 1;
        true
    }

    /// Removes `id` and keeps the record aside for [`unpark`](Self::unpark).
    ///
    /// Returns whether anything was removed.
    pub fn park(&mut self, id: &str) -> bool {
        match self.remove(id) {
            Some(entry) => {
                self.parked.insert(id.to_string(), entry);
                true
            }
            None => false,
        }
    }

    /// Forgets the parked copy of `id` once its delete went through.
    pub fn discard_parked(&mut self, id: &str) -> bool {
        self.parked.remove(id).is_some()
    }

    /// Restores the parked copy of `id` at its old position.
    ///
    /// Returns `false` when there is nothing to restore: the id was never
    /// parked, it was removed again since, or it is already back.
    pub fn unpark(&mut self, id: &str) -> bool {
        match self.parked.remove(id) {
            Some((position, record)) => self.restore(position, record),
            None => false,
        }
    }

    pub fn is_parked(&self, id: &str) -> bool {
        self.parked.contains_key(id)
    }

    /// The current ordered contents.
    pub fn current_view(&self) -> &[BookmarkRecord] {
        &self.records
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn get(&self, id: &str) -> Option<&BookmarkRecord> {
        if !self.contains(id) {
            return None;
        }
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bumped on every change to the contents; lets observers skip redraws.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
