// Generic in-memory store guarded by a single reader-writer lock

use crate::error::{Result, StoreError};
use crate::filter::Filter;
use crate::id::{IdGenerator, IdPolicy};
use crate::record::Record;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// State guarded by the store lock
struct Inner<T: Record> {
    /// Insertion slot -> record; iteration yields oldest first
    records: BTreeMap<u64, T>,
    /// Record id -> insertion slot
    index: HashMap<T::Id, u64>,
    next_slot: u64,
    ids: Box<dyn IdGenerator<T::Id>>,
}

/// Thread-safe in-memory store for one resource type
///
/// Every operation takes the lock exactly once and either applies its whole
/// effect or none of it. Records handed out are always clones, so callers can
/// never mutate stored state through a returned value.
pub struct Store<T: Record> {
    inner: RwLock<Inner<T>>,
}

impl<T: Record> Store<T> {
    /// Create an empty store using the default (random) identifier policy
    pub fn new() -> Self {
        Self::with_policy(IdPolicy::default())
    }

    /// Create an empty store using the given identifier policy
    pub fn with_policy(policy: IdPolicy) -> Self {
        debug!(collection = T::collection_name(), %policy, "Store::with_policy: called");
        Self::with_generator(policy.generator())
    }

    /// Create an empty store drawing identifiers from a custom generator
    pub fn with_generator(ids: Box<dyn IdGenerator<T::Id>>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: BTreeMap::new(),
                index: HashMap::new(),
                next_slot: 0,
                ids,
            }),
        }
    }

    // Mutations never leave Inner half-updated, so a poisoned lock still
    // guards consistent state.
    fn read(&self) -> RwLockReadGuard<'_, Inner<T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // CRUD API
    // ========================================================================

    /// Create a new record from a draft and return a copy of it
    pub fn create(&self, draft: T::Draft) -> T {
        let collection = T::collection_name();
        let mut inner = self.write();

        let id = loop {
            let candidate = inner.ids.next_id();
            if !inner.index.contains_key(&candidate) {
                break candidate;
            }
            warn!(collection, id = %candidate, "create: identifier collision, retrying");
        };

        let record = T::from_draft(id.clone(), draft, Utc::now());

        let slot = inner.next_slot;
        inner.next_slot += 1;
        inner.index.insert(id.clone(), slot);
        inner.records.insert(slot, record.clone());

        debug!(collection, id = %id, "create: stored record");
        record
    }

    /// List records, optionally keeping only those whose filterable text
    /// contains `filter_text` (case-insensitive). Empty text means no filter.
    pub fn list(&self, filter_text: Option<&str>) -> Vec<T> {
        self.list_filtered(Filter::from_query(filter_text).as_ref())
    }

    /// List records matching a prebuilt filter, oldest first
    pub fn list_filtered(&self, filter: Option<&Filter>) -> Vec<T> {
        let inner = self.read();
        let records: Vec<T> = inner
            .records
            .values()
            .filter(|record| filter.is_none_or(|f| f.matches_record(*record)))
            .cloned()
            .collect();

        debug!(
            collection = T::collection_name(),
            filter = ?filter.map(Filter::needle),
            count = records.len(),
            "list: returning snapshot"
        );
        records
    }

    /// Get a record by ID
    pub fn get(&self, id: &T::Id) -> Result<T> {
        let inner = self.read();
        inner
            .index
            .get(id)
            .and_then(|slot| inner.records.get(slot))
            .cloned()
            .ok_or_else(|| StoreError::not_found(T::collection_name(), id))
    }

    /// Merge `patch` into the record: supplied fields overwrite, the rest stay
    pub fn update(&self, id: &T::Id, patch: T::Patch) -> Result<T> {
        debug!(collection = T::collection_name(), id = %id, "update: merging patch");
        self.modify(id, |record| record.merge(patch))
    }

    /// Replace every mutable field of the record; id and creation time stay
    pub fn replace(&self, id: &T::Id, draft: T::Draft) -> Result<T> {
        debug!(collection = T::collection_name(), id = %id, "replace: replacing record");
        self.modify(id, |record| record.replace(draft))
    }

    /// Delete a record, returning what was removed
    pub fn delete(&self, id: &T::Id) -> Result<T> {
        let collection = T::collection_name();
        let mut inner = self.write();

        let slot = inner
            .index
            .remove(id)
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        let record = inner
            .records
            .remove(&slot)
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        debug!(collection, id = %id, "delete: removed record");
        Ok(record)
    }

    /// Remove every record. Returns the number removed (zero is not an error).
    ///
    /// Identifier generation is not reset, so sequential ids keep counting.
    pub fn delete_all(&self) -> usize {
        let mut inner = self.write();
        let count = inner.records.len();
        inner.records.clear();
        inner.index.clear();

        debug!(collection = T::collection_name(), count, "delete_all: cleared store");
        count
    }

    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    /// Apply `f` to a copy of the record and commit the copy in one step
    fn modify<F>(&self, id: &T::Id, f: F) -> Result<T>
    where
        F: FnOnce(&mut T),
    {
        let mut inner = self.write();
        let slot = *inner
            .index
            .get(id)
            .ok_or_else(|| StoreError::not_found(T::collection_name(), id))?;
        let stored = inner
            .records
            .get_mut(&slot)
            .ok_or_else(|| StoreError::not_found(T::collection_name(), id))?;

        let mut updated = stored.clone();
        f(&mut updated);
        debug_assert!(updated.id() == id, "record identifier must not change");

        *stored = updated.clone();
        Ok(updated)
    }
}

impl<T: Record> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}
