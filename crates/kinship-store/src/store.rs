//! The canonical store: the host's authoritative record collection.
//!
//! # Guarantees
//!
//! - **No torn records**: [`CanonicalStore::update`] runs the caller's
//!   closure against a working copy. The copy replaces the stored record
//!   only when the closure returns `Ok`; an `Err` leaves the store exactly
//!   as it was.
//! - **Every mutation is tracked**: inserts, changed updates, and removals
//!   mark the [`DirtyLedger`] with a reason. Reads, no-op updates, failed
//!   updates, and removals of missing keys do not.
//! - **Misses create**: `get_or_create` and `update` start from a
//!   default-initialized record when the key has no entry yet.

use kinship_types::{
    ChildId, ChildRecord, PairKey, PlayerId, PregnancyRecord, RelationshipRecord,
    RomanceSaveData,
};

use crate::entity::Entity;
use crate::ledger::DirtyLedger;

/// Authoritative record collection plus its dirty ledger.
///
/// Only a host session ever constructs one.
#[derive(Debug, Clone, Default)]
pub struct CanonicalStore {
    data: RomanceSaveData,
    ledger: DirtyLedger,
}

impl CanonicalStore {
    /// Create an empty store with a clean ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap data freshly read from the save slot. The ledger starts clean.
    pub const fn from_data(data: RomanceSaveData) -> Self {
        Self {
            data,
            ledger: DirtyLedger::new(),
        }
    }

    /// Read-only view of every record, for the snapshot builder and the
    /// persistence gateway.
    pub const fn view(&self) -> &RomanceSaveData {
        &self.data
    }

    /// The dirty ledger.
    pub const fn ledger(&self) -> &DirtyLedger {
        &self.ledger
    }

    /// Mutable ledger access for the persistence layer.
    pub const fn ledger_mut(&mut self) -> &mut DirtyLedger {
        &mut self.ledger
    }

    /// Mark the store dirty without changing a record.
    pub fn mark(&mut self, reason: &str) {
        self.ledger.mark(reason);
    }

    /// Replace every record at once, e.g. after a load. Marks dirty.
    pub fn replace_all(&mut self, data: RomanceSaveData, reason: &str) {
        self.data = data;
        self.ledger.mark(reason);
    }

    /// Consume the store, returning its records.
    pub fn into_data(self) -> RomanceSaveData {
        self.data
    }

    // =========================================================================
    // Generic operations
    // =========================================================================

    /// Look up a record without creating it.
    pub fn get<T: Entity>(&self, key: &T::Key) -> Option<&T> {
        T::table(&self.data).get(key)
    }

    /// Iterate over every record of a type in key order.
    pub fn iter<'a, T: Entity + 'a>(&'a self) -> impl Iterator<Item = (&'a T::Key, &'a T)> + 'a
    where
        T::Key: 'a,
    {
        T::table(&self.data).iter()
    }

    /// Number of records of a type.
    pub fn count<T: Entity>(&self) -> usize {
        T::table(&self.data).len()
    }

    /// Return the record under `key`, inserting a default one if missing.
    ///
    /// Marks the ledger only when a record was created.
    pub fn get_or_create<T: Entity>(&mut self, key: &T::Key, reason: &str) -> &T {
        if !T::table(&self.data).contains_key(key) {
            tracing::debug!(kind = %T::KIND, %key, reason, "Created record");
            self.ledger.mark(reason);
        }
        T::table_mut(&mut self.data)
            .entry(key.clone())
            .or_insert_with(|| T::create(key))
    }

    /// Insert or replace a record. Returns the previous record, if any.
    ///
    /// Marks the ledger unless the new record equals the stored one.
    pub fn upsert<T: Entity>(&mut self, key: T::Key, record: T, reason: &str) -> Option<T> {
        let table = T::table_mut(&mut self.data);
        if table.get(&key) == Some(&record) {
            return Some(record);
        }
        let previous = table.insert(key, record);
        self.ledger.mark(reason);
        previous
    }

    /// Remove a record. Removing a missing key is a no-op returning `None`.
    pub fn remove<T: Entity>(&mut self, key: &T::Key, reason: &str) -> Option<T> {
        let removed = T::table_mut(&mut self.data).remove(key);
        if removed.is_some() {
            tracing::debug!(kind = %T::KIND, %key, reason, "Removed record");
            self.ledger.mark(reason);
        }
        removed
    }

    /// Apply `f` to the record under `key` atomically.
    ///
    /// `f` receives a working copy (a default record if the key is missing).
    /// On `Ok` the copy is stored if it differs from what was there; on `Err`
    /// nothing changes and the error is returned as is.
    pub fn update<T, R, E, F>(&mut self, key: &T::Key, reason: &str, f: F) -> Result<R, E>
    where
        T: Entity,
        F: FnOnce(&mut T) -> Result<R, E>,
    {
        let table = T::table_mut(&mut self.data);
        let existing = table.get(key);
        let mut working = existing.cloned().unwrap_or_else(|| T::create(key));

        let outcome = f(&mut working)?;

        if existing != Some(&working) {
            table.insert(key.clone(), working);
            self.ledger.mark(reason);
        }
        Ok(outcome)
    }

    // =========================================================================
    // Pair-keyed conveniences
    // =========================================================================

    /// The relationship between two participants, if one exists.
    pub fn relationship(&self, a: PlayerId, b: PlayerId) -> Option<&RelationshipRecord> {
        self.get::<RelationshipRecord>(&PairKey::new(a, b))
    }

    /// Atomically update the relationship between two participants.
    pub fn update_relationship<R, E, F>(
        &mut self,
        a: PlayerId,
        b: PlayerId,
        reason: &str,
        f: F,
    ) -> Result<R, E>
    where
        F: FnOnce(&mut RelationshipRecord) -> Result<R, E>,
    {
        self.update::<RelationshipRecord, R, E, F>(&PairKey::new(a, b), reason, f)
    }

    /// The pregnancy state of a couple, if one exists.
    pub fn pregnancy(&self, a: PlayerId, b: PlayerId) -> Option<&PregnancyRecord> {
        self.get::<PregnancyRecord>(&PairKey::new(a, b))
    }

    /// Atomically update the pregnancy state of a couple.
    pub fn update_pregnancy<R, E, F>(
        &mut self,
        a: PlayerId,
        b: PlayerId,
        reason: &str,
        f: F,
    ) -> Result<R, E>
    where
        F: FnOnce(&mut PregnancyRecord) -> Result<R, E>,
    {
        self.update::<PregnancyRecord, R, E, F>(&PairKey::new(a, b), reason, f)
    }

    /// Register a newborn child. Returns its id.
    pub fn add_child(&mut self, child: ChildRecord, reason: &str) -> ChildId {
        let id = child.id;
        self.upsert(id, child, reason);
        id
    }

    /// Set the last day the rule engines finished processing.
    pub fn set_last_processed_day(&mut self, day: u32) {
        if self.data.last_processed_day != day {
            self.data.last_processed_day = day;
            self.ledger.mark("last_processed_day");
        }
    }
}
