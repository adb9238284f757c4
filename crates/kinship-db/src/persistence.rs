//! Dirty-gated durable writes.
//!
//! [`Persistence`] is the only code that clears a store's dirty ledger, and
//! it does so only after the gateway reported a successful write.
//!
//! ```text
//! rule engine mutation --> ledger marked
//!        |
//!        +-- mark(.., flush_now = true) --> write now --> ledger cleared
//!        |
//!        +-- checkpoint()  (dirty)  --> write once --> ledger cleared
//!        +-- checkpoint()  (clean)  --> nothing
//!        +-- write fails            --> warn, ledger stays dirty
//! ```

use kinship_store::CanonicalStore;

use crate::error::DbError;
use crate::gateway::SaveGateway;

/// What a checkpoint did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointOutcome {
    /// Nothing changed since the last write; no I/O happened.
    Clean,
    /// The store was written and the ledger cleared.
    Written,
    /// The write failed; the ledger is still dirty.
    Failed(String),
}

impl CheckpointOutcome {
    /// Whether a write reached the slot.
    pub const fn is_written(&self) -> bool {
        matches!(self, Self::Written)
    }
}

/// Host-side persistence: the gateway plus the write-gating discipline.
#[derive(Debug)]
pub struct Persistence {
    gateway: SaveGateway,
    failures: u64,
}

impl Persistence {
    /// Wrap a gateway.
    pub const fn new(gateway: SaveGateway) -> Self {
        Self {
            gateway,
            failures: 0,
        }
    }

    /// The underlying gateway.
    pub const fn gateway(&self) -> &SaveGateway {
        &self.gateway
    }

    /// Consecutive failed writes since the last success.
    pub const fn consecutive_failures(&self) -> u64 {
        self.failures
    }

    /// Load the canonical store. The returned store starts clean.
    ///
    /// # Errors
    ///
    /// Propagates any [`DbError`] from [`SaveGateway::load`].
    pub fn load(&self) -> Result<CanonicalStore, DbError> {
        self.gateway.load().map(CanonicalStore::from_data)
    }

    /// Record that `store` changed. With `flush_now` the store is written
    /// immediately; otherwise the write waits for the next checkpoint.
    pub fn mark(
        &mut self,
        store: &mut CanonicalStore,
        reason: &str,
        flush_now: bool,
    ) -> CheckpointOutcome {
        store.mark(reason);
        if flush_now {
            self.flush(store, reason)
        } else {
            CheckpointOutcome::Clean
        }
    }

    /// Write the store if it is dirty.
    pub fn checkpoint(&mut self, store: &mut CanonicalStore) -> CheckpointOutcome {
        if !store.ledger().is_dirty() {
            tracing::trace!("Checkpoint skipped, store clean");
            return CheckpointOutcome::Clean;
        }
        self.flush(store, "checkpoint")
    }

    fn flush(&mut self, store: &mut CanonicalStore, trigger: &str) -> CheckpointOutcome {
        let marks = store.ledger().marks_since_flush();
        match self.gateway.write(store.view()) {
            Ok(()) => {
                store.ledger_mut().clear();
                self.failures = 0;
                tracing::info!(trigger, marks, "Saved romance data");
                CheckpointOutcome::Written
            }
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                tracing::warn!(
                    trigger,
                    error = %e,
                    failures = self.failures,
                    "Save failed, will retry at next checkpoint"
                );
                CheckpointOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use kinship_types::PlayerId;

    use crate::slot::MemorySlot;

    fn setup() -> (Persistence, MemorySlot, CanonicalStore) {
        let slot = MemorySlot::new();
        let persistence = Persistence::new(SaveGateway::new(slot.clone()));
        (persistence, slot, CanonicalStore::new())
    }

    #[test]
    fn deferred_mark_writes_once_at_checkpoint() {
        let (mut persistence, slot, mut store) = setup();

        let outcome = persistence.mark(&mut store, "relationship:update", false);
        assert_eq!(outcome, CheckpointOutcome::Clean);
        assert_eq!(slot.write_count(), 0);
        assert!(store.ledger().is_dirty());

        assert_eq!(persistence.checkpoint(&mut store), CheckpointOutcome::Written);
        assert_eq!(slot.write_count(), 1);
        assert_eq!(persistence.checkpoint(&mut store), CheckpointOutcome::Clean);
        assert_eq!(slot.write_count(), 1);
    }

    #[test]
    fn immediate_mark_writes_now_and_not_again() {
        let (mut persistence, slot, mut store) = setup();

        let outcome = persistence.mark(&mut store, "child:born", true);
        assert!(outcome.is_written());
        assert_eq!(slot.write_count(), 1);
        assert!(!store.ledger().is_dirty());

        assert_eq!(persistence.checkpoint(&mut store), CheckpointOutcome::Clean);
        assert_eq!(slot.write_count(), 1);
    }

    #[test]
    fn failed_write_keeps_ledger_dirty_and_retries() {
        let (mut persistence, slot, mut store) = setup();
        store
            .update_relationship(PlayerId(1), PlayerId(2), "seed", |r| {
                r.heart_points = 40;
                Ok::<_, ()>(())
            })
            .ok();

        slot.set_fail_writes(true);
        let outcome = persistence.checkpoint(&mut store);
        assert!(matches!(outcome, CheckpointOutcome::Failed(_)));
        assert!(store.ledger().is_dirty());
        assert_eq!(persistence.consecutive_failures(), 1);

        slot.set_fail_writes(false);
        assert_eq!(persistence.checkpoint(&mut store), CheckpointOutcome::Written);
        assert!(!store.ledger().is_dirty());
        assert_eq!(persistence.consecutive_failures(), 0);
        assert_eq!(slot.write_count(), 1);
    }

    #[test]
    fn loaded_store_is_clean() {
        let (persistence, _slot, _store) = setup();
        let store = persistence.load().ok();
        assert_eq!(store.map(|s| s.ledger().is_dirty()), Some(false));
    }
}
