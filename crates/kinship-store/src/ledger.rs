//! The dirty ledger: has canonical state changed since the last durable write?
//!
//! The ledger itself never performs I/O. `kinship-db` consults it at flush
//! requests and checkpoints, writes the store only when it is dirty, and
//! clears it only after the write succeeded. A failed write leaves the
//! ledger dirty so the next checkpoint retries.

use chrono::{DateTime, Utc};

/// Mutation tracker gating durable writes.
#[derive(Debug, Clone, Default)]
pub struct DirtyLedger {
    dirty: bool,
    /// Reason of the most recent mark, kept for diagnostics.
    reason: Option<String>,
    /// When the oldest unflushed mark happened.
    first_marked_at: Option<DateTime<Utc>>,
    marks_since_flush: u64,
    flushes: u64,
}

impl DirtyLedger {
    /// Create a clean ledger.
    pub const fn new() -> Self {
        Self {
            dirty: false,
            reason: None,
            first_marked_at: None,
            marks_since_flush: 0,
            flushes: 0,
        }
    }

    /// Record that canonical state changed.
    pub fn mark(&mut self, reason: &str) {
        if !self.dirty {
            self.first_marked_at = Some(Utc::now());
        }
        self.dirty = true;
        self.reason = Some(reason.to_owned());
        self.marks_since_flush = self.marks_since_flush.saturating_add(1);
        tracing::trace!(reason, marks = self.marks_since_flush, "Ledger marked dirty");
    }

    /// Whether a durable write is owed.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reason of the most recent mark.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// When the oldest unflushed mark happened.
    pub const fn first_marked_at(&self) -> Option<DateTime<Utc>> {
        self.first_marked_at
    }

    /// Marks recorded since the last successful write.
    pub const fn marks_since_flush(&self) -> u64 {
        self.marks_since_flush
    }

    /// Successful writes recorded over the ledger's lifetime.
    pub const fn flushes(&self) -> u64 {
        self.flushes
    }

    /// Record a successful durable write.
    ///
    /// Only the persistence layer should call this, and only after the write
    /// returned successfully.
    pub fn clear(&mut self) {
        self.dirty = false;
        self.reason = None;
        self.first_marked_at = None;
        self.marks_since_flush = 0;
        self.flushes = self.flushes.saturating_add(1);
    }
}
