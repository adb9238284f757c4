//! Peer side of the sync protocol.
//!
//! A peer owns nothing but a disposable snapshot. Every broadcast from the
//! host replaces it wholesale; nothing from the previous snapshot survives.
//! Broadcasts from any other sender are dropped. On world load
//! the peer resets to an empty snapshot and asks the host for a fresh one.
//!
//! If that request is lost there is no retry: the peer keeps the empty
//! snapshot until the host's next periodic broadcast.

use kinship_types::{NetSnapshot, PlayerId, Role};

use crate::channel::{Envelope, Outbox, Recipient};
use crate::protocol::{SyncError, SyncMessage};

/// Peer sync endpoint.
pub struct PeerSync {
    outbox: Box<dyn Outbox>,
    host: PlayerId,
    snapshot: NetSnapshot,
    received: u64,
}

impl core::fmt::Debug for PeerSync {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PeerSync")
            .field("host", &self.host)
            .field("day", &self.snapshot.day)
            .field("received", &self.received)
            .finish_non_exhaustive()
    }
}

impl PeerSync {
    /// Endpoint sending through `outbox` and trusting broadcasts from
    /// `host` only, starting from an empty snapshot.
    pub fn new(outbox: Box<dyn Outbox>, host: PlayerId) -> Self {
        Self {
            outbox,
            host,
            snapshot: NetSnapshot::default(),
            received: 0,
        }
    }

    /// The current local snapshot.
    pub const fn snapshot(&self) -> &NetSnapshot {
        &self.snapshot
    }

    /// The participant whose broadcasts are accepted.
    pub const fn host(&self) -> PlayerId {
        self.host
    }

    /// Broadcasts applied so far.
    pub const fn received(&self) -> u64 {
        self.received
    }

    /// Reset the snapshot and ask the host for a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the request could not be queued. The
    /// snapshot is reset either way.
    pub fn world_loaded(&mut self) -> Result<(), SyncError> {
        self.snapshot = NetSnapshot::default();
        self.request()
    }

    /// Ask the host for the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the request could not be queued.
    pub fn request(&self) -> Result<(), SyncError> {
        let payload = SyncMessage::SnapshotRequest.encode()?;
        self.outbox.send(Recipient::Host, payload)?;
        tracing::debug!("Requested snapshot from host");
        Ok(())
    }

    /// Handle one inbound envelope.
    ///
    /// A broadcast from the host replaces the local snapshot. Malformed
    /// messages, broadcasts from anyone else, and requests are logged and
    /// dropped; the previous snapshot is kept.
    ///
    /// # Errors
    ///
    /// Returns the [`SyncError`] describing why the message was dropped.
    pub fn handle(&mut self, envelope: &Envelope) -> Result<(), SyncError> {
        let message = match SyncMessage::decode(&envelope.payload) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(from = %envelope.from, error = %e, "Dropped malformed message");
                return Err(e);
            }
        };
        match message {
            SyncMessage::SnapshotBroadcast { snapshot } if envelope.from == self.host => {
                self.apply(*snapshot);
                Ok(())
            }
            SyncMessage::SnapshotBroadcast { .. } => {
                tracing::warn!(
                    from = %envelope.from,
                    host = %self.host,
                    "Dropped broadcast from a participant other than the host"
                );
                Err(SyncError::Unexpected {
                    kind: message.kind(),
                    role: Role::Peer,
                })
            }
            SyncMessage::SnapshotRequest => {
                tracing::warn!(from = %envelope.from, "Dropped snapshot request sent to peer");
                Err(SyncError::Unexpected {
                    kind: message.kind(),
                    role: Role::Peer,
                })
            }
        }
    }

    /// Replace the local snapshot.
    pub fn apply(&mut self, snapshot: NetSnapshot) {
        tracing::debug!(
            day = snapshot.day,
            relationships = snapshot.relationships.len(),
            children = snapshot.children.len(),
            "Applied snapshot"
        );
        self.snapshot = snapshot;
        self.received = self.received.saturating_add(1);
    }
}
