//! Host side of the sync protocol.
//!
//! The host answers snapshot requests with a reply to the requester only,
//! and pushes periodic or event-driven broadcasts to every peer. It never
//! waits for acknowledgements.

use kinship_types::{NetSnapshot, PlayerId, Role};

use crate::channel::{Envelope, Outbox, Recipient};
use crate::protocol::{SyncError, SyncMessage};

/// Host sync endpoint.
pub struct HostSync {
    outbox: Box<dyn Outbox>,
    broadcasts: u64,
    replies: u64,
}

impl core::fmt::Debug for HostSync {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HostSync")
            .field("broadcasts", &self.broadcasts)
            .field("replies", &self.replies)
            .finish_non_exhaustive()
    }
}

impl HostSync {
    /// Endpoint sending through `outbox`.
    pub fn new(outbox: Box<dyn Outbox>) -> Self {
        Self {
            outbox,
            broadcasts: 0,
            replies: 0,
        }
    }

    /// Broadcasts sent so far.
    pub const fn broadcasts(&self) -> u64 {
        self.broadcasts
    }

    /// Request replies sent so far.
    pub const fn replies(&self) -> u64 {
        self.replies
    }

    /// Push `snapshot` to every connected peer.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if encoding fails or the channel is gone.
    pub fn broadcast(&mut self, snapshot: NetSnapshot) -> Result<(), SyncError> {
        let day = snapshot.day;
        let payload = SyncMessage::broadcast(snapshot).encode()?;
        let bytes = payload.len();
        self.outbox.send(Recipient::AllPeers, payload)?;
        self.broadcasts = self.broadcasts.saturating_add(1);
        tracing::debug!(day, bytes, "Broadcast snapshot");
        Ok(())
    }

    /// Send `snapshot` to one peer.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if encoding fails or the peer is unreachable.
    pub fn reply(&mut self, peer: PlayerId, snapshot: NetSnapshot) -> Result<(), SyncError> {
        let payload = SyncMessage::broadcast(snapshot).encode()?;
        self.outbox.send(Recipient::Peer(peer), payload)?;
        self.replies = self.replies.saturating_add(1);
        tracing::debug!(%peer, "Answered snapshot request");
        Ok(())
    }

    /// Handle one inbound envelope. `build` is called only when a snapshot
    /// has to be sent.
    ///
    /// Malformed and misdirected messages are logged and dropped.
    ///
    /// # Errors
    ///
    /// Returns the [`SyncError`] describing why the message was dropped or
    /// the reply failed.
    pub fn handle<F>(&mut self, envelope: &Envelope, build: F) -> Result<(), SyncError>
    where
        F: FnOnce() -> NetSnapshot,
    {
        let message = match SyncMessage::decode(&envelope.payload) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(from = %envelope.from, error = %e, "Dropped malformed message");
                return Err(e);
            }
        };
        match message {
            SyncMessage::SnapshotRequest => self.reply(envelope.from, build()),
            SyncMessage::SnapshotBroadcast { .. } => {
                tracing::warn!(from = %envelope.from, "Dropped broadcast sent to host");
                Err(SyncError::Unexpected {
                    kind: message.kind(),
                    role: Role::Host,
                })
            }
        }
    }
}
