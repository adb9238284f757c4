//! Wire messages between host and peers.
//!
//! Every message is one JSON object tagged by `Kind`:
//!
//! | Kind | Direction | Body |
//! |------|-----------|------|
//! | `SnapshotRequest` | peer -> host | none; the requester is the envelope sender |
//! | `SnapshotBroadcast` | host -> peers | `Snapshot`: a full [`NetSnapshot`] |
//!
//! There are no sequence numbers, acknowledgements, or timeouts. A
//! broadcast always carries the whole snapshot and replaces whatever the
//! peer held, so receiving the same broadcast twice is harmless.

use kinship_types::NetSnapshot;
use serde::{Deserialize, Serialize};

/// Errors raised while encoding, decoding, or delivering sync messages.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The payload is not a valid sync message.
    #[error("malformed sync message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The message is valid but not meant for this side.
    #[error("unexpected {kind} message on {role} side")]
    Unexpected {
        /// Message kind received.
        kind: &'static str,
        /// Role of the receiving side.
        role: kinship_types::Role,
    },

    /// The channel to the recipient is gone.
    #[error("channel to {0} is closed")]
    ChannelClosed(String),
}

/// A host/peer sync message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Kind")]
pub enum SyncMessage {
    /// A peer asks the host for the current snapshot.
    SnapshotRequest,
    /// The host pushes the current snapshot.
    SnapshotBroadcast {
        /// Full snapshot replacing the peer's copy.
        #[serde(rename = "Snapshot")]
        snapshot: Box<NetSnapshot>,
    },
}

impl SyncMessage {
    /// Wrap a snapshot for broadcast.
    pub fn broadcast(snapshot: NetSnapshot) -> Self {
        Self::SnapshotBroadcast {
            snapshot: Box::new(snapshot),
        }
    }

    /// Wire name of the message kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SnapshotRequest => "SnapshotRequest",
            Self::SnapshotBroadcast { .. } => "SnapshotBroadcast",
        }
    }

    /// Serialize to a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Malformed`] if serialization fails.
    pub fn encode(&self) -> Result<String, SyncError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Malformed`] if the payload is not a sync message.
    pub fn decode(payload: &str) -> Result<Self, SyncError> {
        Ok(serde_json::from_str(payload)?)
    }
}
