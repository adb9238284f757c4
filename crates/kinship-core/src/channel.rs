//! Message delivery between host and peers.
//!
//! The hosting game provides a reliable, ordered channel; the core only
//! needs to hand it a payload and a recipient. [`Outbox`] is that seam.
//! [`LocalHub`] implements it in-process over unbounded tokio channels and
//! is what the host binary and the tests run on.
//!
//! ```text
//!            +------------- LocalHub -------------+
//!  peer 7 ---|--> host inbox                      |
//!  peer 9 ---|--> host inbox                      |
//!  host  ----|--> peer 7 inbox, peer 9 inbox (AllPeers)
//!            +------------------------------------+
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kinship_types::PlayerId;
use tokio::sync::mpsc;

use crate::protocol::SyncError;

/// Who a payload is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// The session host.
    Host,
    /// One peer.
    Peer(PlayerId),
    /// Every connected peer.
    AllPeers,
}

impl core::fmt::Display for Recipient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Host => f.write_str("host"),
            Self::Peer(id) => write!(f, "peer {id}"),
            Self::AllPeers => f.write_str("all peers"),
        }
    }
}

/// An inbound payload and its sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Sending participant.
    pub from: PlayerId,
    /// Raw message payload.
    pub payload: String,
}

/// Outbound half of the message channel.
///
/// `send` never blocks; delivery order per recipient follows call order.
pub trait Outbox: Send + Sync {
    /// Queue `payload` for `to`.
    fn send(&self, to: Recipient, payload: String) -> Result<(), SyncError>;
}

// =========================================================================
// LocalHub
// =========================================================================

#[derive(Debug)]
struct HubInner {
    host: mpsc::UnboundedSender<Envelope>,
    peers: BTreeMap<PlayerId, mpsc::UnboundedSender<Envelope>>,
}

/// In-process channel hub connecting one host with any number of peers.
#[derive(Debug, Clone)]
pub struct LocalHub {
    host_id: PlayerId,
    inner: Arc<Mutex<HubInner>>,
}

impl LocalHub {
    /// Create a hub. Returns the hub and the host's inbox.
    pub fn new(host_id: PlayerId) -> (Self, mpsc::UnboundedReceiver<Envelope>) {
        let (host, host_rx) = mpsc::unbounded_channel();
        let hub = Self {
            host_id,
            inner: Arc::new(Mutex::new(HubInner {
                host,
                peers: BTreeMap::new(),
            })),
        };
        (hub, host_rx)
    }

    /// The host's participant id.
    pub const fn host_id(&self) -> PlayerId {
        self.host_id
    }

    /// Connect a peer. Returns its inbox. Rejoining replaces the old inbox.
    pub fn join(&self, peer: PlayerId) -> mpsc::UnboundedReceiver<Envelope> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().peers.insert(peer, tx);
        tracing::info!(%peer, "Peer joined");
        rx
    }

    /// Disconnect a peer. Returns whether it was connected.
    pub fn leave(&self, peer: PlayerId) -> bool {
        let removed = self.lock().peers.remove(&peer).is_some();
        if removed {
            tracing::info!(%peer, "Peer left");
        }
        removed
    }

    /// Currently connected peers in id order.
    pub fn peers(&self) -> Vec<PlayerId> {
        self.lock().peers.keys().copied().collect()
    }

    /// An outbox that sends as `from`.
    pub fn outbox(&self, from: PlayerId) -> HubOutbox {
        HubOutbox {
            hub: self.clone(),
            from,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver(&self, from: PlayerId, to: Recipient, payload: String) -> Result<(), SyncError> {
        let mut inner = self.lock();
        match to {
            Recipient::Host => inner
                .host
                .send(Envelope { from, payload })
                .map_err(|e| SyncError::ChannelClosed(format!("host ({e})"))),
            Recipient::Peer(peer) => {
                let delivered = inner
                    .peers
                    .get(&peer)
                    .is_some_and(|tx| tx.send(Envelope { from, payload }).is_ok());
                if delivered {
                    Ok(())
                } else {
                    inner.peers.remove(&peer);
                    Err(SyncError::ChannelClosed(to.to_string()))
                }
            }
            Recipient::AllPeers => {
                inner.peers.retain(|peer, tx| {
                    if *peer == from {
                        return true;
                    }
                    let alive = tx
                        .send(Envelope {
                            from,
                            payload: payload.clone(),
                        })
                        .is_ok();
                    if !alive {
                        tracing::warn!(%peer, "Dropping peer with closed inbox");
                    }
                    alive
                });
                Ok(())
            }
        }
    }
}

/// [`Outbox`] handle bound to one sender on a [`LocalHub`].
#[derive(Debug, Clone)]
pub struct HubOutbox {
    hub: LocalHub,
    from: PlayerId,
}

impl Outbox for HubOutbox {
    fn send(&self, to: Recipient, payload: String) -> Result<(), SyncError> {
        self.hub.deliver(self.from, to, payload)
    }
}
