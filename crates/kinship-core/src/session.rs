//! Session context: everything one process needs, built once and passed
//! down.
//!
//! The role is fixed at build time. Host-only capabilities (the canonical
//! store and persistence) exist only on [`HostSession`]; a [`PeerSession`]
//! has nowhere to put them.
//!
//! ```text
//! SessionBuilder::new(role)
//!     .local_player(id)
//!     .host_player(id)    // peer only
//!     .outbox(..)
//!     .gateway(..)        // host only
//!     .config(..)
//!     .build()?  -->  Session::Host(HostSession) | Session::Peer(PeerSession)
//! ```

use core::convert::Infallible;

use kinship_db::{CheckpointOutcome, DbError, Persistence, SaveGateway};
use kinship_store::{CanonicalStore, transitions};
use kinship_types::{
    DateImmersionSaveState, NetSnapshot, PairKey, PlayerId, PregnancyRecord, RelationshipRecord,
    Role,
};

use crate::channel::{Envelope, Outbox};
use crate::config::KinshipConfig;
use crate::host::HostSync;
use crate::live::{LiveSessionError, LiveSessions};
use crate::peer::PeerSync;
use crate::protocol::SyncError;
use crate::snapshot::{self, SnapshotInputs};

/// Errors raised while building or driving a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A required capability was not supplied to the builder.
    #[error("session is missing required capability: {0}")]
    Missing(&'static str),

    /// A host-only capability was supplied for a peer session.
    #[error("{0} is only available to the host")]
    HostOnly(&'static str),

    /// Persistence failed.
    #[error("persistence error: {0}")]
    Db(#[from] DbError),

    /// Sync failed.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// A live session could not start.
    #[error("live session error: {0}")]
    Live(#[from] LiveSessionError),
}

// =========================================================================
// Builder
// =========================================================================

/// Staged construction of a [`Session`].
#[derive(Default)]
pub struct SessionBuilder {
    role: Option<Role>,
    local_player: Option<PlayerId>,
    host_player: Option<PlayerId>,
    outbox: Option<Box<dyn Outbox>>,
    gateway: Option<SaveGateway>,
    config: Option<KinshipConfig>,
}

impl core::fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("role", &self.role)
            .field("local_player", &self.local_player)
            .field("host_player", &self.host_player)
            .field("outbox", &self.outbox.is_some())
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

impl SessionBuilder {
    /// Start building a session for `role`.
    pub fn new(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    /// The local participant.
    #[must_use]
    pub const fn local_player(mut self, id: PlayerId) -> Self {
        self.local_player = Some(id);
        self
    }

    /// The hosting participant, whose broadcasts a peer accepts. Peer only;
    /// a host is its own host.
    #[must_use]
    pub const fn host_player(mut self, id: PlayerId) -> Self {
        self.host_player = Some(id);
        self
    }

    /// The outbound channel.
    #[must_use]
    pub fn outbox(mut self, outbox: impl Outbox + 'static) -> Self {
        self.outbox = Some(Box::new(outbox));
        self
    }

    /// The save gateway. Host only.
    #[must_use]
    pub fn gateway(mut self, gateway: SaveGateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Configuration. Defaults apply when not supplied.
    #[must_use]
    pub fn config(mut self, config: KinshipConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validate the supplied capabilities and build the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Missing`] naming the first absent
    /// capability (a peer also needs the host's id), or
    /// [`SessionError::HostOnly`] if a peer was given a save gateway.
    pub fn build(self) -> Result<Session, SessionError> {
        let role = self.role.ok_or(SessionError::Missing("role"))?;
        let local_player = self
            .local_player
            .ok_or(SessionError::Missing("local player id"))?;
        let outbox = self.outbox.ok_or(SessionError::Missing("outbox"))?;
        let config = self.config.unwrap_or_default();

        let session = match role {
            Role::Host => {
                let gateway = self.gateway.ok_or(SessionError::Missing("save gateway"))?;
                Session::Host(Box::new(HostSession {
                    local_player,
                    config,
                    store: CanonicalStore::new(),
                    persistence: Persistence::new(gateway),
                    live: LiveSessions::new(),
                    sync: HostSync::new(outbox),
                    day: 0,
                    last_work_report: String::new(),
                }))
            }
            Role::Peer => {
                if self.gateway.is_some() {
                    return Err(SessionError::HostOnly("save gateway"));
                }
                let host = self
                    .host_player
                    .ok_or(SessionError::Missing("host player id"))?;
                Session::Peer(PeerSession {
                    local_player,
                    sync: PeerSync::new(outbox, host),
                })
            }
        };
        tracing::info!(%role, player = %local_player, "Session built");
        Ok(session)
    }
}

// =========================================================================
// Session
// =========================================================================

/// A built session, host or peer.
#[derive(Debug)]
pub enum Session {
    /// This process holds canonical state.
    Host(Box<HostSession>),
    /// This process mirrors the host's snapshot.
    Peer(PeerSession),
}

impl Session {
    /// Role fixed at build time.
    pub const fn role(&self) -> Role {
        match self {
            Self::Host(_) => Role::Host,
            Self::Peer(_) => Role::Peer,
        }
    }

    /// The local participant.
    pub fn local_player(&self) -> PlayerId {
        match self {
            Self::Host(host) => host.local_player,
            Self::Peer(peer) => peer.local_player,
        }
    }

    /// Run the role's world-load sequence.
    ///
    /// # Errors
    ///
    /// See [`HostSession::world_loaded`] and [`PeerSession::world_loaded`].
    pub fn world_loaded(&mut self) -> Result<(), SessionError> {
        match self {
            Self::Host(host) => host.world_loaded().map(|_| ()),
            Self::Peer(peer) => peer.world_loaded(),
        }
    }

    /// Handle one inbound envelope.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Sync`] if the message was dropped.
    pub fn handle_envelope(&mut self, envelope: &Envelope) -> Result<(), SessionError> {
        match self {
            Self::Host(host) => host.handle_envelope(envelope),
            Self::Peer(peer) => peer.handle_envelope(envelope),
        }
    }

    /// The current peer-visible snapshot: freshly built on the host, the
    /// last received one on a peer.
    pub fn snapshot(&self) -> NetSnapshot {
        match self {
            Self::Host(host) => host.snapshot(),
            Self::Peer(peer) => peer.snapshot().clone(),
        }
    }

    /// The host session, if this is one.
    pub fn as_host_mut(&mut self) -> Option<&mut HostSession> {
        match self {
            Self::Host(host) => Some(host.as_mut()),
            Self::Peer(_) => None,
        }
    }

    /// Take the host session out, if this is one.
    pub fn into_host(self) -> Option<Box<HostSession>> {
        match self {
            Self::Host(host) => Some(host),
            Self::Peer(_) => None,
        }
    }

    /// The peer session, if this is one.
    pub const fn as_peer(&self) -> Option<&PeerSession> {
        match self {
            Self::Host(_) => None,
            Self::Peer(peer) => Some(peer),
        }
    }
}

// =========================================================================
// Host
// =========================================================================

/// What the world-load repair pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// In-flight dates confirmed and cleared.
    pub dates_resolved: usize,
    /// Relationships that had both proposal slots set.
    pub proposals_cleared: usize,
    /// Finished pregnancies with a dangling request.
    pub pregnancies_fixed: usize,
}

impl RepairReport {
    /// Total number of repairs.
    pub const fn total(&self) -> usize {
        self.dates_resolved
            .saturating_add(self.proposals_cleared)
            .saturating_add(self.pregnancies_fixed)
    }
}

/// Host session: canonical store, persistence, live sessions, sync.
#[derive(Debug)]
pub struct HostSession {
    local_player: PlayerId,
    config: KinshipConfig,
    store: CanonicalStore,
    persistence: Persistence,
    live: LiveSessions,
    sync: HostSync,
    day: u32,
    last_work_report: String,
}

impl HostSession {
    /// The local participant.
    pub const fn local_player(&self) -> PlayerId {
        self.local_player
    }

    /// Configuration.
    pub const fn config(&self) -> &KinshipConfig {
        &self.config
    }

    /// The canonical store.
    pub const fn store(&self) -> &CanonicalStore {
        &self.store
    }

    /// Mutable canonical store, for rule engines.
    pub const fn store_mut(&mut self) -> &mut CanonicalStore {
        &mut self.store
    }

    /// Live sessions.
    pub const fn live(&self) -> &LiveSessions {
        &self.live
    }

    /// Mutable live sessions.
    pub const fn live_mut(&mut self) -> &mut LiveSessions {
        &mut self.live
    }

    /// Host sync endpoint.
    pub const fn sync(&self) -> &HostSync {
        &self.sync
    }

    /// Current day.
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Set the work summary included in the next snapshots.
    pub fn set_last_work_report(&mut self, report: impl Into<String>) {
        self.last_work_report = report.into();
    }

    /// Load canonical state, repair in-flight state, clear live sessions,
    /// and broadcast to every peer.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Db`] if the save entry cannot be loaded. A
    /// failed broadcast is logged, not returned; peers recover on the next
    /// one.
    pub fn world_loaded(&mut self) -> Result<RepairReport, SessionError> {
        self.store = self.persistence.load()?;
        self.day = self.store.view().last_processed_day;
        self.live.clear();
        let report = self.repair();
        tracing::info!(
            day = self.day,
            relationships = self.store.count::<RelationshipRecord>(),
            repairs = report.total(),
            "World loaded"
        );
        if let Err(e) = self.broadcast() {
            tracing::warn!(error = %e, "Initial broadcast failed");
        }
        Ok(report)
    }

    /// Resolve state left in flight by a crash or an unclean shutdown.
    pub fn repair(&mut self) -> RepairReport {
        let mut report = RepairReport::default();

        let active_dates: Vec<(PairKey, u32)> = self
            .store
            .iter::<DateImmersionSaveState>()
            .filter(|(_, d)| d.is_active)
            .map(|(key, d)| (key.clone(), d.start_day))
            .collect();
        for (key, start_day) in active_dates {
            if self.store.get::<RelationshipRecord>(&key).is_some() {
                self.store
                    .update::<RelationshipRecord, _, Infallible, _>(&key, "repair:date", |r| {
                        transitions::confirm_immersive_date(r, start_day);
                        Ok(())
                    })
                    .ok();
            } else {
                tracing::warn!(pair = %key, "Dropping date with no relationship");
            }
            self.store
                .remove::<DateImmersionSaveState>(&key, "repair:date");
            report.dates_resolved = report.dates_resolved.saturating_add(1);
            tracing::info!(pair = %key, start_day, "Resolved in-flight date");
        }

        let double_pending: Vec<PairKey> = self
            .store
            .iter::<RelationshipRecord>()
            .filter(|(_, r)| r.pending_dating_from.is_some() && r.pending_marriage_from.is_some())
            .map(|(key, _)| key.clone())
            .collect();
        for key in double_pending {
            self.store
                .update::<RelationshipRecord, _, Infallible, _>(&key, "repair:proposal", |r| {
                    r.pending_dating_from = None;
                    r.pending_marriage_from = None;
                    Ok(())
                })
                .ok();
            report.proposals_cleared = report.proposals_cleared.saturating_add(1);
            tracing::info!(pair = %key, "Cleared conflicting proposals");
        }

        let finished: Vec<PairKey> = self
            .store
            .iter::<PregnancyRecord>()
            .filter(|(_, p)| {
                p.is_pregnant && p.days_remaining == 0 && p.pending_try_for_baby_from.is_some()
            })
            .map(|(key, _)| key.clone())
            .collect();
        for key in finished {
            self.store
                .update::<PregnancyRecord, _, Infallible, _>(&key, "repair:pregnancy", |p| {
                    p.pending_try_for_baby_from = None;
                    Ok(())
                })
                .ok();
            report.pregnancies_fixed = report.pregnancies_fixed.saturating_add(1);
            tracing::info!(couple = %key, "Cleared request on finished pregnancy");
        }

        report
    }

    /// Build the current snapshot.
    pub fn snapshot(&self) -> NetSnapshot {
        build_snapshot(
            &self.store,
            &self.live,
            &self.config,
            self.day,
            &self.last_work_report,
        )
    }

    /// Build and broadcast the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Sync`] if the broadcast could not be sent.
    pub fn broadcast(&mut self) -> Result<(), SessionError> {
        let snapshot = self.snapshot();
        self.sync.broadcast(snapshot)?;
        Ok(())
    }

    /// Handle one inbound envelope; snapshot requests are answered with a
    /// freshly built snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Sync`] if the message was dropped or the
    /// reply failed.
    pub fn handle_envelope(&mut self, envelope: &Envelope) -> Result<(), SessionError> {
        let (store, live, config) = (&self.store, &self.live, &self.config);
        let (day, report) = (self.day, self.last_work_report.as_str());
        self.sync
            .handle(envelope, || build_snapshot(store, live, config, day, report))?;
        Ok(())
    }

    /// Record a change to canonical state; see [`Persistence::mark`].
    pub fn mark(&mut self, reason: &str, flush_now: bool) -> CheckpointOutcome {
        self.persistence.mark(&mut self.store, reason, flush_now)
    }

    /// Write canonical state if it changed since the last write.
    pub fn checkpoint(&mut self) -> CheckpointOutcome {
        self.persistence.checkpoint(&mut self.store)
    }

    /// Start a new day.
    pub fn begin_day(&mut self, day: u32) {
        self.day = day;
        tracing::debug!(day, "Day started");
    }

    /// Finish the current day: record it as processed, checkpoint when due,
    /// and broadcast.
    ///
    /// A failed checkpoint or broadcast is logged; both retry next day.
    pub fn end_day(&mut self) -> CheckpointOutcome {
        self.store.set_last_processed_day(self.day);
        let every = self.config.persistence.checkpoint_every_days.max(1);
        let outcome = if self.day.checked_rem(every) == Some(0) {
            self.checkpoint()
        } else {
            CheckpointOutcome::Clean
        };
        if let Err(e) = self.broadcast() {
            tracing::warn!(day = self.day, error = %e, "Day-end broadcast failed");
        }
        outcome
    }

    /// A participant disconnected: end their live sessions and tell peers.
    pub fn participant_left(&mut self, player: PlayerId) {
        if self.live.end_all_for(player) {
            tracing::info!(%player, "Ended live sessions of departed participant");
            if let Err(e) = self.broadcast() {
                tracing::warn!(error = %e, "Broadcast after departure failed");
            }
        }
    }
}

/// Snapshot from the host's parts, borrowed separately so the sync
/// endpoint can stay mutably borrowed.
fn build_snapshot(
    store: &CanonicalStore,
    live: &LiveSessions,
    config: &KinshipConfig,
    day: u32,
    last_work_report: &str,
) -> NetSnapshot {
    snapshot::build(&SnapshotInputs {
        view: store.view(),
        live,
        day,
        heart_scale: config.heart_scale(),
        last_work_report,
    })
}

// =========================================================================
// Peer
// =========================================================================

/// Peer session: a local snapshot and a way to ask for a new one.
#[derive(Debug)]
pub struct PeerSession {
    local_player: PlayerId,
    sync: PeerSync,
}

impl PeerSession {
    /// The local participant.
    pub const fn local_player(&self) -> PlayerId {
        self.local_player
    }

    /// The last received snapshot.
    pub const fn snapshot(&self) -> &NetSnapshot {
        self.sync.snapshot()
    }

    /// Peer sync endpoint.
    pub const fn sync(&self) -> &PeerSync {
        &self.sync
    }

    /// Reset the snapshot and request a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Sync`] if the request could not be queued.
    pub fn world_loaded(&mut self) -> Result<(), SessionError> {
        self.sync.world_loaded()?;
        tracing::info!(player = %self.local_player, "World loaded, snapshot requested");
        Ok(())
    }

    /// Handle one inbound envelope.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Sync`] if the message was dropped.
    pub fn handle_envelope(&mut self, envelope: &Envelope) -> Result<(), SessionError> {
        self.sync.handle(envelope)?;
        Ok(())
    }
}
