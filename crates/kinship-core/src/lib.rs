//! Session orchestration for the Kinship relationship state core.
//!
//! One participant hosts the canonical store; every other participant is a
//! peer holding a read-only snapshot that the host pushes to it. This crate
//! wires the store and persistence layers into a role-fixed session, builds
//! the peer-visible snapshot, speaks the snapshot sync protocol, and runs
//! the host's day loop.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `kinship-config.yaml` into
//!   strongly-typed structs.
//! - [`live`] -- Transient carry and holding-hands sessions.
//! - [`snapshot`] -- Projection of canonical state into a [`NetSnapshot`].
//! - [`protocol`] -- Wire messages and [`SyncError`].
//! - [`channel`] -- The [`Outbox`] seam and the in-process [`LocalHub`].
//! - [`host`] / [`peer`] -- The two ends of the sync protocol.
//! - [`session`] -- [`SessionBuilder`] and the role-fixed [`Session`].
//! - [`runner`] -- The host's day loop.
//!
//! [`NetSnapshot`]: kinship_types::NetSnapshot
//! [`SyncError`]: protocol::SyncError
//! [`Outbox`]: channel::Outbox
//! [`LocalHub`]: channel::LocalHub
//! [`SessionBuilder`]: session::SessionBuilder
//! [`Session`]: session::Session

pub mod channel;
pub mod config;
pub mod host;
pub mod live;
pub mod peer;
pub mod protocol;
pub mod runner;
pub mod session;
pub mod snapshot;

pub use channel::{Envelope, LocalHub, Outbox, Recipient};
pub use config::{ConfigError, KinshipConfig};
pub use live::{LiveSessionError, LiveSessions};
pub use protocol::{SyncError, SyncMessage};
pub use runner::{DayCallback, NoOpCallback, RunEndReason, RunOptions, RunResult, run_host};
pub use session::{HostSession, PeerSession, RepairReport, Session, SessionBuilder, SessionError};
