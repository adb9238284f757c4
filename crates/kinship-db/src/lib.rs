//! Persistence layer for the Kinship relationship state core.
//!
//! The host's canonical store is saved as one JSON entry in a save slot
//! supplied by the hosting game. This crate provides the slot abstraction,
//! the typed gateway over it, format migration for older entries, and the
//! dirty-gated checkpoint discipline.
//!
//! # Architecture
//!
//! ```text
//! CanonicalStore --(dirty?)--> Persistence --> SaveGateway --> SaveSlot
//!                                                  |              |-- MemorySlot
//!                                                  |              +-- JsonFileSlot
//!                                                  +-- migrate (on load)
//! ```
//!
//! # Modules
//!
//! - [`slot`] -- Save slot trait and implementations
//! - [`gateway`] -- Typed load/write of the aggregate
//! - [`migrate`] -- Format version upgrades
//! - [`persistence`] -- Mark/checkpoint write gating
//! - [`error`] -- Shared error types

pub mod error;
pub mod gateway;
pub mod migrate;
pub mod persistence;
pub mod slot;

// Re-export primary types for convenience.
pub use error::DbError;
pub use gateway::SaveGateway;
pub use persistence::{CheckpointOutcome, Persistence};
pub use slot::{JsonFileSlot, MemorySlot, SaveSlot};
