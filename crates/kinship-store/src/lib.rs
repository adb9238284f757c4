//! Canonical record store for the Kinship relationship state core.
//!
//! Only the host session owns a [`CanonicalStore`]. Rule engines mutate it
//! through the generic entity operations and the record state machines in
//! [`transitions`]; every successful mutation marks the [`DirtyLedger`],
//! which `kinship-db` consults before writing to the save slot.
//!
//! # Modules
//!
//! - [`entity`] -- Binding between record types and their tables
//! - [`store`] -- The canonical store and its mutation API
//! - [`ledger`] -- Dirty tracking for durable writes
//! - [`transitions`] -- Relationship, pregnancy, and child state machines
//! - [`identity`] -- Participant reference resolution

pub mod entity;
pub mod identity;
pub mod ledger;
pub mod store;
pub mod transitions;

pub use entity::{Entity, EntityKind};
pub use identity::{IdentityResolver, MatchKind, Participant, ParticipantDirectory, StaticDirectory};
pub use ledger::DirtyLedger;
pub use store::CanonicalStore;
pub use transitions::{GiftEvent, PregnancyProgress, RelationshipEvent, TransitionError};
