//! Shared type definitions for the Kinship relationship state core.
//!
//! This crate is the single source of truth for every record the host
//! persists and every payload a peer receives. It holds no behavior beyond
//! small derived queries; mutation lives in `kinship-store`, persistence in
//! `kinship-db`, and synchronization in `kinship-core`.
//!
//! # Modules
//!
//! - [`ids`] -- Participant and child identifiers
//! - [`pair`] -- Symmetric pair keys for two-participant records
//! - [`enums`] -- Relationship states, life stages, roles, gift categories
//! - [`hearts`] -- Heart level derivation from raw points
//! - [`records`] -- Persisted entity records
//! - [`session`] -- Live, never-persisted session states
//! - [`save`] -- The canonical store aggregate and its format version
//! - [`snapshot`] -- The peer-visible snapshot and public projections

pub mod enums;
pub mod hearts;
pub mod ids;
pub mod pair;
pub mod records;
pub mod save;
pub mod session;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use enums::{GiftCategory, LifeStage, RelationshipState, Role, Season};
pub use hearts::HeartScale;
pub use ids::{ChildId, PlayerId};
pub use pair::PairKey;
pub use records::{
    ChildRecord, DateImmersionSaveState, GiftCounter, GiftProgressRecord, HoldingHandsPairRecord,
    PlayerProfileRecord, PregnancyRecord, RelationshipRecord, SynergyRecord,
};
pub use save::{RomanceSaveData, SAVE_DATA_KEY, SAVE_FORMAT_VERSION};
pub use session::{CarrySessionState, HoldingHandsSessionState};
pub use snapshot::{DateImmersionPublicState, NetSnapshot, PregnancyPublic, RelationshipPublic};
