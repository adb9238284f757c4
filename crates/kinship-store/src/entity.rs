//! Binding between record types and their tables in [`RomanceSaveData`].
//!
//! The [`Entity`] trait lets the store expose one generic set of operations
//! (`get`, `get_or_create`, `upsert`, `update`, `remove`) instead of a copy
//! per record type.

use std::collections::BTreeMap;

use kinship_types::{
    ChildId, ChildRecord, DateImmersionSaveState, GiftProgressRecord, HoldingHandsPairRecord,
    PairKey, PlayerId, PlayerProfileRecord, PregnancyRecord, RelationshipRecord,
    RomanceSaveData, SynergyRecord,
};

/// Kind of persisted entity, used in logs and ledger reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// [`RelationshipRecord`].
    Relationship,
    /// [`PregnancyRecord`].
    Pregnancy,
    /// [`ChildRecord`].
    Child,
    /// [`HoldingHandsPairRecord`].
    HoldingHandsHistory,
    /// [`DateImmersionSaveState`].
    Date,
    /// [`GiftProgressRecord`].
    GiftProgress,
    /// [`SynergyRecord`].
    Synergy,
    /// [`PlayerProfileRecord`].
    Profile,
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Relationship => "relationship",
            Self::Pregnancy => "pregnancy",
            Self::Child => "child",
            Self::HoldingHandsHistory => "holding_hands_history",
            Self::Date => "date",
            Self::GiftProgress => "gift_progress",
            Self::Synergy => "synergy",
            Self::Profile => "profile",
        };
        f.write_str(name)
    }
}

/// A record type stored in one table of the canonical aggregate.
pub trait Entity: Clone + PartialEq {
    /// Canonical key type of the table.
    type Key: Ord + Clone + core::fmt::Display;

    /// Which kind of entity this is.
    const KIND: EntityKind;

    /// The table holding records of this type.
    fn table(data: &RomanceSaveData) -> &BTreeMap<Self::Key, Self>;

    /// Mutable access to the table.
    fn table_mut(data: &mut RomanceSaveData) -> &mut BTreeMap<Self::Key, Self>;

    /// Default-initialized record for a key that has no entry yet.
    fn create(key: &Self::Key) -> Self;
}

/// Implements [`Entity`] for a record type.
macro_rules! impl_entity {
    ($record:ty, $key:ty, $kind:ident, $field:ident, $create:expr) => {
        impl Entity for $record {
            type Key = $key;

            const KIND: EntityKind = EntityKind::$kind;

            fn table(data: &RomanceSaveData) -> &BTreeMap<Self::Key, Self> {
                &data.$field
            }

            fn table_mut(data: &mut RomanceSaveData) -> &mut BTreeMap<Self::Key, Self> {
                &mut data.$field
            }

            fn create(key: &Self::Key) -> Self {
                $create(key)
            }
        }
    };
}

impl_entity!(RelationshipRecord, PairKey, Relationship, relationships, RelationshipRecord::for_key);
impl_entity!(PregnancyRecord, PairKey, Pregnancy, pregnancies, PregnancyRecord::for_key);
impl_entity!(ChildRecord, ChildId, Child, children, |id: &ChildId| ChildRecord::for_id(*id));
impl_entity!(
    HoldingHandsPairRecord,
    PairKey,
    HoldingHandsHistory,
    holding_hands_history,
    HoldingHandsPairRecord::for_key
);
impl_entity!(DateImmersionSaveState, PairKey, Date, dates, DateImmersionSaveState::for_key);
impl_entity!(GiftProgressRecord, PairKey, GiftProgress, gift_progress, GiftProgressRecord::for_key);
impl_entity!(SynergyRecord, PairKey, Synergy, synergy, SynergyRecord::for_key);
impl_entity!(
    PlayerProfileRecord,
    PlayerId,
    Profile,
    profiles,
    |id: &PlayerId| PlayerProfileRecord::for_player(*id)
);
