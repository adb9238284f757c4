//! The canonical store aggregate as written to the save slot.
//!
//! # Format history
//!
//! | Version | Change |
//! |---------|--------|
//! | 1 | initial format; pregnancies mirrored under `ActivePregnancies` |
//! | 2 | single `Pregnancies` map, alias dropped |
//! | 3 | unset day counters stored as `null` instead of `-1` |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{ChildId, PlayerId};
use crate::pair::PairKey;
use crate::records::{
    ChildRecord, DateImmersionSaveState, GiftProgressRecord, HoldingHandsPairRecord,
    PlayerProfileRecord, PregnancyRecord, RelationshipRecord, SynergyRecord,
};

/// Current save format version.
pub const SAVE_FORMAT_VERSION: u32 = 3;

/// Fixed key the aggregate is stored under in the host's save slot.
pub const SAVE_DATA_KEY: &str = "kinship/romance-data";

/// Every persisted record, keyed canonically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RomanceSaveData {
    /// Format version tag.
    pub version: u32,
    /// Last day the rule engines finished processing.
    pub last_processed_day: u32,
    /// Relationships by pair key.
    pub relationships: BTreeMap<PairKey, RelationshipRecord>,
    /// Pregnancy state by couple key.
    pub pregnancies: BTreeMap<PairKey, PregnancyRecord>,
    /// Children by id.
    pub children: BTreeMap<ChildId, ChildRecord>,
    /// Holding-hands history by pair key.
    pub holding_hands_history: BTreeMap<PairKey, HoldingHandsPairRecord>,
    /// Immersive date bookkeeping by pair key.
    pub dates: BTreeMap<PairKey, DateImmersionSaveState>,
    /// Gift statistics by pair key.
    pub gift_progress: BTreeMap<PairKey, GiftProgressRecord>,
    /// Synergy meters by pair key.
    pub synergy: BTreeMap<PairKey, SynergyRecord>,
    /// Participant profiles by id.
    pub profiles: BTreeMap<PlayerId, PlayerProfileRecord>,
}

impl Default for RomanceSaveData {
    fn default() -> Self {
        Self {
            version: SAVE_FORMAT_VERSION,
            last_processed_day: 0,
            relationships: BTreeMap::new(),
            pregnancies: BTreeMap::new(),
            children: BTreeMap::new(),
            holding_hands_history: BTreeMap::new(),
            dates: BTreeMap::new(),
            gift_progress: BTreeMap::new(),
            synergy: BTreeMap::new(),
            profiles: BTreeMap::new(),
        }
    }
}

impl RomanceSaveData {
    /// Whether the aggregate holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
            && self.pregnancies.is_empty()
            && self.children.is_empty()
            && self.holding_hands_history.is_empty()
            && self.dates.is_empty()
            && self.gift_progress.is_empty()
            && self.synergy.is_empty()
            && self.profiles.is_empty()
    }

    /// Total number of records across all maps.
    pub fn record_count(&self) -> usize {
        [
            self.relationships.len(),
            self.pregnancies.len(),
            self.children.len(),
            self.holding_hands_history.len(),
            self.dates.len(),
            self.gift_progress.len(),
            self.synergy.len(),
            self.profiles.len(),
        ]
        .iter()
        .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_current_version_and_empty() {
        let data = RomanceSaveData::default();
        assert_eq!(data.version, SAVE_FORMAT_VERSION);
        assert!(data.is_empty());
        assert_eq!(data.record_count(), 0);
    }

    #[test]
    fn empty_object_reads_as_default() {
        let data: Result<RomanceSaveData, _> = serde_json::from_str("{}");
        assert_eq!(data.ok(), Some(RomanceSaveData::default()));
    }

    #[test]
    fn version_field_is_pascal_case() {
        let json = serde_json::to_value(RomanceSaveData::default()).ok();
        let version = json
            .as_ref()
            .and_then(|v| v.get("Version"))
            .and_then(serde_json::Value::as_u64);
        assert_eq!(version, Some(u64::from(SAVE_FORMAT_VERSION)));
    }
}
