//! Persisted records owned by the canonical store.
//!
//! Every record serializes with `PascalCase` field names and tolerates
//! missing fields on read (they fall back to [`Default`]), so older save
//! files load without hand-written field-by-field parsing.

use serde::{Deserialize, Serialize};

use crate::enums::{GiftCategory, LifeStage, RelationshipState, Season};
use crate::hearts::HeartScale;
use crate::ids::{ChildId, PlayerId};
use crate::pair::{self, PairKey};

// ---------------------------------------------------------------------------
// RelationshipRecord
// ---------------------------------------------------------------------------

/// Romantic relationship between one unordered pair of participants.
///
/// At most one of `pending_dating_from` / `pending_marriage_from` is set at
/// a time. Whoever initiated the proposal is stored so the other
/// participant can accept or reject it, or the initiator can withdraw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RelationshipRecord {
    /// Canonical key of the pair.
    pub pair_key: PairKey,
    /// Lower participant id.
    pub player_a_id: PlayerId,
    /// Display name of participant A at the time of the last update.
    pub player_a_name: String,
    /// Higher participant id.
    pub player_b_id: PlayerId,
    /// Display name of participant B at the time of the last update.
    pub player_b_name: String,
    /// Current lifecycle state.
    pub state: RelationshipState,
    /// Initiator of an open dating proposal.
    pub pending_dating_from: Option<PlayerId>,
    /// Initiator of an open engagement or marriage proposal.
    pub pending_marriage_from: Option<PlayerId>,
    /// Day the pair started dating.
    pub dating_start_day: Option<u32>,
    /// Day the pair got engaged.
    pub engaged_day: Option<u32>,
    /// Day the pair married.
    pub married_day: Option<u32>,
    /// Day of the most recent state change.
    pub last_state_change_day: Option<u32>,
    /// Legacy single "last date" day written by older saves.
    pub last_immersive_date_day: Option<u32>,
    /// Day the most recent immersive date was confirmed.
    pub last_immersive_date_confirmed_day: Option<u32>,
    /// Day the most recent heart event fired.
    pub last_heart_event_day: Option<u32>,
    /// Raw heart score. Not clamped here; see [`HeartScale::level`].
    pub heart_points: i32,
    /// Number of immersive dates completed.
    pub immersive_date_count: u32,
    /// Number of gifts offered between the two.
    pub gifts_offered: u32,
    /// Number of proposals rejected.
    pub rejections: u32,
}

impl RelationshipRecord {
    /// Fresh record for a pair, participants ordered by id.
    pub fn for_pair(a: PlayerId, b: PlayerId) -> Self {
        let (low, high) = pair::order(a, b);
        Self {
            pair_key: PairKey::new(low, high),
            player_a_id: low,
            player_b_id: high,
            ..Self::default()
        }
    }

    /// Fresh record for an already-canonical key.
    pub fn for_key(key: &PairKey) -> Self {
        let mut record = key
            .players()
            .map_or_else(Self::default, |(low, high)| Self::for_pair(low, high));
        record.pair_key = key.clone();
        record
    }

    /// Whether `player` belongs to this pair.
    pub fn involves(&self, player: PlayerId) -> bool {
        self.player_a_id == player || self.player_b_id == player
    }

    /// The partner of `player`, if `player` belongs to this pair.
    pub fn partner_of(&self, player: PlayerId) -> Option<PlayerId> {
        if self.player_a_id == player {
            Some(self.player_b_id)
        } else if self.player_b_id == player {
            Some(self.player_a_id)
        } else {
            None
        }
    }

    /// Record the display name for whichever side `player` is on.
    pub fn set_name(&mut self, player: PlayerId, name: &str) {
        if self.player_a_id == player {
            name.clone_into(&mut self.player_a_name);
        } else if self.player_b_id == player {
            name.clone_into(&mut self.player_b_name);
        }
    }

    /// The open proposal's initiator, whichever slot it sits in.
    pub const fn pending_from(&self) -> Option<PlayerId> {
        match (self.pending_dating_from, self.pending_marriage_from) {
            (Some(from), _) | (None, Some(from)) => Some(from),
            (None, None) => None,
        }
    }

    /// Derived heart level under the given scale.
    pub fn heart_level(&self, scale: HeartScale) -> u32 {
        scale.level(self.heart_points)
    }

    /// Confirmed date day if set, otherwise the legacy field.
    pub const fn effective_last_date_day(&self) -> Option<u32> {
        match self.last_immersive_date_confirmed_day {
            Some(day) => Some(day),
            None => self.last_immersive_date_day,
        }
    }

    /// At most one immersive date per pair per day.
    pub fn can_start_immersive_date_today(&self, day: u32) -> bool {
        self.effective_last_date_day() != Some(day)
    }
}

// ---------------------------------------------------------------------------
// PregnancyRecord
// ---------------------------------------------------------------------------

/// Family-planning state of one couple.
///
/// Opt-in flags follow pair-key ordering: A is the lower id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PregnancyRecord {
    /// Canonical key of the couple.
    pub couple_key: PairKey,
    /// Participant A agreed to try for a baby.
    pub player_a_opt_in: bool,
    /// Participant B agreed to try for a baby.
    pub player_b_opt_in: bool,
    /// Initiator of an open "try for baby" request.
    pub pending_try_for_baby_from: Option<PlayerId>,
    /// A pregnancy is under way.
    pub is_pregnant: bool,
    /// Days until the pregnancy completes.
    pub days_remaining: u32,
    /// Days since the pregnancy began.
    pub days_elapsed: u32,
    /// Which participant is pregnant.
    pub pregnant_player_id: Option<PlayerId>,
    /// Day the pregnancy began.
    pub started_day: Option<u32>,
}

impl PregnancyRecord {
    /// Fresh record for a couple key.
    pub fn for_key(key: &PairKey) -> Self {
        Self {
            couple_key: key.clone(),
            ..Self::default()
        }
    }

    /// Both partners have opted in.
    pub const fn both_opted_in(&self) -> bool {
        self.player_a_opt_in && self.player_b_opt_in
    }

    /// The opt-in flag belonging to `player`, if they are in this couple.
    pub fn opt_in_of(&self, player: PlayerId) -> Option<bool> {
        let (low, high) = self.couple_key.players()?;
        if player == low {
            Some(self.player_a_opt_in)
        } else if player == high {
            Some(self.player_b_opt_in)
        } else {
            None
        }
    }

    /// Mutable access to the opt-in flag belonging to `player`.
    pub fn opt_in_mut(&mut self, player: PlayerId) -> Option<&mut bool> {
        let (low, high) = self.couple_key.players()?;
        if player == low {
            Some(&mut self.player_a_opt_in)
        } else if player == high {
            Some(&mut self.player_b_opt_in)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// ChildRecord
// ---------------------------------------------------------------------------

/// A child born to a couple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ChildRecord {
    /// Unique child id.
    pub id: ChildId,
    /// Child's display name.
    pub name: String,
    /// First parent's id.
    pub parent_a_id: PlayerId,
    /// First parent's display name.
    pub parent_a_name: String,
    /// Second parent's id.
    pub parent_b_id: PlayerId,
    /// Second parent's display name.
    pub parent_b_name: String,
    /// Day the child was born.
    pub born_day: u32,
    /// Age in days.
    pub age_days: u32,
    /// Current life stage.
    pub stage: LifeStage,
    /// Last day a growth tick was applied.
    pub last_growth_day: Option<u32>,
    /// Eligible to take on farm work.
    pub can_work: bool,
    /// The parents picked an adult name.
    pub adult_name_chosen: bool,
    /// The adult has been spawned into the world.
    pub adult_spawned: bool,
}

impl ChildRecord {
    /// Fresh record under a known id.
    pub fn for_id(id: ChildId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Whether `player` is one of the child's parents.
    pub fn has_parent(&self, player: PlayerId) -> bool {
        self.parent_a_id == player || self.parent_b_id == player
    }
}

// ---------------------------------------------------------------------------
// HoldingHandsPairRecord
// ---------------------------------------------------------------------------

/// Persisted holding-hands history of a pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HoldingHandsPairRecord {
    /// Canonical key of the pair.
    pub pair_key: PairKey,
    /// Day the most recent session started.
    pub last_session_start_day: Option<u32>,
    /// Number of sessions ever started.
    pub total_sessions: u32,
}

impl HoldingHandsPairRecord {
    /// Fresh record for a pair key.
    pub fn for_key(key: &PairKey) -> Self {
        Self {
            pair_key: key.clone(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// DateImmersionSaveState
// ---------------------------------------------------------------------------

/// Host-side bookkeeping of an immersive date.
///
/// The bonus-talk counters and the pair key are internal and never leave the
/// host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DateImmersionSaveState {
    /// Canonical key of the dating pair.
    pub pair_key: PairKey,
    /// Participant who started the date.
    pub player_a_id: PlayerId,
    /// Participant invited on the date.
    pub player_b_id: PlayerId,
    /// Where the date takes place.
    pub location_name: String,
    /// In-game clock time the date started, e.g. `1030` for 10:30.
    pub start_time_of_day: u32,
    /// Day the date started.
    pub start_day: u32,
    /// The date is in progress.
    pub is_active: bool,
    /// Bonus conversations held during the date.
    pub bonus_talk_count: u32,
    /// Heart points earned from bonus conversations.
    pub bonus_talk_points: i32,
}

impl DateImmersionSaveState {
    /// Fresh inactive state for a pair key.
    pub fn for_key(key: &PairKey) -> Self {
        let (a, b) = key.players().unwrap_or_default();
        Self {
            pair_key: key.clone(),
            player_a_id: a,
            player_b_id: b,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// GiftProgressRecord
// ---------------------------------------------------------------------------

/// Running count of gifts in one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GiftCounter {
    /// Gifts given in this category.
    pub count: u32,
    /// Milestones crossed in this category.
    pub milestones_crossed: u32,
}

/// Per-pair gift statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GiftProgressRecord {
    /// Canonical key of the pair.
    pub pair_key: PairKey,
    /// Ordinary gifts.
    pub baseline: GiftCounter,
    /// Gifts given during a date.
    pub date_context: GiftCounter,
    /// Favorite-item gifts.
    pub favorite: GiftCounter,
    /// Day of the most recent gift.
    pub last_gift_day: Option<u32>,
    /// Item id of the most recent gift.
    pub last_gift_item_id: Option<String>,
    /// Who gave the most recent gift.
    pub last_gift_from: Option<PlayerId>,
    /// Category of the most recent gift.
    pub last_gift_category: Option<GiftCategory>,
}

impl GiftProgressRecord {
    /// Fresh record for a pair key.
    pub fn for_key(key: &PairKey) -> Self {
        Self {
            pair_key: key.clone(),
            ..Self::default()
        }
    }

    /// The counter for a category.
    pub const fn counter(&self, category: GiftCategory) -> &GiftCounter {
        match category {
            GiftCategory::Baseline => &self.baseline,
            GiftCategory::DateContext => &self.date_context,
            GiftCategory::Favorite => &self.favorite,
        }
    }

    /// Mutable counter for a category.
    pub const fn counter_mut(&mut self, category: GiftCategory) -> &mut GiftCounter {
        match category {
            GiftCategory::Baseline => &mut self.baseline,
            GiftCategory::DateContext => &mut self.date_context,
            GiftCategory::Favorite => &mut self.favorite,
        }
    }
}

// ---------------------------------------------------------------------------
// SynergyRecord
// ---------------------------------------------------------------------------

/// Per-pair synergy meter, filled by working side by side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SynergyRecord {
    /// Canonical key of the pair.
    pub pair_key: PairKey,
    /// Current meter value.
    pub value: u32,
    /// Day the meter last changed.
    pub last_updated_day: Option<u32>,
}

impl SynergyRecord {
    /// Fresh record for a pair key.
    pub fn for_key(key: &PairKey) -> Self {
        Self {
            pair_key: key.clone(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// PlayerProfileRecord
// ---------------------------------------------------------------------------

/// Static per-participant metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PlayerProfileRecord {
    /// Participant id.
    pub player_id: PlayerId,
    /// Last known display name.
    pub display_name: String,
    /// Season of the birthday.
    pub birthday_season: Season,
    /// Day of the season of the birthday (1-28).
    pub birthday_day: u32,
    /// Item ids this participant loves to receive.
    pub favorite_gift_ids: Vec<String>,
}

impl PlayerProfileRecord {
    /// Fresh profile for a participant.
    pub fn for_player(player_id: PlayerId) -> Self {
        Self {
            player_id,
            ..Self::default()
        }
    }

    /// Whether `item_id` is one of this participant's favorites.
    pub fn is_favorite(&self, item_id: &str) -> bool {
        self.favorite_gift_ids.iter().any(|id| id == item_id)
    }
}
