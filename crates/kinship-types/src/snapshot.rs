//! The peer-visible snapshot and its public projections.
//!
//! A [`NetSnapshot`] is what travels over the wire. It is rebuilt from
//! canonical state on the host and installed wholesale on every peer; it
//! carries no back-reference to the records it was derived from.

use serde::{Deserialize, Serialize};

use crate::enums::RelationshipState;
use crate::ids::PlayerId;
use crate::records::ChildRecord;
use crate::session::{CarrySessionState, HoldingHandsSessionState};

/// Peer-safe view of a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RelationshipPublic {
    /// Lower participant id.
    pub player_a_id: PlayerId,
    /// Participant A's display name.
    pub player_a_name: String,
    /// Higher participant id.
    pub player_b_id: PlayerId,
    /// Participant B's display name.
    pub player_b_name: String,
    /// Lifecycle state.
    pub state: RelationshipState,
    /// Initiator of an open dating proposal.
    pub pending_dating_from: Option<PlayerId>,
    /// Initiator of an open engagement or marriage proposal.
    pub pending_marriage_from: Option<PlayerId>,
    /// Raw heart points.
    pub heart_points: i32,
    /// Derived heart level.
    pub heart_level: u32,
    /// Day the pair started dating.
    pub dating_start_day: Option<u32>,
    /// Day the pair got engaged.
    pub engaged_day: Option<u32>,
    /// Day the pair married.
    pub married_day: Option<u32>,
    /// Number of immersive dates completed.
    pub immersive_date_count: u32,
    /// An immersive date can still be started on the snapshot's day.
    pub date_available_today: bool,
}

impl RelationshipPublic {
    /// Whether `player` belongs to this pair.
    pub fn involves(&self, player: PlayerId) -> bool {
        self.player_a_id == player || self.player_b_id == player
    }
}

/// Peer-safe view of a couple's pregnancy state.
///
/// Individual opt-in flags are withheld; peers only learn whether both
/// partners have agreed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PregnancyPublic {
    /// Lower participant id.
    pub player_a_id: PlayerId,
    /// Higher participant id.
    pub player_b_id: PlayerId,
    /// Both partners opted in.
    pub both_opted_in: bool,
    /// Initiator of an open "try for baby" request.
    pub pending_try_for_baby_from: Option<PlayerId>,
    /// A pregnancy is under way.
    pub is_pregnant: bool,
    /// Days until the pregnancy completes.
    pub days_remaining: u32,
    /// Which participant is pregnant.
    pub pregnant_player_id: Option<PlayerId>,
}

/// Peer-safe view of an immersive date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DateImmersionPublicState {
    /// Participant who started the date.
    pub player_a_id: PlayerId,
    /// Participant invited on the date.
    pub player_b_id: PlayerId,
    /// Where the date takes place.
    pub location_name: String,
    /// In-game clock time the date started.
    pub start_time_of_day: u32,
    /// Day the date started.
    pub start_day: u32,
    /// The date is in progress.
    pub is_active: bool,
}

/// Everything a peer is allowed to see, as of one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NetSnapshot {
    /// Day number the snapshot was built for.
    pub day: u32,
    /// Relationships in pair-key order.
    pub relationships: Vec<RelationshipPublic>,
    /// Pregnancy states in couple-key order.
    pub pregnancies: Vec<PregnancyPublic>,
    /// Children in id order.
    pub children: Vec<ChildRecord>,
    /// Running carry sessions.
    pub carries: Vec<CarrySessionState>,
    /// Running holding-hands sessions.
    pub holding_hands: Vec<HoldingHandsSessionState>,
    /// The active immersive date, if any.
    pub active_date: Option<DateImmersionPublicState>,
    /// Free-text summary of the last day's work.
    pub last_work_report: String,
}

impl NetSnapshot {
    /// Look up the relationship between two participants.
    pub fn relationship(&self, a: PlayerId, b: PlayerId) -> Option<&RelationshipPublic> {
        self.relationships
            .iter()
            .find(|r| r.involves(a) && r.involves(b))
    }

    /// Children of a participant.
    pub fn children_of(&self, parent: PlayerId) -> impl Iterator<Item = &ChildRecord> {
        self.children.iter().filter(move |c| c.has_parent(parent))
    }

    /// Whether `player` is currently carrying or being carried.
    pub fn is_in_carry(&self, player: PlayerId) -> bool {
        self.carries
            .iter()
            .any(|c| c.carrier_id == player || c.carried_id == player)
    }
}
