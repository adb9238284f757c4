//! Live session states.
//!
//! These exist only while a carry or holding-hands session is running. They
//! are never written to the save slot and are dropped on session end or
//! world reset; peers see them verbatim in every snapshot.

use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;

/// One participant carrying another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CarrySessionState {
    /// Participant doing the carrying.
    pub carrier_id: PlayerId,
    /// Participant being carried.
    pub carried_id: PlayerId,
    /// The session is running.
    pub is_active: bool,
}

/// One participant leading another by the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HoldingHandsSessionState {
    /// Participant walking in front.
    pub leader_id: PlayerId,
    /// Participant following.
    pub follower_id: PlayerId,
    /// The session is running.
    pub is_active: bool,
}
