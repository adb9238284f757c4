//! Registry of running carry and holding-hands sessions.
//!
//! Live sessions are never persisted. The host owns one registry, feeds it
//! to every snapshot, and empties it on world load. A participant can be in
//! at most one carry and at most one holding-hands session at a time.

use std::collections::BTreeMap;

use kinship_types::{CarrySessionState, HoldingHandsSessionState, PlayerId};

/// Why a live session could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LiveSessionError {
    /// Both sides are the same participant.
    #[error("participant {0} cannot pair with themselves")]
    SamePlayer(PlayerId),

    /// One side is already in a session of the same kind.
    #[error("participant {0} is already in a session")]
    Busy(PlayerId),
}

/// Running carry and holding-hands sessions, keyed by the leading side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveSessions {
    carries: BTreeMap<PlayerId, CarrySessionState>,
    holding_hands: BTreeMap<PlayerId, HoldingHandsSessionState>,
}

impl LiveSessions {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a carry.
    pub fn start_carry(
        &mut self,
        carrier: PlayerId,
        carried: PlayerId,
    ) -> Result<(), LiveSessionError> {
        if carrier == carried {
            return Err(LiveSessionError::SamePlayer(carrier));
        }
        for player in [carrier, carried] {
            if self.carry_of(player).is_some() {
                return Err(LiveSessionError::Busy(player));
            }
        }
        self.carries.insert(
            carrier,
            CarrySessionState {
                carrier_id: carrier,
                carried_id: carried,
                is_active: true,
            },
        );
        tracing::debug!(%carrier, %carried, "Carry started");
        Ok(())
    }

    /// End the carry `player` takes part in, from either side.
    pub fn end_carry(&mut self, player: PlayerId) -> Option<CarrySessionState> {
        let carrier = self.carry_of(player)?.carrier_id;
        let ended = self.carries.remove(&carrier);
        tracing::debug!(%carrier, "Carry ended");
        ended
    }

    /// The carry `player` takes part in.
    pub fn carry_of(&self, player: PlayerId) -> Option<&CarrySessionState> {
        self.carries
            .values()
            .find(|c| c.carrier_id == player || c.carried_id == player)
    }

    /// Start holding hands.
    pub fn start_holding_hands(
        &mut self,
        leader: PlayerId,
        follower: PlayerId,
    ) -> Result<(), LiveSessionError> {
        if leader == follower {
            return Err(LiveSessionError::SamePlayer(leader));
        }
        for player in [leader, follower] {
            if self.holding_hands_of(player).is_some() {
                return Err(LiveSessionError::Busy(player));
            }
        }
        self.holding_hands.insert(
            leader,
            HoldingHandsSessionState {
                leader_id: leader,
                follower_id: follower,
                is_active: true,
            },
        );
        tracing::debug!(%leader, %follower, "Holding hands started");
        Ok(())
    }

    /// Let go of hands for the session `player` takes part in.
    pub fn end_holding_hands(&mut self, player: PlayerId) -> Option<HoldingHandsSessionState> {
        let leader = self.holding_hands_of(player)?.leader_id;
        let ended = self.holding_hands.remove(&leader);
        tracing::debug!(%leader, "Holding hands ended");
        ended
    }

    /// The holding-hands session `player` takes part in.
    pub fn holding_hands_of(&self, player: PlayerId) -> Option<&HoldingHandsSessionState> {
        self.holding_hands
            .values()
            .find(|h| h.leader_id == player || h.follower_id == player)
    }

    /// End every session `player` takes part in, e.g. on disconnect.
    /// Returns whether anything ended.
    pub fn end_all_for(&mut self, player: PlayerId) -> bool {
        let carry = self.end_carry(player).is_some();
        let hands = self.end_holding_hands(player).is_some();
        carry || hands
    }

    /// Active carries in carrier order.
    pub fn carries(&self) -> impl Iterator<Item = &CarrySessionState> {
        self.carries.values().filter(|c| c.is_active)
    }

    /// Active holding-hands sessions in leader order.
    pub fn holding_hands(&self) -> impl Iterator<Item = &HoldingHandsSessionState> {
        self.holding_hands.values().filter(|h| h.is_active)
    }

    /// Whether no session is running.
    pub fn is_empty(&self) -> bool {
        self.carries.is_empty() && self.holding_hands.is_empty()
    }

    /// Drop every session.
    pub fn clear(&mut self) {
        self.carries.clear();
        self.holding_hands.clear();
    }
}
