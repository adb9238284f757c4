//! Symmetric pair keys.
//!
//! Every record that belongs to two participants (relationships, pregnancies,
//! gift progress, holding-hands history) is stored under a [`PairKey`]. The
//! key orders the two ids numerically before joining them, so
//! `PairKey::new(a, b) == PairKey::new(b, a)` for every `a` and `b`.
//!
//! Ids are decimal integers and never contain `_`, which makes the encoding
//! collision-free: two keys are equal only if both partners are equal.

use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;

/// Separator between the two ids in the encoded key.
const SEPARATOR: char = '_';

/// Order-independent key for an unordered pair of participants.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairKey(String);

impl PairKey {
    /// Canonicalize two participant ids into a pair key.
    ///
    /// The lower id always comes first. A participant paired with
    /// themselves produces a valid (if useless) key; rule engines are
    /// expected to reject that case before creating records.
    pub fn new(a: PlayerId, b: PlayerId) -> Self {
        let (low, high) = order(a, b);
        Self(format!("{low}{SEPARATOR}{high}"))
    }

    /// Wrap an already-encoded key, e.g. one read back from a save file.
    pub const fn from_raw(raw: String) -> Self {
        Self(raw)
    }

    /// Borrow the encoded key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the two participant ids, lower id first.
    ///
    /// Returns `None` for keys that were not produced by [`PairKey::new`].
    pub fn players(&self) -> Option<(PlayerId, PlayerId)> {
        let (low, high) = self.0.split_once(SEPARATOR)?;
        Some((low.parse().ok()?, high.parse().ok()?))
    }

    /// The participant that sorts first.
    pub fn low(&self) -> Option<PlayerId> {
        self.players().map(|(low, _)| low)
    }

    /// The participant that sorts second.
    pub fn high(&self) -> Option<PlayerId> {
        self.players().map(|(_, high)| high)
    }

    /// Whether `player` is one of the two participants.
    pub fn contains(&self, player: PlayerId) -> bool {
        self.players()
            .is_some_and(|(low, high)| low == player || high == player)
    }

    /// The partner of `player` in this pair, if `player` belongs to it.
    pub fn other(&self, player: PlayerId) -> Option<PlayerId> {
        let (low, high) = self.players()?;
        if low == player {
            Some(high)
        } else if high == player {
            Some(low)
        } else {
            None
        }
    }
}

impl core::fmt::Display for PairKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Order two ids so the lower one comes first.
pub fn order(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
    if a <= b { (a, b) } else { (b, a) }
}
