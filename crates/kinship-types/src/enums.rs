//! Enumeration types shared by records, snapshots, and sessions.

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a relationship between two participants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RelationshipState {
    /// No romantic relationship.
    #[default]
    None,
    /// The pair accepted a dating proposal.
    Dating,
    /// The pair accepted an engagement proposal.
    Engaged,
    /// The pair accepted a marriage proposal.
    Married,
}

impl RelationshipState {
    /// The state an accepted proposal moves the pair into.
    ///
    /// Returns `None` once the pair is married.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::None => Some(Self::Dating),
            Self::Dating => Some(Self::Engaged),
            Self::Engaged => Some(Self::Married),
            Self::Married => None,
        }
    }

    /// Whether a proposal out of this state uses the dating pending slot.
    ///
    /// Engagement and marriage proposals share the marriage slot.
    pub const fn proposes_dating(self) -> bool {
        matches!(self, Self::None)
    }
}

/// Four-stage life progression of a child. Ordered, never regresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LifeStage {
    /// Newborn.
    #[default]
    Infant,
    /// Walking and talking.
    Child,
    /// Adolescent.
    Teen,
    /// Grown up; eligible for an adult name and a world spawn.
    Adult,
}

impl LifeStage {
    /// The following stage, or `None` for adults.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Infant => Some(Self::Child),
            Self::Child => Some(Self::Teen),
            Self::Teen => Some(Self::Adult),
            Self::Adult => None,
        }
    }
}

/// Authority a participant holds for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Holds the canonical store and the save slot.
    Host,
    /// Holds a replaceable snapshot only.
    Peer,
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Host => f.write_str("host"),
            Self::Peer => f.write_str("peer"),
        }
    }
}

/// Category a gift is counted under for progress tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GiftCategory {
    /// Any gift outside the other two categories.
    Baseline,
    /// A gift handed over during an immersive date.
    DateContext,
    /// One of the recipient's favorite items.
    Favorite,
}

/// Calendar season, used for birthdays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    /// First season of the year.
    #[default]
    Spring,
    /// Second season.
    Summer,
    /// Third season.
    Fall,
    /// Fourth season.
    Winter,
}
