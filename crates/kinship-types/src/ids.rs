//! Type-safe identifier wrappers.
//!
//! Participants are identified by the multiplayer unique id the session layer
//! hands out (a signed 64-bit integer). Children are entities this core
//! creates itself, so they get a UUID v7 (time-ordered) identifier.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a session participant (host or peer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl PlayerId {
    /// Return the raw multiplayer id.
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PlayerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl core::str::FromStr for PlayerId {
    type Err = core::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a child born to a couple.
    ChildId
}
