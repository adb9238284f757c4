//! Heart level derivation.
//!
//! Relationships accumulate raw heart points. Everything a player sees is a
//! heart *level*: points divided by `points_per_heart`, floored, with negative
//! points treated as zero and the result capped at `max_hearts`.

use serde::{Deserialize, Serialize};

/// Default points required per heart.
pub const DEFAULT_POINTS_PER_HEART: u32 = 250;

/// Default maximum heart level.
pub const DEFAULT_MAX_HEARTS: u32 = 14;

/// Tunables for converting heart points into a heart level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartScale {
    /// Points that make up one heart.
    pub points_per_heart: u32,
    /// Highest level a pair can reach.
    pub max_hearts: u32,
}

impl HeartScale {
    /// Build a scale from explicit tunables.
    pub const fn new(points_per_heart: u32, max_hearts: u32) -> Self {
        Self {
            points_per_heart,
            max_hearts,
        }
    }

    /// `min(max_hearts, max(0, points) / points_per_heart)`.
    ///
    /// A zero `points_per_heart` is a misconfiguration and yields level 0.
    pub fn level(self, points: i32) -> u32 {
        let clamped = u32::try_from(points.max(0)).unwrap_or(0);
        clamped
            .checked_div(self.points_per_heart)
            .unwrap_or(0)
            .min(self.max_hearts)
    }
}

impl Default for HeartScale {
    fn default() -> Self {
        Self::new(DEFAULT_POINTS_PER_HEART, DEFAULT_MAX_HEARTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_floors_points() {
        let scale = HeartScale::new(250, 14);
        assert_eq!(scale.level(3000), 12);
        assert_eq!(scale.level(3249), 12);
        assert_eq!(scale.level(249), 0);
    }

    #[test]
    fn level_is_capped_at_max() {
        let scale = HeartScale::new(250, 14);
        assert_eq!(scale.level(3500), 14);
        assert_eq!(scale.level(4000), 14);
        assert_eq!(scale.level(i32::MAX), 14);
    }

    #[test]
    fn negative_points_are_level_zero() {
        let scale = HeartScale::new(250, 14);
        assert_eq!(scale.level(-50), 0);
        assert_eq!(scale.level(i32::MIN), 0);
    }

    #[test]
    fn zero_points_per_heart_is_level_zero() {
        assert_eq!(HeartScale::new(0, 14).level(5000), 0);
    }
}
