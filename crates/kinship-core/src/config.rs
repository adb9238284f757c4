//! Configuration loading and typed config structures for Kinship.
//!
//! The configuration lives in `kinship-config.yaml`. Gameplay toggles and
//! tunables sit at the top level of the file, the way the hosting game has
//! always exposed them; ambient host settings are grouped under
//! `persistence`, `session`, and `logging`.
//!
//! The core reads only the heart, gift, and synergy tunables. Everything
//! else is carried for the rule engines.

use std::path::{Path, PathBuf};

use kinship_types::hearts::{DEFAULT_MAX_HEARTS, DEFAULT_POINTS_PER_HEART};
use kinship_types::{HeartScale, PlayerId, Role};
use serde::Deserialize;

/// Environment variable overriding `persistence.save_dir`.
pub const SAVE_DIR_ENV: &str = "KINSHIP_SAVE_DIR";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but makes no sense.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KinshipConfig {
    /// Participants may carry each other.
    #[serde(default = "default_true")]
    pub enable_carry: bool,

    /// Participants may hold hands.
    #[serde(default = "default_true")]
    pub enable_holding_hands: bool,

    /// Couples may try for a baby.
    #[serde(default = "default_true")]
    pub enable_pregnancy: bool,

    /// Children grow up and appear in the world.
    #[serde(default = "default_true")]
    pub enable_children: bool,

    /// Immersive dates are available.
    #[serde(default = "default_true")]
    pub enable_immersive_dates: bool,

    /// Heart points that make up one heart.
    #[serde(default = "default_points_per_heart")]
    pub points_per_heart: u32,

    /// Highest heart level.
    #[serde(default = "default_max_hearts")]
    pub max_hearts: u32,

    /// Length of a pregnancy in days.
    #[serde(default = "default_pregnancy_duration_days")]
    pub pregnancy_duration_days: u32,

    /// Vertical offset, in pixels, of a carried participant.
    #[serde(default = "default_carry_offset")]
    pub carry_offset: f32,

    /// Distance, in tiles, beyond which held hands let go.
    #[serde(default = "default_holding_hands_max_distance")]
    pub holding_hands_max_distance: f32,

    /// A gift milestone is crossed every this many gifts per category.
    #[serde(default = "default_gift_milestone_every")]
    pub gift_milestone_every: u32,

    /// Cap of the per-pair synergy meter.
    #[serde(default = "default_synergy_max")]
    pub synergy_max: u32,

    /// Key binding that starts or ends a carry.
    #[serde(default = "default_carry_hotkey")]
    pub carry_hotkey: String,

    /// Key binding that starts or ends holding hands.
    #[serde(default = "default_holding_hands_hotkey")]
    pub holding_hands_hotkey: String,

    /// Where save data lives.
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Session role and run loop settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for KinshipConfig {
    fn default() -> Self {
        Self {
            enable_carry: true,
            enable_holding_hands: true,
            enable_pregnancy: true,
            enable_children: true,
            enable_immersive_dates: true,
            points_per_heart: default_points_per_heart(),
            max_hearts: default_max_hearts(),
            pregnancy_duration_days: default_pregnancy_duration_days(),
            carry_offset: default_carry_offset(),
            holding_hands_max_distance: default_holding_hands_max_distance(),
            gift_milestone_every: default_gift_milestone_every(),
            synergy_max: default_synergy_max(),
            carry_hotkey: default_carry_hotkey(),
            holding_hands_hotkey: default_holding_hands_hotkey(),
            persistence: PersistenceConfig::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl KinshipConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `KINSHIP_SAVE_DIR` overrides `persistence.save_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.persistence.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the core cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.points_per_heart == 0 {
            return Err(ConfigError::Invalid {
                field: "points_per_heart",
                reason: String::from("must be at least 1"),
            });
        }
        if self.pregnancy_duration_days == 0 {
            return Err(ConfigError::Invalid {
                field: "pregnancy_duration_days",
                reason: String::from("must be at least 1"),
            });
        }
        if self.session.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "session.tick_interval_ms",
                reason: String::from("must be at least 1"),
            });
        }
        Ok(())
    }

    /// Heart level tunables.
    pub const fn heart_scale(&self) -> HeartScale {
        HeartScale::new(self.points_per_heart, self.max_hearts)
    }
}

/// Save location configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// Directory holding the save slot files.
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,

    /// Days between scheduled checkpoints.
    #[serde(default = "default_checkpoint_every_days")]
    pub checkpoint_every_days: u32,
}

impl PersistenceConfig {
    /// Apply `KINSHIP_SAVE_DIR` if set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(SAVE_DIR_ENV) {
            self.save_dir = PathBuf::from(val);
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            checkpoint_every_days: default_checkpoint_every_days(),
        }
    }
}

/// Session role and run loop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Whether this process hosts or joins.
    #[serde(default = "default_role")]
    pub role: Role,

    /// Id of the local participant.
    #[serde(default)]
    pub local_player_id: PlayerId,

    /// Real-time milliseconds per in-game day.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many days. Zero runs until shut down.
    #[serde(default)]
    pub max_days: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            role: default_role(),
            local_player_id: PlayerId::default(),
            tick_interval_ms: default_tick_interval_ms(),
            max_days: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_true() -> bool {
    true
}

const fn default_points_per_heart() -> u32 {
    DEFAULT_POINTS_PER_HEART
}

const fn default_max_hearts() -> u32 {
    DEFAULT_MAX_HEARTS
}

const fn default_pregnancy_duration_days() -> u32 {
    14
}

const fn default_carry_offset() -> f32 {
    -48.0
}

const fn default_holding_hands_max_distance() -> f32 {
    3.0
}

const fn default_gift_milestone_every() -> u32 {
    10
}

const fn default_synergy_max() -> u32 {
    100
}

fn default_carry_hotkey() -> String {
    String::from("K")
}

fn default_holding_hands_hotkey() -> String {
    String::from("H")
}

fn default_save_dir() -> PathBuf {
    PathBuf::from("saves")
}

const fn default_checkpoint_every_days() -> u32 {
    1
}

const fn default_role() -> Role {
    Role::Host
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_game_defaults() {
        let config = KinshipConfig::default();
        assert_eq!(config.points_per_heart, 250);
        assert_eq!(config.max_hearts, 14);
        assert_eq!(config.pregnancy_duration_days, 14);
        assert_eq!(config.gift_milestone_every, 10);
        assert!(config.enable_immersive_dates);
        assert_eq!(config.session.role, Role::Host);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = KinshipConfig::parse("{}").ok();
        assert_eq!(config, Some(KinshipConfig::default()));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config = KinshipConfig::parse(include_str!("../../../kinship-config.yaml")).ok();
        let mut expected = KinshipConfig::default();
        expected.session.local_player_id = PlayerId(1);
        assert_eq!(config, Some(expected));
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
enable_carry: false
enable_holding_hands: true
enable_pregnancy: false
enable_children: false
enable_immersive_dates: true
points_per_heart: 200
max_hearts: 10
pregnancy_duration_days: 7
carry_offset: -32.5
holding_hands_max_distance: 2.0
gift_milestone_every: 5
synergy_max: 50
carry_hotkey: "J"
holding_hands_hotkey: "U"

persistence:
  save_dir: "/tmp/kinship"
  checkpoint_every_days: 2

session:
  role: peer
  local_player_id: 7781
  tick_interval_ms: 250
  max_days: 28

logging:
  level: "debug"
  json: true
"#;
        let config = KinshipConfig::parse(yaml).ok();
        assert!(config.is_some());
        let Some(config) = config else { return };

        assert!(!config.enable_carry);
        assert!(!config.enable_pregnancy);
        assert_eq!(config.heart_scale(), HeartScale::new(200, 10));
        assert_eq!(config.pregnancy_duration_days, 7);
        assert_eq!(config.carry_hotkey, "J");
        assert_eq!(config.persistence.save_dir, PathBuf::from("/tmp/kinship"));
        assert_eq!(config.session.role, Role::Peer);
        assert_eq!(config.session.local_player_id, PlayerId(7781));
        assert_eq!(config.session.max_days, 28);
        assert!(config.logging.json);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let yaml = "session:\n  max_days: 3\n";
        let config = KinshipConfig::parse(yaml).unwrap_or_default();
        assert_eq!(config.session.max_days, 3);
        assert_eq!(config.session.tick_interval_ms, 1000);
        assert_eq!(config.persistence.save_dir, PathBuf::from("saves"));
    }

    #[test]
    fn zero_points_per_heart_is_invalid() {
        let result = KinshipConfig::parse("points_per_heart: 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "points_per_heart",
                ..
            })
        ));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let result = KinshipConfig::parse("session: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = KinshipConfig::from_file(Path::new("/nonexistent/kinship-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
