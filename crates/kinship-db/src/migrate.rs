//! Upgrading older save entries to the current format.
//!
//! Migration runs on the untyped JSON value, once, before the entry is
//! deserialized into [`RomanceSaveData`]. Each step upgrades exactly one
//! version, and steps run in sequence until the entry reaches
//! [`SAVE_FORMAT_VERSION`]. Entries claiming a newer version are rejected
//! rather than guessed at.
//!
//! | Step | Change |
//! |------|--------|
//! | 1 -> 2 | `ActivePregnancies` merged into `Pregnancies` |
//! | 2 -> 3 | `-1` "unset" sentinels replaced by `null` |
//!
//! An entry without a `Version` field, or with a version below 1, is treated
//! as version 1.
//!
//! [`RomanceSaveData`]: kinship_types::RomanceSaveData

use kinship_types::SAVE_FORMAT_VERSION;
use serde_json::{Map, Value};

use crate::error::DbError;

/// Legacy alias of the pregnancy table written by version 1.
const LEGACY_PREGNANCY_TABLE: &str = "ActivePregnancies";

/// The "unset" marker written by version 2 and earlier.
const UNSET_SENTINEL: i64 = -1;

/// Record fields that version 2 and earlier set to `-1` when unset.
const SENTINEL_FIELDS: &[&str] = &[
    "PendingDatingFrom",
    "PendingMarriageFrom",
    "DatingStartDay",
    "EngagedDay",
    "MarriedDay",
    "LastStateChangeDay",
    "LastImmersiveDateDay",
    "LastImmersiveDateConfirmedDay",
    "LastHeartEventDay",
    "PendingTryForBabyFrom",
    "PregnantPlayerId",
    "StartedDay",
    "LastGrowthDay",
    "LastSessionStartDay",
    "LastGiftDay",
    "LastGiftFrom",
    "LastUpdatedDay",
];

/// Version recorded in `value`, defaulting to 1. Versions below 1 read as 1.
pub fn version_of(value: &Value) -> u64 {
    value
        .get("Version")
        .and_then(Value::as_u64)
        .unwrap_or(1)
        .max(1)
}

/// Upgrade `value` in place to the current format. Returns the version the
/// entry was read as.
pub fn migrate(value: &mut Value) -> Result<u64, DbError> {
    let Some(root) = value.as_object_mut() else {
        return Err(DbError::Malformed(String::from(
            "save entry is not a JSON object",
        )));
    };
    let found = root
        .get("Version")
        .and_then(Value::as_u64)
        .unwrap_or(1)
        .max(1);
    let current = u64::from(SAVE_FORMAT_VERSION);
    if found > current {
        return Err(DbError::UnsupportedVersion {
            found,
            supported: SAVE_FORMAT_VERSION,
        });
    }

    let mut version = found;
    while version < current {
        match version {
            1 => v1_to_v2(root),
            _ => v2_to_v3(root),
        }
        version = version.saturating_add(1);
        root.insert(String::from("Version"), Value::from(version));
        tracing::debug!(version, "Upgraded save entry");
    }

    if found < current {
        tracing::info!(from = found, to = current, "Migrated save entry");
    }
    Ok(found)
}

/// Fold the legacy pregnancy alias into `Pregnancies`. Entries already in
/// `Pregnancies` win over alias entries with the same key.
fn v1_to_v2(root: &mut Map<String, Value>) {
    let Some(legacy) = root.remove(LEGACY_PREGNANCY_TABLE) else {
        return;
    };
    let Value::Object(legacy) = legacy else {
        tracing::warn!("Dropped non-object ActivePregnancies table");
        return;
    };
    let merged = root
        .entry("Pregnancies")
        .or_insert_with(|| Value::Object(Map::new()));
    if !merged.is_object() {
        *merged = Value::Object(Map::new());
    }
    if let Value::Object(pregnancies) = merged {
        for (key, record) in legacy {
            pregnancies.entry(key).or_insert(record);
        }
    }
}

/// Replace `-1` sentinels with `null` in every record of every table. Other
/// negative values are real ids and stay.
fn v2_to_v3(root: &mut Map<String, Value>) {
    for table in root.values_mut().filter_map(Value::as_object_mut) {
        for record in table.values_mut().filter_map(Value::as_object_mut) {
            for field in SENTINEL_FIELDS {
                if let Some(slot) = record.get_mut(*field)
                    && slot.as_i64() == Some(UNSET_SENTINEL)
                {
                    *slot = Value::Null;
                }
            }
        }
    }
}
