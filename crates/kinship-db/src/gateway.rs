//! Reading and writing the canonical aggregate through a [`SaveSlot`].
//!
//! # Key Schema
//!
//! | Key | Value |
//! |-----|-------|
//! | `kinship/romance-data` | JSON-serialized [`RomanceSaveData`] |

use kinship_types::{RomanceSaveData, SAVE_DATA_KEY};

use crate::error::DbError;
use crate::migrate;
use crate::slot::SaveSlot;

/// Typed access to the save entry.
pub struct SaveGateway {
    slot: Box<dyn SaveSlot>,
    key: String,
}

impl core::fmt::Debug for SaveGateway {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SaveGateway")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl SaveGateway {
    /// Gateway over `slot` using the fixed save key.
    pub fn new(slot: impl SaveSlot + 'static) -> Self {
        Self::with_key(slot, SAVE_DATA_KEY)
    }

    /// Gateway over `slot` using a custom key.
    pub fn with_key(slot: impl SaveSlot + 'static, key: &str) -> Self {
        Self {
            slot: Box::new(slot),
            key: key.to_owned(),
        }
    }

    /// The key this gateway reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the aggregate.
    ///
    /// A missing entry yields an empty aggregate. A present entry is
    /// migrated to the current format before it is deserialized.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the entry is not valid JSON or
    /// does not match the record layout, [`DbError::UnsupportedVersion`] if
    /// it was written by a newer format, and any error the slot reports.
    pub fn load(&self) -> Result<RomanceSaveData, DbError> {
        let Some(raw) = self.slot.read(&self.key)? else {
            tracing::info!(key = self.key.as_str(), "No save entry, starting empty");
            return Ok(RomanceSaveData::default());
        };

        let mut value: serde_json::Value = serde_json::from_str(&raw)?;
        let found = migrate::migrate(&mut value)?;
        let data: RomanceSaveData = serde_json::from_value(value)?;

        tracing::info!(
            key = self.key.as_str(),
            version = found,
            relationships = data.relationships.len(),
            pregnancies = data.pregnancies.len(),
            children = data.children.len(),
            "Loaded save entry"
        );
        Ok(data)
    }

    /// Serialize and write the aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if serialization fails, or any
    /// error the slot reports.
    pub fn write(&self, data: &RomanceSaveData) -> Result<(), DbError> {
        let json = serde_json::to_string(data)?;
        self.slot.write(&self.key, &json)?;
        tracing::debug!(
            key = self.key.as_str(),
            records = data.record_count(),
            bytes = json.len(),
            "Wrote save entry"
        );
        Ok(())
    }
}
