//! Error types for the persistence layer.
//!
//! All errors are propagated via [`DbError`], which wraps the underlying
//! I/O and JSON errors and adds the save-format failures this crate detects
//! itself.

/// Errors that can occur in the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The save entry was written by a newer format than this build reads.
    #[error("Unsupported save format version {found} (newest supported is {supported})")]
    UnsupportedVersion {
        /// Version found in the entry.
        found: u64,
        /// Newest version this build understands.
        supported: u32,
    },

    /// The save entry is valid JSON but not a save record.
    #[error("Malformed save entry: {0}")]
    Malformed(String),

    /// The save slot refused the operation.
    #[error("Save slot failure: {0}")]
    Slot(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_version_display() {
        let err = DbError::UnsupportedVersion {
            found: 9,
            supported: 3,
        };
        let msg = format!("{err}");
        assert!(msg.contains('9'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::other("disk full");
        let err = DbError::from(io);
        assert!(format!("{err}").contains("disk full"));
    }
}
