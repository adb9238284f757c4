//! Error types for the host binary.
//!
//! [`HostError`] wraps every failure mode of startup so `main` can
//! propagate with `?`.

/// Top-level error for the host binary.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: kinship_core::ConfigError,
    },

    /// The save slot could not be opened.
    #[error("save slot error: {source}")]
    Db {
        /// The underlying persistence error.
        #[from]
        source: kinship_db::DbError,
    },

    /// Session construction or world load failed.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: kinship_core::SessionError,
    },

    /// The configured role cannot be run by this binary.
    #[error("unsupported role: {message}")]
    Role {
        /// Why the role was refused.
        message: String,
    },
}
