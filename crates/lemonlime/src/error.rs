//! Error Types
//!
//! Recoverable failures surfaced by the synchronizer. Soft outcomes such as
//! popping an unknown event are not errors; they are logged and reported
//! through the outcome enums in [`crate::domain::registry`].

use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Domain Errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Synchronizer domain errors
///
/// Every variant is local to the call that produced it. None of them
/// leave the synchronizer in a degraded state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// Event creation is gated off
    ///
    /// Re-enable with `Synchronizer::set_publishing(true)` and retry.
    #[error("cannot create new event: publishing is disabled")]
    PublishingDisabled,

    /// No registry entry exists for the requested key
    #[error("member not found: {0}")]
    MemberNotFound(String),

    /// Clock parameters violate an invariant
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for synchronizer results
pub type SyncResult<T> = Result<T, SyncError>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Configuration Errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Failures while loading a [`crate::SynchronizerConfig`] from disk
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the config schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The file parsed but describes an impossible clock
    #[error(transparent)]
    Invalid(#[from] SyncError),
}
