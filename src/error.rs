//! Error types for the rating seeder
//!
//! Rating computation reports failures through [`SeedError`] so callers can
//! tell a validation problem apart from a broken configuration. Application
//! plumbing (config loading, batch orchestration, the CLI) uses anyhow.

/// Result type alias for application-level code
pub type Result<T> = anyhow::Result<T>;

/// Result type alias for the typed rating pipeline
pub type SeedResult<T> = std::result::Result<T, SeedError>;

/// Custom error types for rating seeding
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeedError {
    #[error("Invalid player data: {reason}")]
    InvalidPlayerData { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl SeedError {
    /// Whether this error came from validating player input
    pub fn is_validation(&self) -> bool {
        matches!(self, SeedError::InvalidPlayerData { .. })
    }
}
