//! services/lexicon/src/error.rs
//!
//! Defines the primary error type for the entire lexicon service.

use crate::config::ConfigError;
use lexicon_core::ports::PortError;

/// The primary error type for the `lexicon` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while applying the schema migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a failure to build the outbound HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., reading an import file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_keep_their_message() {
        let error = ApiError::from(PortError::AlreadyLearned("apple".to_string()));
        assert_eq!(
            error.to_string(),
            "Service Port Error: Word already learned: apple"
        );
    }

    #[test]
    fn config_errors_name_the_variable() {
        let error = ApiError::from(ConfigError::MissingVar("DATABASE_URL".to_string()));
        assert_eq!(
            error.to_string(),
            "Configuration error: Missing the environment variable DATABASE_URL"
        );
    }
}
