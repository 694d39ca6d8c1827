//! Process-level error types.
//!
//! Ledger operations report `LedgerError` from `kasa-core`; `AppError` only
//! covers what can go wrong before the ledger is running.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Startup failures.
#[derive(Debug, Error)]
pub enum AppError {
    /// A configuration source could not be read or deserialized.
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    /// Configuration loaded but violates a cross-field constraint.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl AppError {
    /// Returns the error code used in startup logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Load(_) => "CONFIGURATION_ERROR",
            Self::Invalid(_) => "INVALID_CONFIGURATION",
        }
    }
}
