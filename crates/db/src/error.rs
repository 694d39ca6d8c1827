//! Storage error type.

use sea_orm::{DbErr, SqlErr};

use kasa_core::LedgerError;

/// Errors raised by a [`crate::store::LedgerStore`] backend.
///
/// Conflicts are retried by the services and only reach callers as
/// `CONCURRENT_UPDATE_CONFLICT`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A version-checked write found the row changed since it was read.
    #[error("Version conflict on {0}")]
    VersionConflict(String),

    /// A unique constraint rejected the write.
    #[error("Duplicate {0}")]
    Duplicate(String),

    /// A stored row could not be mapped back into a domain value.
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// Domain rule failure raised inside a retried attempt.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    /// Returns true if re-reading and retrying the whole attempt may succeed.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::VersionConflict(_) | Self::Duplicate(_) => true,
            Self::Database(err) => matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))),
            Self::Corrupt(_) | Self::Ledger(_) => false,
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Ledger(err) => err,
            other => Self::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_are_retryable() {
        assert!(StoreError::VersionConflict("account".into()).is_conflict());
        assert!(StoreError::Duplicate("transaction number".into()).is_conflict());
        assert!(!StoreError::Corrupt("bad currency".into()).is_conflict());
        assert!(!StoreError::Ledger(LedgerError::ConfirmationRequired).is_conflict());
    }

    #[test]
    fn test_ledger_errors_pass_through() {
        let err: LedgerError = StoreError::Ledger(LedgerError::ConfirmationRequired).into();
        assert!(matches!(err, LedgerError::ConfirmationRequired));

        let err: LedgerError = StoreError::Corrupt("x".into()).into();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }
}
