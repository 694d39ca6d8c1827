//! Ledger error types.
//!
//! Every failure an operation can report at the boundary lives here, grouped
//! the way callers handle them: validation, not-found, conflict, dependency,
//! irreversible-operation guards and storage.

use rust_decimal::Decimal;
use thiserror::Error;

use kasa_shared::types::{AccountId, Currency, PayableId, PersonnelId, TransactionId};

use super::types::TransactionStatus;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Amount must be strictly positive.
    #[error("Amount must be greater than zero, got {0}")]
    InvalidAmount(Decimal),

    /// Currency is not enabled in this deployment.
    #[error("Currency {0} is not enabled")]
    InvalidCurrency(Currency),

    /// The account cannot hold the requested currency.
    #[error("Account {account_id} does not support currency {currency}")]
    UnsupportedCurrency {
        /// The account ID.
        account_id: AccountId,
        /// The rejected currency.
        currency: Currency,
    },

    /// Account creation or update input is inconsistent.
    #[error("Invalid account: {0}")]
    InvalidAccountSpec(String),

    /// Transaction input is inconsistent with its type.
    #[error("Invalid transaction: {0}")]
    InvalidTransactionSpec(String),

    /// Category is unknown or not allowed for the transaction type.
    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    /// Transfer input is inconsistent.
    #[error("Invalid transfer: {0}")]
    InvalidTransfer(String),

    /// Source and target currencies must be different.
    #[error("Source and target currencies must be different")]
    SameCurrencyExchange,

    /// Exchanges only happen inside a multi-currency account.
    #[error("Account {0} is single-currency; exchanges need a multi-currency account")]
    ExchangeRequiresMulti(AccountId),

    /// Exchange rate must be positive.
    #[error("Exchange rate must be positive")]
    InvalidExchangeRate,

    /// A debit would take a balance slot below zero.
    #[error(
        "Insufficient balance on account {account_id} in {currency}: available {available}, required {required}"
    )]
    InsufficientBalance {
        /// The account ID.
        account_id: AccountId,
        /// The balance slot currency.
        currency: Currency,
        /// Balance before the debit.
        available: Decimal,
        /// Amount the debit needed.
        required: Decimal,
    },

    /// Personnel, salary, advance or payable input is inconsistent.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Requested status change is not allowed.
    #[error("Cannot move transaction from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: TransactionStatus,
        /// Requested status.
        to: TransactionStatus,
    },

    // ========== Not Found ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Personnel record not found.
    #[error("Personnel not found: {0}")]
    PersonnelNotFound(PersonnelId),

    /// Payable not found.
    #[error("Payable not found: {0}")]
    PayableNotFound(PayableId),

    /// Maintenance target names no known collection.
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    // ========== Account State ==========
    /// Account is inactive and cannot be used.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    /// Another active account is already the default for this currency.
    #[error("Another active account is already the default for {0}")]
    DuplicateDefault(Currency),

    /// Account still holds money.
    #[error("Account {0} still has a non-zero balance")]
    AccountHasBalance(AccountId),

    /// Payable has no open amount left.
    #[error("Payable {0} is already paid")]
    PayableAlreadyPaid(PayableId),

    // ========== Concurrency Errors ==========
    /// Optimistic retries were exhausted.
    #[error("Concurrent update conflict after {attempts} attempts, please retry")]
    ConcurrentUpdateConflict {
        /// Attempts made before giving up.
        attempts: u32,
    },

    // ========== Dependency Errors ==========
    /// No usable exchange rate.
    #[error("No exchange rate available for {from} to {to}")]
    RateUnavailable {
        /// Source currency.
        from: Currency,
        /// Target currency.
        to: Currency,
    },

    // ========== Guards ==========
    /// Destructive operation attempted without a valid confirmation token.
    #[error("A valid confirmation token is required for this operation")]
    ConfirmationRequired,

    // ========== Storage Errors ==========
    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidCurrency(_) => "INVALID_CURRENCY",
            Self::UnsupportedCurrency { .. } => "UNSUPPORTED_CURRENCY",
            Self::InvalidAccountSpec(_) => "INVALID_ACCOUNT_SPEC",
            Self::InvalidTransactionSpec(_) => "INVALID_TRANSACTION_SPEC",
            Self::InvalidCategory(_) => "INVALID_CATEGORY",
            Self::InvalidTransfer(_) => "INVALID_TRANSFER",
            Self::SameCurrencyExchange => "SAME_CURRENCY_EXCHANGE",
            Self::ExchangeRequiresMulti(_) => "EXCHANGE_REQUIRES_MULTI",
            Self::InvalidExchangeRate => "INVALID_EXCHANGE_RATE",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::InvalidRecord(_) => "INVALID_RECORD",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::PersonnelNotFound(_) => "PERSONNEL_NOT_FOUND",
            Self::PayableNotFound(_) => "PAYABLE_NOT_FOUND",
            Self::UnknownCollection(_) => "UNKNOWN_COLLECTION",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::DuplicateDefault(_) => "DUPLICATE_DEFAULT",
            Self::AccountHasBalance(_) => "ACCOUNT_HAS_BALANCE",
            Self::PayableAlreadyPaid(_) => "PAYABLE_ALREADY_PAID",
            Self::ConcurrentUpdateConflict { .. } => "CONCURRENT_UPDATE_CONFLICT",
            Self::RateUnavailable { .. } => "RATE_UNAVAILABLE",
            Self::ConfirmationRequired => "CONFIRMATION_REQUIRED",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InvalidAmount(_)
            | Self::InvalidCurrency(_)
            | Self::UnsupportedCurrency { .. }
            | Self::InvalidAccountSpec(_)
            | Self::InvalidTransactionSpec(_)
            | Self::InvalidCategory(_)
            | Self::InvalidTransfer(_)
            | Self::SameCurrencyExchange
            | Self::ExchangeRequiresMulti(_)
            | Self::InvalidExchangeRate
            | Self::InvalidRecord(_)
            | Self::AccountInactive(_) => 400,

            // 403 Forbidden - guarded operations
            Self::ConfirmationRequired => 403,

            // 404 Not Found
            Self::AccountNotFound(_)
            | Self::TransactionNotFound(_)
            | Self::PersonnelNotFound(_)
            | Self::PayableNotFound(_)
            | Self::UnknownCollection(_) => 404,

            // 409 Conflict - state and concurrency errors
            Self::DuplicateDefault(_)
            | Self::AccountHasBalance(_)
            | Self::PayableAlreadyPaid(_)
            | Self::InvalidStatusTransition { .. }
            | Self::ConcurrentUpdateConflict { .. } => 409,

            // 422 Unprocessable - well-formed but not affordable
            Self::InsufficientBalance { .. } => 422,

            // 503 Service Unavailable - dependency down
            Self::RateUnavailable { .. } => 503,

            // 500 Internal Server Error
            Self::Storage(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true if the caller may retry the whole operation unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrentUpdateConflict { .. } | Self::RateUnavailable { .. }
        )
    }
}
