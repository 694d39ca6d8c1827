//! Input validation for ledger operations.
//!
//! Everything here runs before any state is touched, so a rejected request
//! never leaves partial changes behind.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{
    AccountMode, Category, CreateAccountInput, CreateTransactionInput, TransactionStatus,
    TransactionType,
};
use crate::currency::CurrencyCatalog;

/// Longest accepted account or personnel name.
pub const MAX_NAME_LEN: usize = 120;

/// Fails with `INVALID_AMOUNT` unless the amount is strictly positive.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(LedgerError::InvalidAmount(amount))
    }
}

/// Fails with `INVALID_EXCHANGE_RATE` unless the rate is strictly positive.
pub fn validate_rate(rate: Decimal) -> Result<(), LedgerError> {
    if rate > Decimal::ZERO {
        Ok(())
    } else {
        Err(LedgerError::InvalidExchangeRate)
    }
}

/// Validates an account creation request.
///
/// # Errors
///
/// `INVALID_CURRENCY` for a disabled currency, `INVALID_ACCOUNT_SPEC` for a
/// blank or overlong name or an inconsistent MULTI currency set.
pub fn validate_account_input(
    input: &CreateAccountInput,
    catalog: &CurrencyCatalog,
) -> Result<(), LedgerError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(LedgerError::InvalidAccountSpec("name cannot be blank".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(LedgerError::InvalidAccountSpec(format!(
            "name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }

    catalog.ensure_enabled(input.currency)?;

    match input.mode {
        AccountMode::Single => {
            let foreign = input
                .supported_currencies
                .iter()
                .any(|currency| *currency != input.currency);
            if foreign {
                return Err(LedgerError::InvalidAccountSpec(
                    "single-currency accounts hold only their own currency".to_string(),
                ));
            }
        }
        AccountMode::Multi => {
            if input.supported_currencies.is_empty() {
                return Err(LedgerError::InvalidAccountSpec(
                    "multi-currency accounts need supported currencies".to_string(),
                ));
            }
            if !input.supported_currencies.contains(&input.currency) {
                return Err(LedgerError::InvalidAccountSpec(format!(
                    "primary currency {} must be among the supported currencies",
                    input.currency
                )));
            }
            for currency in &input.supported_currencies {
                catalog.ensure_enabled(*currency)?;
            }
        }
    }
    Ok(())
}

/// The parts of a transaction request that need no stored state to check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedTransaction {
    /// Resolved category.
    pub category: Option<Category>,
    /// Initial status.
    pub status: TransactionStatus,
}

/// Validates a transaction request's shape before any lookup.
///
/// # Errors
///
/// `INVALID_AMOUNT` for a non-positive amount, `INVALID_TRANSACTION_SPEC` when
/// type-specific details are missing or misplaced or the initial status is
/// `CANCELLED`, `INVALID_TRANSFER` for a self-transfer, `SAME_CURRENCY_EXCHANGE`,
/// `INVALID_EXCHANGE_RATE` for a non-positive rate and `INVALID_CATEGORY`.
pub fn check_transaction_input(input: &CreateTransactionInput) -> Result<CheckedTransaction, LedgerError> {
    validate_amount(input.amount)?;

    match input.transaction_type {
        TransactionType::Transfer => {
            let transfer = input.transfer.as_ref().ok_or_else(|| {
                LedgerError::InvalidTransactionSpec("transfer details are required".to_string())
            })?;
            if transfer.counter_account_id == input.account_id {
                return Err(LedgerError::InvalidTransfer(
                    "source and destination accounts must differ".to_string(),
                ));
            }
            if let Some(rate) = transfer.rate {
                validate_rate(rate)?;
            }
        }
        TransactionType::Exchange => {
            let exchange = input.exchange.as_ref().ok_or_else(|| {
                LedgerError::InvalidTransactionSpec("exchange details are required".to_string())
            })?;
            if exchange.to_currency == input.currency {
                return Err(LedgerError::SameCurrencyExchange);
            }
            if let Some(rate) = exchange.rate {
                validate_rate(rate)?;
            }
        }
        TransactionType::Income | TransactionType::Expense => {}
    }

    if input.transfer.is_some() && input.transaction_type != TransactionType::Transfer {
        return Err(LedgerError::InvalidTransactionSpec(
            "transfer details on a non-transfer transaction".to_string(),
        ));
    }
    if input.exchange.is_some() && input.transaction_type != TransactionType::Exchange {
        return Err(LedgerError::InvalidTransactionSpec(
            "exchange details on a non-exchange transaction".to_string(),
        ));
    }

    let status = match input.status {
        None | Some(TransactionStatus::Completed) => TransactionStatus::Completed,
        Some(TransactionStatus::Pending) => TransactionStatus::Pending,
        Some(TransactionStatus::Cancelled) => {
            return Err(LedgerError::InvalidTransactionSpec(
                "transactions cannot be created cancelled".to_string(),
            ));
        }
    };

    let category = Category::resolve(input.transaction_type, input.category.as_deref())?;

    Ok(CheckedTransaction { category, status })
}
