//! Single-entity balance ledger.
//!
//! This module implements the core ledger functionality:
//! - Accounts with single- or multi-currency balance slots
//! - Transactions (income, expense, transfer, exchange) and their status machine
//! - Balance mutation and replay
//! - Input validation and transaction numbering
//! - Read filters and aggregate summaries

pub mod account;
pub mod balance;
pub mod error;
pub mod filter;
pub mod numbering;
pub mod summary;
pub mod transaction;
pub mod types;
pub mod validation;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod validation_props;

pub use account::{Account, ensure_unique_default};
pub use balance::{BalanceDelta, BalanceMismatch, BalanceMutator, OverdraftPolicy, SlotKey, audit};
pub use error::LedgerError;
pub use filter::{AccountFilter, TransactionFilter};
pub use numbering::{format_transaction_number, parse_transaction_number, sequence_scope};
pub use summary::{CurrencyTotals, TransactionSummary, summarize, total_balances};
pub use transaction::{ExchangeDetails, Transaction, TransferDetails};
pub use types::{
    AccountMode, AccountType, Category, CreateAccountInput, CreateTransactionInput, ExchangeInput,
    ExpenseCategory, IncomeCategory, TransactionStatus, TransactionType, TransferDirection,
    TransferInput, UpdateAccountInput,
};
pub use validation::{CheckedTransaction, check_transaction_input, validate_amount, validate_rate};
