//! Read-side filters for accounts and transactions.
//!
//! Backends translate these into queries; `matches` is the reference
//! semantics and what the in-memory store uses directly.

use chrono::NaiveDate;
use serde::Deserialize;

use kasa_shared::types::{AccountId, Currency, PayableId, PersonnelId};

use super::account::Account;
use super::transaction::Transaction;
use super::types::{AccountType, TransactionStatus, TransactionType};

/// Account list filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountFilter {
    /// Only this kind of account.
    #[serde(default)]
    pub account_type: Option<AccountType>,
    /// Only accounts that can hold this currency.
    #[serde(default)]
    pub currency: Option<Currency>,
    /// Only active (or only inactive) accounts.
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl AccountFilter {
    /// Active accounts of any type and currency.
    #[must_use]
    pub fn active() -> Self {
        Self {
            is_active: Some(true),
            ..Self::default()
        }
    }

    /// Returns true if the account passes every set criterion.
    #[must_use]
    pub fn matches(&self, account: &Account) -> bool {
        self.account_type.is_none_or(|t| account.account_type == t)
            && self.currency.is_none_or(|c| account.supports(c))
            && self.is_active.is_none_or(|a| account.is_active == a)
    }
}

/// Transaction list filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    /// Transactions moving money on this account, on either side of a transfer.
    #[serde(default)]
    pub account_id: Option<AccountId>,
    /// Only this type.
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
    /// Category label, case-insensitive.
    #[serde(default)]
    pub category: Option<String>,
    /// Only this status.
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    /// Only transactions linked to this personnel record.
    #[serde(default)]
    pub personnel_id: Option<PersonnelId>,
    /// Only payments against this payable.
    #[serde(default)]
    pub payable_id: Option<PayableId>,
    /// Only this currency (source side).
    #[serde(default)]
    pub currency: Option<Currency>,
    /// Inclusive lower bound on `transaction_date`.
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on `transaction_date`.
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

impl TransactionFilter {
    /// Returns true if the transaction passes every set criterion.
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.account_id.is_none_or(|id| tx.touches_account(id))
            && self.transaction_type.is_none_or(|t| tx.transaction_type == t)
            && self.status.is_none_or(|s| tx.status == s)
            && self.personnel_id.is_none_or(|p| tx.personnel_id == Some(p))
            && self.payable_id.is_none_or(|p| tx.payable_id == Some(p))
            && self.currency.is_none_or(|c| tx.currency == c)
            && self.date_from.is_none_or(|from| tx.transaction_date >= from)
            && self.date_to.is_none_or(|to| tx.transaction_date <= to)
            && self.category.as_deref().is_none_or(|wanted| {
                let wanted = wanted.trim().to_lowercase();
                tx.category
                    .as_ref()
                    .is_some_and(|c| c.as_str().to_lowercase() == wanted)
            })
    }
}
