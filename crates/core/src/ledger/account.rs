//! The account aggregate and its balance slots.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kasa_shared::types::{AccountId, Currency, UserId};

use super::error::LedgerError;
use super::types::{AccountMode, AccountType, CreateAccountInput, UpdateAccountInput};
use super::validation::validate_account_input;
use crate::currency::CurrencyCatalog;

/// A named balance-holding entity, single- or multi-currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Kind of balance holder.
    pub account_type: AccountType,
    /// Single or multi-currency.
    pub mode: AccountMode,
    /// Primary currency.
    pub currency: Currency,
    /// Authoritative balance for SINGLE accounts; mirrors the primary slot for MULTI.
    pub current_balance: Decimal,
    /// Authoritative per-currency balances for MULTI accounts; empty for SINGLE.
    pub balances: BTreeMap<Currency, Decimal>,
    /// Currencies this account can hold.
    pub supported_currencies: BTreeSet<Currency>,
    /// Default account for its currency.
    pub is_default: bool,
    /// Inactive accounts reject new transactions.
    pub is_active: bool,
    /// Free text.
    pub description: Option<String>,
    /// Bank name.
    pub bank_name: Option<String>,
    /// IBAN.
    pub iban: Option<String>,
    /// Optimistic concurrency token; bumped by every committed write.
    pub version: i64,
    /// Who opened the account.
    pub created_by: UserId,
    /// When the account was opened.
    pub created_at: DateTime<Utc>,
    /// Last metadata or balance change.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Opens a new account with every balance at zero.
    ///
    /// Default-account uniqueness needs the other accounts and is checked by
    /// the caller.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_CURRENCY` or `INVALID_ACCOUNT_SPEC` for bad input.
    pub fn open(
        input: &CreateAccountInput,
        catalog: &CurrencyCatalog,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        validate_account_input(input, catalog)?;

        let (supported_currencies, balances) = match input.mode {
            AccountMode::Single => (BTreeSet::from([input.currency]), BTreeMap::new()),
            AccountMode::Multi => {
                let supported: BTreeSet<Currency> =
                    input.supported_currencies.iter().copied().collect();
                let balances = supported.iter().map(|c| (*c, Decimal::ZERO)).collect();
                (supported, balances)
            }
        };

        Ok(Self {
            id: AccountId::new(),
            name: input.name.trim().to_string(),
            account_type: input.account_type,
            mode: input.mode,
            currency: input.currency,
            current_balance: Decimal::ZERO,
            balances,
            supported_currencies,
            is_default: input.is_default,
            is_active: true,
            description: input.description.clone(),
            bank_name: input.bank_name.clone(),
            iban: input.iban.clone(),
            version: 0,
            created_by: actor,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns true if the account can hold `currency`.
    #[must_use]
    pub fn supports(&self, currency: Currency) -> bool {
        match self.mode {
            AccountMode::Single => self.currency == currency,
            AccountMode::Multi => self.supported_currencies.contains(&currency),
        }
    }

    /// Fails with `UNSUPPORTED_CURRENCY` if the account cannot hold `currency`.
    pub fn ensure_supports(&self, currency: Currency) -> Result<(), LedgerError> {
        if self.supports(currency) {
            Ok(())
        } else {
            Err(LedgerError::UnsupportedCurrency {
                account_id: self.id,
                currency,
            })
        }
    }

    /// Authoritative balance of one slot, or `None` if the account cannot hold it.
    #[must_use]
    pub fn balance(&self, currency: Currency) -> Option<Decimal> {
        match self.mode {
            AccountMode::Single => (self.currency == currency).then_some(self.current_balance),
            AccountMode::Multi => self.balances.get(&currency).copied(),
        }
    }

    /// Every authoritative balance slot.
    #[must_use]
    pub fn slots(&self) -> Vec<(Currency, Decimal)> {
        match self.mode {
            AccountMode::Single => vec![(self.currency, self.current_balance)],
            AccountMode::Multi => self.balances.iter().map(|(c, b)| (*c, *b)).collect(),
        }
    }

    /// Returns true if every tracked balance is exactly zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots().iter().all(|(_, balance)| balance.is_zero())
    }

    /// Adds a signed delta to one balance slot and returns the new balance.
    ///
    /// This is the only code path that changes balance fields. Callers persist
    /// the result through the store's version-checked commit.
    ///
    /// # Errors
    ///
    /// Returns `UNSUPPORTED_CURRENCY` for a slot the account cannot hold.
    pub fn apply_delta(&mut self, currency: Currency, delta: Decimal) -> Result<Decimal, LedgerError> {
        let current = self.balance(currency).ok_or(LedgerError::UnsupportedCurrency {
            account_id: self.id,
            currency,
        })?;
        let next = current
            .checked_add(delta)
            .ok_or_else(|| LedgerError::Internal(format!("balance overflow on account {}", self.id)))?;

        match self.mode {
            AccountMode::Single => self.current_balance = next,
            AccountMode::Multi => {
                self.balances.insert(currency, next);
                if currency == self.currency {
                    self.current_balance = next;
                }
            }
        }
        Ok(next)
    }

    /// Sets every balance slot to zero.
    pub fn zero_balances(&mut self) {
        self.current_balance = Decimal::ZERO;
        for balance in self.balances.values_mut() {
            *balance = Decimal::ZERO;
        }
    }

    /// Applies a metadata patch. Balances are untouched.
    ///
    /// Default-account uniqueness needs the other accounts and is checked by
    /// the caller.
    ///
    /// # Errors
    ///
    /// Returns `ACCOUNT_INACTIVE` for a deactivated account,
    /// `INVALID_ACCOUNT_SPEC` for a blank name or for adding currencies to a
    /// SINGLE account, and `INVALID_CURRENCY` for a disabled currency.
    pub fn apply_update(
        &mut self,
        input: &UpdateAccountInput,
        catalog: &CurrencyCatalog,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        if !self.is_active {
            return Err(LedgerError::AccountInactive(self.id));
        }
        if let Some(name) = &input.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(LedgerError::InvalidAccountSpec(
                    "name cannot be blank".to_string(),
                ));
            }
            self.name = name.to_string();
        }
        if !input.add_currencies.is_empty() && self.mode == AccountMode::Single {
            return Err(LedgerError::InvalidAccountSpec(
                "single-currency accounts cannot add currencies".to_string(),
            ));
        }
        for currency in &input.add_currencies {
            catalog.ensure_enabled(*currency)?;
        }
        for currency in &input.add_currencies {
            if self.supported_currencies.insert(*currency) {
                self.balances.insert(*currency, Decimal::ZERO);
            }
        }
        if let Some(account_type) = input.account_type {
            self.account_type = account_type;
        }
        if input.description.is_some() {
            self.description.clone_from(&input.description);
        }
        if input.bank_name.is_some() {
            self.bank_name.clone_from(&input.bank_name);
        }
        if input.iban.is_some() {
            self.iban.clone_from(&input.iban);
        }
        if let Some(is_default) = input.is_default {
            self.is_default = is_default;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Marks the account inactive.
    ///
    /// # Errors
    ///
    /// Returns `ACCOUNT_HAS_BALANCE` unless every balance is exactly zero.
    pub fn deactivate(&mut self, now: DateTime<Utc>) -> Result<(), LedgerError> {
        if !self.is_empty() {
            return Err(LedgerError::AccountHasBalance(self.id));
        }
        self.is_active = false;
        self.is_default = false;
        self.updated_at = now;
        Ok(())
    }

    /// Returns true if this account claims the default slot for `currency`.
    #[must_use]
    pub fn is_default_for(&self, currency: Currency) -> bool {
        self.is_active && self.is_default && self.currency == currency
    }
}

/// Fails with `DUPLICATE_DEFAULT` if another active account already holds the
/// default slot of `candidate`'s currency.
pub fn ensure_unique_default<'a>(
    candidate: &Account,
    others: impl IntoIterator<Item = &'a Account>,
) -> Result<(), LedgerError> {
    if !candidate.is_default_for(candidate.currency) {
        return Ok(());
    }
    let taken = others
        .into_iter()
        .any(|other| other.id != candidate.id && other.is_default_for(candidate.currency));
    if taken {
        Err(LedgerError::DuplicateDefault(candidate.currency))
    } else {
        Ok(())
    }
}
