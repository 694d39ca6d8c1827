//! Balance mutation rules.
//!
//! A transaction maps to a list of signed deltas on balance slots
//! `(account, currency)`:
//!
//! | Type | Deltas |
//! |---|---|
//! | INCOME | `+amount` on (account, currency) |
//! | EXPENSE | `-amount` on (account, currency) |
//! | TRANSFER OUT | `-amount` on (account, currency), `+counter_amount` on (counter, counter_currency) |
//! | TRANSFER IN | `-counter_amount` on (counter, counter_currency), `+amount` on (account, currency) |
//! | EXCHANGE | `-amount` on (account, currency), `+to_amount` on (account, to_currency) |
//!
//! `reverse` applies the exact negation of `apply`, so a reversal always
//! restores the balances decimal-exactly.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use kasa_shared::types::{AccountId, Currency};

use super::account::Account;
use super::error::LedgerError;
use super::transaction::Transaction;
use super::types::{TransactionType, TransferDirection};

/// A signed change to one balance slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceDelta {
    /// The account.
    pub account_id: AccountId,
    /// The balance slot currency.
    pub currency: Currency,
    /// Signed amount.
    pub amount: Decimal,
}

impl BalanceDelta {
    const fn new(account_id: AccountId, currency: Currency, amount: Decimal) -> Self {
        Self {
            account_id,
            currency,
            amount,
        }
    }

    /// The same slot with the sign flipped.
    #[must_use]
    pub fn negated(self) -> Self {
        Self {
            amount: -self.amount,
            ..self
        }
    }
}

/// Whether a debit may take a balance slot below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverdraftPolicy {
    /// Debits beyond the available balance fail with `INSUFFICIENT_BALANCE`.
    #[default]
    Deny,
    /// Balances may go negative.
    Allow,
}

impl OverdraftPolicy {
    /// Maps the `allow_negative_balance` setting.
    #[must_use]
    pub const fn from_allow_negative(allow: bool) -> Self {
        if allow { Self::Allow } else { Self::Deny }
    }
}

/// Balance slot key used by replays and audits.
pub type SlotKey = (AccountId, Currency);

/// Translates transactions into balance deltas and applies them to accounts.
pub struct BalanceMutator;

impl BalanceMutator {
    /// Signed deltas of a transaction's balance effect.
    ///
    /// # Errors
    ///
    /// Returns `INTERNAL_ERROR` if a TRANSFER or EXCHANGE lacks its details.
    pub fn deltas(tx: &Transaction) -> Result<Vec<BalanceDelta>, LedgerError> {
        match tx.transaction_type {
            TransactionType::Income => Ok(vec![BalanceDelta::new(tx.account_id, tx.currency, tx.amount)]),
            TransactionType::Expense => Ok(vec![BalanceDelta::new(tx.account_id, tx.currency, -tx.amount)]),
            TransactionType::Transfer => {
                let transfer = tx.transfer.as_ref().ok_or_else(|| {
                    LedgerError::Internal(format!("transfer {} has no counter side", tx.id))
                })?;
                Ok(match transfer.direction {
                    TransferDirection::Out => vec![
                        BalanceDelta::new(tx.account_id, tx.currency, -tx.amount),
                        BalanceDelta::new(
                            transfer.counter_account_id,
                            transfer.counter_currency,
                            transfer.counter_amount,
                        ),
                    ],
                    TransferDirection::In => vec![
                        BalanceDelta::new(
                            transfer.counter_account_id,
                            transfer.counter_currency,
                            -transfer.counter_amount,
                        ),
                        BalanceDelta::new(tx.account_id, tx.currency, tx.amount),
                    ],
                })
            }
            TransactionType::Exchange => {
                let exchange = tx.exchange.as_ref().ok_or_else(|| {
                    LedgerError::Internal(format!("exchange {} has no target side", tx.id))
                })?;
                Ok(vec![
                    BalanceDelta::new(tx.account_id, tx.currency, -tx.amount),
                    BalanceDelta::new(tx.account_id, exchange.to_currency, exchange.to_amount),
                ])
            }
        }
    }

    /// Applies a transaction's effect to the account snapshots.
    ///
    /// On error the snapshots may be partially modified; callers discard them.
    ///
    /// # Errors
    ///
    /// Returns `ACCOUNT_NOT_FOUND` for a missing snapshot, `UNSUPPORTED_CURRENCY`
    /// for a slot an account cannot hold, and `INSUFFICIENT_BALANCE` when the
    /// policy denies a debit below zero.
    pub fn apply(
        tx: &Transaction,
        accounts: &mut BTreeMap<AccountId, Account>,
        policy: OverdraftPolicy,
    ) -> Result<Vec<BalanceDelta>, LedgerError> {
        let deltas = Self::deltas(tx)?;
        Self::apply_deltas(&deltas, accounts, policy)?;
        Ok(deltas)
    }

    /// Undoes a transaction's effect on the account snapshots.
    ///
    /// Never blocked by the overdraft policy: a correction must always go through.
    ///
    /// # Errors
    ///
    /// Returns `ACCOUNT_NOT_FOUND` or `UNSUPPORTED_CURRENCY` for snapshots that
    /// no longer match the transaction.
    pub fn reverse(
        tx: &Transaction,
        accounts: &mut BTreeMap<AccountId, Account>,
    ) -> Result<Vec<BalanceDelta>, LedgerError> {
        let deltas: Vec<BalanceDelta> = Self::deltas(tx)?.into_iter().map(BalanceDelta::negated).collect();
        Self::apply_deltas(&deltas, accounts, OverdraftPolicy::Allow)?;
        Ok(deltas)
    }

    fn apply_deltas(
        deltas: &[BalanceDelta],
        accounts: &mut BTreeMap<AccountId, Account>,
        policy: OverdraftPolicy,
    ) -> Result<(), LedgerError> {
        for delta in deltas {
            let account = accounts
                .get_mut(&delta.account_id)
                .ok_or(LedgerError::AccountNotFound(delta.account_id))?;
            let before = account.balance(delta.currency).ok_or(LedgerError::UnsupportedCurrency {
                account_id: delta.account_id,
                currency: delta.currency,
            })?;
            let after = account.apply_delta(delta.currency, delta.amount)?;

            if policy == OverdraftPolicy::Deny && delta.amount.is_sign_negative() && after < Decimal::ZERO {
                return Err(LedgerError::InsufficientBalance {
                    account_id: delta.account_id,
                    currency: delta.currency,
                    available: before,
                    required: -delta.amount,
                });
            }
        }
        Ok(())
    }

    /// Recomputes every balance slot from transaction history.
    ///
    /// Only COMPLETED transactions contribute.
    ///
    /// # Errors
    ///
    /// Propagates malformed TRANSFER/EXCHANGE records.
    pub fn replay<'a>(
        transactions: impl IntoIterator<Item = &'a Transaction>,
    ) -> Result<BTreeMap<SlotKey, Decimal>, LedgerError> {
        let mut slots: BTreeMap<SlotKey, Decimal> = BTreeMap::new();
        for tx in transactions.into_iter().filter(|tx| tx.is_completed()) {
            for delta in Self::deltas(tx)? {
                let slot = slots.entry((delta.account_id, delta.currency)).or_default();
                *slot = slot
                    .checked_add(delta.amount)
                    .ok_or_else(|| LedgerError::Internal("balance replay overflow".to_string()))?;
            }
        }
        Ok(slots)
    }
}

/// A balance slot whose stored value disagrees with its replayed history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceMismatch {
    /// The account.
    pub account_id: AccountId,
    /// The slot currency.
    pub currency: Currency,
    /// Value stored on the account.
    pub stored: Decimal,
    /// Value reconstructed from COMPLETED transactions.
    pub expected: Decimal,
}

/// Compares stored balances against a replay of their history.
///
/// # Errors
///
/// Propagates malformed TRANSFER/EXCHANGE records.
pub fn audit<'a>(
    accounts: impl IntoIterator<Item = &'a Account>,
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Result<Vec<BalanceMismatch>, LedgerError> {
    let mut replayed = BalanceMutator::replay(transactions)?;
    let mut mismatches = Vec::new();

    for account in accounts {
        for (currency, stored) in account.slots() {
            let expected = replayed.remove(&(account.id, currency)).unwrap_or_default();
            if stored != expected {
                mismatches.push(BalanceMismatch {
                    account_id: account.id,
                    currency,
                    stored,
                    expected,
                });
            }
        }
    }

    // History on slots no account holds any more.
    for ((account_id, currency), expected) in replayed {
        if !expected.is_zero() {
            mismatches.push(BalanceMismatch {
                account_id,
                currency,
                stored: Decimal::ZERO,
                expected,
            });
        }
    }

    Ok(mismatches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyCatalog;
    use crate::ledger::transaction::fixtures::simple;
    use crate::ledger::transaction::{ExchangeDetails, TransferDetails};
    use crate::ledger::types::{AccountMode, AccountType, CreateAccountInput};
    use chrono::Utc;
    use kasa_shared::types::UserId;
    use rust_decimal_macros::dec;

    fn account(mode: AccountMode, currency: Currency, supported: Vec<Currency>) -> Account {
        Account::open(
            &CreateAccountInput {
                name: "Test".into(),
                account_type: AccountType::Cash,
                mode,
                currency,
                supported_currencies: supported,
                is_default: false,
                description: None,
                bank_name: None,
                iban: None,
            },
            &CurrencyCatalog::all(),
            UserId::new(),
            Utc::now(),
        )
        .unwrap()
    }

    fn book(accounts: &[&Account]) -> BTreeMap<AccountId, Account> {
        accounts.iter().map(|a| (a.id, (*a).clone())).collect()
    }

    #[test]
    fn test_scenario_a_income_expense_delete() {
        let cash = account(AccountMode::Single, Currency::Try, vec![]);
        let mut accounts = book(&[&cash]);

        let income = simple(TransactionType::Income, cash.id, dec!(1000), Currency::Try);
        let expense = simple(TransactionType::Expense, cash.id, dec!(400), Currency::Try);

        BalanceMutator::apply(&income, &mut accounts, OverdraftPolicy::Deny).unwrap();
        assert_eq!(accounts[&cash.id].current_balance, dec!(1000));
        BalanceMutator::apply(&expense, &mut accounts, OverdraftPolicy::Deny).unwrap();
        assert_eq!(accounts[&cash.id].current_balance, dec!(600));
        BalanceMutator::reverse(&expense, &mut accounts).unwrap();
        assert_eq!(accounts[&cash.id].current_balance, dec!(1000));
    }

    #[test]
    fn test_scenario_b_exchange_overdraft() {
        let multi = account(AccountMode::Multi, Currency::Try, vec![Currency::Try, Currency::Usd]);
        let mut exchange = simple(TransactionType::Exchange, multi.id, dec!(100), Currency::Usd);
        exchange.exchange = Some(ExchangeDetails {
            to_currency: Currency::Try,
            to_amount: dec!(3000),
            rate: dec!(30),
        });

        let mut denied = book(&[&multi]);
        let err = BalanceMutator::apply(&exchange, &mut denied, OverdraftPolicy::Deny).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientBalance { currency: Currency::Usd, available, required, .. }
                if available == dec!(0) && required == dec!(100)
        ));

        let mut allowed = book(&[&multi]);
        BalanceMutator::apply(&exchange, &mut allowed, OverdraftPolicy::Allow).unwrap();
        assert_eq!(allowed[&multi.id].balance(Currency::Usd), Some(dec!(-100)));
        assert_eq!(allowed[&multi.id].balance(Currency::Try), Some(dec!(3000)));
    }

    #[test]
    fn test_scenario_c_transfer_round_trip() {
        let mut first = account(AccountMode::Single, Currency::Try, vec![]);
        first.apply_delta(Currency::Try, dec!(500)).unwrap();
        let second = account(AccountMode::Single, Currency::Try, vec![]);
        let mut accounts = book(&[&first, &second]);

        let mut transfer = simple(TransactionType::Transfer, first.id, dec!(200), Currency::Try);
        transfer.transfer = Some(TransferDetails {
            counter_account_id: second.id,
            counter_account_name: "Second".into(),
            direction: TransferDirection::Out,
            counter_currency: Currency::Try,
            counter_amount: dec!(200),
            rate: Decimal::ONE,
        });

        BalanceMutator::apply(&transfer, &mut accounts, OverdraftPolicy::Deny).unwrap();
        assert_eq!(accounts[&first.id].current_balance, dec!(300));
        assert_eq!(accounts[&second.id].current_balance, dec!(200));

        BalanceMutator::reverse(&transfer, &mut accounts).unwrap();
        assert_eq!(accounts[&first.id].current_balance, dec!(500));
        assert_eq!(accounts[&second.id].current_balance, dec!(0));
    }

    #[test]
    fn test_transfer_in_debits_counter_account() {
        let receiving = account(AccountMode::Single, Currency::Try, vec![]);
        let mut paying = account(AccountMode::Single, Currency::Usd, vec![]);
        paying.apply_delta(Currency::Usd, dec!(50)).unwrap();

        let mut transfer = simple(TransactionType::Transfer, receiving.id, dec!(3000), Currency::Try);
        transfer.transfer = Some(TransferDetails {
            counter_account_id: paying.id,
            counter_account_name: "USD".into(),
            direction: TransferDirection::In,
            counter_currency: Currency::Usd,
            counter_amount: dec!(100),
            rate: dec!(30),
        });

        let deltas = BalanceMutator::deltas(&transfer).unwrap();
        assert_eq!(deltas[0], BalanceDelta::new(paying.id, Currency::Usd, dec!(-100)));
        assert_eq!(deltas[1], BalanceDelta::new(receiving.id, Currency::Try, dec!(3000)));

        let mut accounts = book(&[&receiving, &paying]);
        assert!(matches!(
            BalanceMutator::apply(&transfer, &mut accounts, OverdraftPolicy::Deny),
            Err(LedgerError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_reverse_ignores_overdraft_policy() {
        let cash = account(AccountMode::Single, Currency::Try, vec![]);
        let mut accounts = book(&[&cash]);
        let income = simple(TransactionType::Income, cash.id, dec!(100), Currency::Try);
        BalanceMutator::apply(&income, &mut accounts, OverdraftPolicy::Deny).unwrap();
        accounts.get_mut(&cash.id).unwrap().apply_delta(Currency::Try, dec!(-80)).unwrap();

        BalanceMutator::reverse(&income, &mut accounts).unwrap();
        assert_eq!(accounts[&cash.id].current_balance, dec!(-80));
    }

    #[test]
    fn test_missing_account_snapshot() {
        let income = simple(TransactionType::Income, AccountId::new(), dec!(1), Currency::Try);
        assert!(matches!(
            BalanceMutator::apply(&income, &mut BTreeMap::new(), OverdraftPolicy::Allow),
            Err(LedgerError::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_replay_skips_non_completed() {
        let id = AccountId::new();
        let completed = simple(TransactionType::Income, id, dec!(10), Currency::Try);
        let mut pending = simple(TransactionType::Income, id, dec!(5), Currency::Try);
        pending.status = crate::ledger::types::TransactionStatus::Pending;

        let slots = BalanceMutator::replay([&completed, &pending]).unwrap();
        assert_eq!(slots[&(id, Currency::Try)], dec!(10));
    }

    #[test]
    fn test_audit_reports_drift() {
        let mut cash = account(AccountMode::Single, Currency::Try, vec![]);
        let income = simple(TransactionType::Income, cash.id, dec!(10), Currency::Try);
        cash.apply_delta(Currency::Try, dec!(10)).unwrap();
        assert!(audit([&cash], [&income]).unwrap().is_empty());

        cash.apply_delta(Currency::Try, dec!(1)).unwrap();
        let mismatches = audit([&cash], [&income]).unwrap();
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].stored, dec!(11));
        assert_eq!(mismatches[0].expected, dec!(10));
    }
}
