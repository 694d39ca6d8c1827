//! Aggregate views over transactions and accounts.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use kasa_shared::types::Currency;

use super::account::Account;
use super::transaction::Transaction;
use super::types::{TransactionStatus, TransactionType};

/// Income and expense totals for one currency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurrencyTotals {
    /// Σ COMPLETED income.
    pub income: Decimal,
    /// Σ COMPLETED expense.
    pub expense: Decimal,
    /// `income - expense`.
    pub net: Decimal,
    /// COMPLETED income and expense transactions counted.
    pub transaction_count: u64,
}

/// Totals across a set of transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionSummary {
    /// Totals per currency; only COMPLETED income/expense count.
    pub by_currency: BTreeMap<Currency, CurrencyTotals>,
    /// Transactions per status, all types.
    pub by_status: BTreeMap<TransactionStatus, u64>,
}

/// Summarises transactions. Transfers and exchanges move money between slots
/// and are left out of income and expense.
#[must_use]
pub fn summarize<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> TransactionSummary {
    let mut summary = TransactionSummary::default();
    for tx in transactions {
        *summary.by_status.entry(tx.status).or_default() += 1;
        if !tx.is_completed() {
            continue;
        }
        let totals = summary.by_currency.entry(tx.currency).or_default();
        match tx.transaction_type {
            TransactionType::Income => {
                totals.income += tx.amount;
                totals.transaction_count += 1;
            }
            TransactionType::Expense => {
                totals.expense += tx.amount;
                totals.transaction_count += 1;
            }
            TransactionType::Transfer | TransactionType::Exchange => {}
        }
        totals.net = totals.income - totals.expense;
    }
    summary.by_currency.retain(|_, totals| totals.transaction_count > 0);
    summary
}

/// Σ balances per currency over active accounts.
#[must_use]
pub fn total_balances<'a>(accounts: impl IntoIterator<Item = &'a Account>) -> BTreeMap<Currency, Decimal> {
    let mut totals: BTreeMap<Currency, Decimal> = BTreeMap::new();
    for account in accounts.into_iter().filter(|a| a.is_active) {
        for (currency, balance) in account.slots() {
            *totals.entry(currency).or_default() += balance;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::transaction::fixtures::simple;
    use kasa_shared::types::AccountId;
    use rust_decimal_macros::dec;

    #[test]
    fn test_summarize_counts_only_completed() {
        let account = AccountId::new();
        let income = simple(TransactionType::Income, account, dec!(1000), Currency::Try);
        let expense = simple(TransactionType::Expense, account, dec!(400), Currency::Try);
        let mut pending = simple(TransactionType::Income, account, dec!(999), Currency::Try);
        pending.status = TransactionStatus::Pending;
        let usd = simple(TransactionType::Expense, account, dec!(5), Currency::Usd);

        let summary = summarize([&income, &expense, &pending, &usd]);
        let try_totals = &summary.by_currency[&Currency::Try];
        assert_eq!(try_totals.income, dec!(1000));
        assert_eq!(try_totals.expense, dec!(400));
        assert_eq!(try_totals.net, dec!(600));
        assert_eq!(try_totals.transaction_count, 2);
        assert_eq!(summary.by_currency[&Currency::Usd].net, dec!(-5));
        assert_eq!(summary.by_status[&TransactionStatus::Pending], 1);
        assert_eq!(summary.by_status[&TransactionStatus::Completed], 3);
    }

    #[test]
    fn test_summarize_ignores_transfers() {
        let tx = simple(TransactionType::Transfer, AccountId::new(), dec!(10), Currency::Try);
        let summary = summarize([&tx]);
        assert!(summary.by_currency.is_empty());
    }
}
