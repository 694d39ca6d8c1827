//! Concurrent writers on shared balance slots.
//!
//! Every task races on the same account versions; the optimistic retry loop
//! must serialise them without losing or double-applying a delta.

mod common;

use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use kasa_core::LedgerError;
use kasa_core::ledger::TransactionFilter;
use kasa_db::Ledger;
use kasa_db::repositories::UnavailableRateSource;
use kasa_shared::types::Currency;

use common::*;

const WRITERS: usize = 50;

fn contended_ledger() -> Ledger {
    let mut config = config();
    config.ledger.max_retries = 256;
    ledger_with(&config, Arc::new(UnavailableRateSource))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_incomes_sum_exactly() {
    let ledger = contended_ledger();
    let cash = open_single(&ledger, "Cash", Currency::Try).await;

    let results = join_all((0..WRITERS).map(|_| {
        let ledger = ledger.clone();
        tokio::spawn(async move {
            ledger
                .transactions
                .create(income(cash.id, Decimal::ONE, Currency::Try), actor())
                .await
        })
    }))
    .await;

    for result in results {
        result.unwrap().unwrap();
    }
    assert_eq!(balance(&ledger, cash.id, Currency::Try).await, Decimal::from(WRITERS));

    let audit = ledger.admin.audit_balances().await.unwrap();
    assert!(audit.is_consistent());
    assert_eq!(audit.transactions_checked, WRITERS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transfers_conserve_money() {
    let ledger = contended_ledger();
    let left = open_single(&ledger, "Left", Currency::Usd).await;
    let right = open_single(&ledger, "Right", Currency::Usd).await;
    fund(&ledger, left.id, dec!(1000), Currency::Usd).await;
    fund(&ledger, right.id, dec!(1000), Currency::Usd).await;

    let results = join_all((0..WRITERS).map(|i| {
        let ledger = ledger.clone();
        let (from, to) = if i % 2 == 0 { (left.id, right.id) } else { (right.id, left.id) };
        tokio::spawn(async move {
            ledger
                .transactions
                .create(transfer(from, to, dec!(3.25), Currency::Usd, None, None), actor())
                .await
        })
    }))
    .await;

    for result in results {
        result.unwrap().unwrap();
    }
    let total = balance(&ledger, left.id, Currency::Usd).await + balance(&ledger, right.id, Currency::Usd).await;
    assert_eq!(total, dec!(2000));
    assert!(ledger.admin.audit_balances().await.unwrap().is_consistent());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_expenses_never_overdraw() {
    let ledger = contended_ledger();
    let cash = open_single(&ledger, "Cash", Currency::Eur).await;
    fund(&ledger, cash.id, dec!(10), Currency::Eur).await;

    let results = join_all((0..20).map(|_| {
        let ledger = ledger.clone();
        tokio::spawn(async move {
            ledger
                .transactions
                .create(expense(cash.id, Decimal::ONE, Currency::Eur), actor())
                .await
        })
    }))
    .await;

    let mut accepted = 0;
    for result in results {
        match result.unwrap() {
            Ok(_) => accepted += 1,
            Err(err) => assert!(matches!(err, LedgerError::InsufficientBalance { .. })),
        }
    }
    assert_eq!(accepted, 10);
    assert_eq!(balance(&ledger, cash.id, Currency::Eur).await, Decimal::ZERO);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_and_deletes_leave_no_drift() {
    let ledger = contended_ledger();
    let cash = open_single(&ledger, "Cash", Currency::Try).await;

    let created = join_all((0..WRITERS).map(|i| {
        let ledger = ledger.clone();
        tokio::spawn(async move {
            ledger
                .transactions
                .create(income(cash.id, Decimal::from(i + 1), Currency::Try), actor())
                .await
        })
    }))
    .await;
    let ids: Vec<_> = created
        .into_iter()
        .map(|result| result.unwrap().unwrap().transaction.id)
        .collect();

    let deleted = join_all(ids.into_iter().step_by(2).map(|id| {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.transactions.delete(id, actor()).await })
    }))
    .await;
    for result in deleted {
        result.unwrap().unwrap();
    }

    let remaining = ledger
        .transactions
        .list_all(&TransactionFilter::default())
        .await
        .unwrap();
    let expected: Decimal = remaining.iter().map(|tx| tx.amount).sum();
    assert_eq!(remaining.len(), WRITERS / 2);
    assert_eq!(balance(&ledger, cash.id, Currency::Try).await, expected);
    assert!(ledger.admin.audit_balances().await.unwrap().is_consistent());
}
