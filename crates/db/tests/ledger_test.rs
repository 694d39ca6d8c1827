//! End-to-end ledger behaviour against the in-memory store.
//!
//! Covers the balance invariants: every balance equals the signed sum of the
//! COMPLETED transactions touching it, deleting a transaction restores the
//! balances it touched, and PENDING transactions have no effect until
//! completed.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use kasa_core::LedgerError;
use kasa_core::ledger::{
    CreateTransactionInput, TransactionFilter, TransactionStatus, TransactionType, TransferDirection, TransferInput,
    UpdateAccountInput,
};
use kasa_db::repositories::{StaticRateSource, UnavailableRateSource};
use kasa_shared::types::{AccountId, Currency, PageRequest, TransactionId};

use common::*;

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_income_expense_and_delete_restore_balance() {
    let ledger = ledger();
    let cash = open_single(&ledger, "Cash TRY", Currency::Try).await;
    assert_eq!(balance(&ledger, cash.id, Currency::Try).await, Decimal::ZERO);

    fund(&ledger, cash.id, dec!(1000), Currency::Try).await;
    assert_eq!(balance(&ledger, cash.id, Currency::Try).await, dec!(1000));

    let spent = ledger
        .transactions
        .create(expense(cash.id, dec!(400), Currency::Try), actor())
        .await
        .unwrap();
    assert_eq!(balance(&ledger, cash.id, Currency::Try).await, dec!(600));

    ledger.transactions.delete(spent.transaction.id, actor()).await.unwrap();
    assert_eq!(balance(&ledger, cash.id, Currency::Try).await, dec!(1000));
}

#[tokio::test]
async fn test_exchange_into_overdraft_is_rejected_by_default() {
    let ledger = ledger();
    let wallet = open_multi(&ledger, "FX", Currency::Try, &[Currency::Try, Currency::Usd]).await;

    let err = ledger
        .transactions
        .create(
            exchange(wallet.id, dec!(100), Currency::Usd, Currency::Try, Some(dec!(30))),
            actor(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");
    assert_eq!(balance(&ledger, wallet.id, Currency::Usd).await, Decimal::ZERO);
    assert_eq!(balance(&ledger, wallet.id, Currency::Try).await, Decimal::ZERO);
    assert!(ledger.transactions.list_all(&TransactionFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_exchange_into_overdraft_when_allowed() {
    let mut config = config();
    config.ledger.allow_negative_balance = true;
    let ledger = ledger_with(&config, Arc::new(UnavailableRateSource));
    let wallet = open_multi(&ledger, "FX", Currency::Try, &[Currency::Try, Currency::Usd]).await;

    let created = ledger
        .transactions
        .create(
            exchange(wallet.id, dec!(100), Currency::Usd, Currency::Try, Some(dec!(30))),
            actor(),
        )
        .await
        .unwrap();

    let details = created.transaction.exchange.unwrap();
    assert_eq!(details.to_amount, dec!(3000));
    assert_eq!(details.rate, dec!(30));
    assert_eq!(balance(&ledger, wallet.id, Currency::Usd).await, dec!(-100));
    assert_eq!(balance(&ledger, wallet.id, Currency::Try).await, dec!(3000));
}

#[tokio::test]
async fn test_transfer_and_delete_restore_both_sides() {
    let ledger = ledger();
    let first = open_single(&ledger, "Account 1", Currency::Try).await;
    let second = open_single(&ledger, "Account 2", Currency::Try).await;
    fund(&ledger, first.id, dec!(500), Currency::Try).await;

    let created = ledger
        .transactions
        .create(transfer(first.id, second.id, dec!(200), Currency::Try, None, None), actor())
        .await
        .unwrap();
    assert_eq!(balance(&ledger, first.id, Currency::Try).await, dec!(300));
    assert_eq!(balance(&ledger, second.id, Currency::Try).await, dec!(200));

    let details = created.transaction.transfer.as_ref().unwrap();
    assert_eq!(details.counter_account_name, "Account 2");
    assert_eq!(details.rate, Decimal::ONE);

    ledger.transactions.delete(created.transaction.id, actor()).await.unwrap();
    assert_eq!(balance(&ledger, first.id, Currency::Try).await, dec!(500));
    assert_eq!(balance(&ledger, second.id, Currency::Try).await, Decimal::ZERO);
}

// ============================================================================
// Transfers and exchanges
// ============================================================================

#[tokio::test]
async fn test_incoming_transfer_debits_counter_account() {
    let ledger = ledger();
    let till = open_single(&ledger, "Till", Currency::Try).await;
    let safe = open_single(&ledger, "Safe", Currency::Try).await;
    fund(&ledger, safe.id, dec!(250), Currency::Try).await;

    let mut input = CreateTransactionInput::simple(TransactionType::Transfer, till.id, dec!(50), Currency::Try);
    input.transfer = Some(TransferInput {
        counter_account_id: safe.id,
        direction: TransferDirection::In,
        counter_currency: None,
        rate: None,
    });
    ledger.transactions.create(input, actor()).await.unwrap();

    assert_eq!(balance(&ledger, till.id, Currency::Try).await, dec!(50));
    assert_eq!(balance(&ledger, safe.id, Currency::Try).await, dec!(200));
}

#[tokio::test]
async fn test_cross_currency_transfer_uses_provider_rate() {
    let ledger = ledger_with_rates(StaticRateSource::new().with_rate(Currency::Usd, Currency::Try, dec!(32.5)));
    let dollars = open_single(&ledger, "USD bank", Currency::Usd).await;
    let lira = open_single(&ledger, "TRY bank", Currency::Try).await;
    fund(&ledger, dollars.id, dec!(100), Currency::Usd).await;

    let created = ledger
        .transactions
        .create(transfer(dollars.id, lira.id, dec!(10), Currency::Usd, None, None), actor())
        .await
        .unwrap();

    let details = created.transaction.transfer.unwrap();
    assert_eq!(details.counter_currency, Currency::Try);
    assert_eq!(details.counter_amount, dec!(325.00));
    assert_eq!(details.rate, dec!(32.5));
    assert_eq!(balance(&ledger, dollars.id, Currency::Usd).await, dec!(90));
    assert_eq!(balance(&ledger, lira.id, Currency::Try).await, dec!(325));
}

#[tokio::test]
async fn test_cross_currency_transfer_without_rate_fails() {
    let ledger = ledger();
    let dollars = open_single(&ledger, "USD bank", Currency::Usd).await;
    let lira = open_single(&ledger, "TRY bank", Currency::Try).await;
    fund(&ledger, dollars.id, dec!(100), Currency::Usd).await;

    let err = ledger
        .transactions
        .create(transfer(dollars.id, lira.id, dec!(10), Currency::Usd, None, None), actor())
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::RateUnavailable { .. }));
    assert_eq!(balance(&ledger, dollars.id, Currency::Usd).await, dec!(100));
}

#[tokio::test]
async fn test_self_transfer_is_rejected() {
    let ledger = ledger();
    let cash = open_single(&ledger, "Cash", Currency::Try).await;

    let err = ledger
        .transactions
        .create(transfer(cash.id, cash.id, dec!(1), Currency::Try, None, None), actor())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_TRANSFER");
}

#[tokio::test]
async fn test_exchange_on_single_account_is_rejected() {
    let ledger = ledger();
    let cash = open_single(&ledger, "Cash", Currency::Try).await;
    fund(&ledger, cash.id, dec!(100), Currency::Try).await;

    let err = ledger
        .transactions
        .create(exchange(cash.id, dec!(10), Currency::Try, Currency::Usd, Some(dec!(0.03))), actor())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "EXCHANGE_REQUIRES_MULTI");
}

#[tokio::test]
async fn test_exchange_uses_manual_rate() {
    let ledger = ledger();
    let wallet = open_multi(&ledger, "FX", Currency::Eur, &[Currency::Eur, Currency::Gbp]).await;
    fund(&ledger, wallet.id, dec!(100), Currency::Eur).await;
    ledger
        .rates
        .set_manual_rate(Currency::Eur, Currency::Gbp, dec!(0.85))
        .await
        .unwrap();

    let created = ledger
        .transactions
        .create(exchange(wallet.id, dec!(40), Currency::Eur, Currency::Gbp, None), actor())
        .await
        .unwrap();

    assert_eq!(created.transaction.exchange.unwrap().to_amount, dec!(34.00));
    assert_eq!(balance(&ledger, wallet.id, Currency::Eur).await, dec!(60));
    assert_eq!(balance(&ledger, wallet.id, Currency::Gbp).await, dec!(34));
}

#[tokio::test]
async fn test_deleting_exchange_restores_both_slots() {
    let ledger = ledger();
    let wallet = open_multi(&ledger, "FX", Currency::Usd, &[Currency::Try, Currency::Usd]).await;
    fund(&ledger, wallet.id, dec!(100), Currency::Usd).await;

    let created = ledger
        .transactions
        .create(exchange(wallet.id, dec!(100), Currency::Usd, Currency::Try, Some(dec!(30))), actor())
        .await
        .unwrap();
    assert_eq!(balance(&ledger, wallet.id, Currency::Usd).await, Decimal::ZERO);
    assert_eq!(balance(&ledger, wallet.id, Currency::Try).await, dec!(3000));

    ledger
        .transactions
        .delete(created.transaction.id, actor())
        .await
        .unwrap();

    assert_eq!(balance(&ledger, wallet.id, Currency::Usd).await, dec!(100));
    assert_eq!(balance(&ledger, wallet.id, Currency::Try).await, Decimal::ZERO);
    assert!(ledger.admin.audit_balances().await.unwrap().is_consistent());
}

#[tokio::test]
async fn test_same_currency_exchange_is_rejected() {
    let ledger = ledger();
    let wallet = open_multi(&ledger, "FX", Currency::Try, &[Currency::Try, Currency::Usd]).await;

    let err = ledger
        .transactions
        .create(exchange(wallet.id, dec!(1), Currency::Try, Currency::Try, Some(Decimal::ONE)), actor())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "SAME_CURRENCY_EXCHANGE");
}

// ============================================================================
// Validation boundaries
// ============================================================================

#[rstest]
#[case::income(TransactionType::Income)]
#[case::expense(TransactionType::Expense)]
#[case::transfer(TransactionType::Transfer)]
#[case::exchange(TransactionType::Exchange)]
#[tokio::test]
async fn test_non_positive_amount_is_rejected(
    #[case] transaction_type: TransactionType,
    #[values(dec!(0), dec!(-1), dec!(-0.01))] amount: Decimal,
) {
    let ledger = ledger();
    let wallet = open_multi(&ledger, "FX", Currency::Try, &[Currency::Try, Currency::Usd]).await;
    let other = open_single(&ledger, "Other", Currency::Try).await;

    let input = match transaction_type {
        TransactionType::Income => income(wallet.id, amount, Currency::Try),
        TransactionType::Expense => expense(wallet.id, amount, Currency::Try),
        TransactionType::Transfer => transfer(wallet.id, other.id, amount, Currency::Try, None, None),
        TransactionType::Exchange => exchange(wallet.id, amount, Currency::Try, Currency::Usd, Some(dec!(0.03))),
    };

    let err = ledger.transactions.create(input, actor()).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_AMOUNT");
}

#[tokio::test]
async fn test_unsupported_currency_is_rejected() {
    let ledger = ledger();
    let cash = open_single(&ledger, "Cash", Currency::Try).await;
    let wallet = open_multi(&ledger, "FX", Currency::Try, &[Currency::Try, Currency::Usd]).await;

    let err = ledger
        .transactions
        .create(income(cash.id, dec!(5), Currency::Usd), actor())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "UNSUPPORTED_CURRENCY");

    let err = ledger
        .transactions
        .create(income(wallet.id, dec!(5), Currency::Eur), actor())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "UNSUPPORTED_CURRENCY");

    // Supported slots still work.
    ledger
        .transactions
        .create(income(wallet.id, dec!(5), Currency::Usd), actor())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_missing_and_inactive_accounts() {
    let ledger = ledger();
    let cash = open_single(&ledger, "Cash", Currency::Try).await;
    ledger.accounts.delete(cash.id, actor()).await.unwrap();

    let err = ledger
        .transactions
        .create(income(cash.id, dec!(5), Currency::Try), actor())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_INACTIVE");

    let err = ledger
        .transactions
        .create(income(AccountId::new(), dec!(5), Currency::Try), actor())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_NOT_FOUND");
}

#[tokio::test]
async fn test_overdraft_expense_is_rejected() {
    let ledger = ledger();
    let cash = open_single(&ledger, "Cash", Currency::Try).await;
    fund(&ledger, cash.id, dec!(10), Currency::Try).await;

    let err = ledger
        .transactions
        .create(expense(cash.id, dec!(10.01), Currency::Try), actor())
        .await
        .unwrap_err();
    assert_eq!(err.http_status_code(), 422);
    assert_eq!(balance(&ledger, cash.id, Currency::Try).await, dec!(10));

    // Spending down to exactly zero is fine.
    ledger
        .transactions
        .create(expense(cash.id, dec!(10), Currency::Try), actor())
        .await
        .unwrap();
    assert_eq!(balance(&ledger, cash.id, Currency::Try).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_unknown_expense_category_is_rejected() {
    let ledger = ledger();
    let cash = open_single(&ledger, "Cash", Currency::Try).await;
    fund(&ledger, cash.id, dec!(10), Currency::Try).await;

    let mut input = expense(cash.id, dec!(1), Currency::Try);
    input.category = Some("LUNCH_MONEY".into());
    let err = ledger.transactions.create(input, actor()).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_CATEGORY");
}

// ============================================================================
// Status machine
// ============================================================================

#[tokio::test]
async fn test_pending_has_no_effect_until_completed() {
    let ledger = ledger();
    let cash = open_single(&ledger, "Cash", Currency::Try).await;

    let mut input = income(cash.id, dec!(75), Currency::Try);
    input.status = Some(TransactionStatus::Pending);
    let created = ledger.transactions.create(input, actor()).await.unwrap();
    assert_eq!(created.transaction.status, TransactionStatus::Pending);
    assert_eq!(balance(&ledger, cash.id, Currency::Try).await, Decimal::ZERO);

    let completed = ledger.transactions.complete(created.transaction.id, actor()).await.unwrap();
    assert_eq!(completed.status, TransactionStatus::Completed);
    assert!(completed.completed_at.is_some());
    assert_eq!(balance(&ledger, cash.id, Currency::Try).await, dec!(75));

    // Completing twice applies nothing further.
    let err = ledger
        .transactions
        .complete(created.transaction.id, actor())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_STATUS_TRANSITION");
    assert_eq!(balance(&ledger, cash.id, Currency::Try).await, dec!(75));
}

#[tokio::test]
async fn test_cancelled_never_applies() {
    let ledger = ledger();
    let cash = open_single(&ledger, "Cash", Currency::Try).await;

    let mut input = income(cash.id, dec!(75), Currency::Try);
    input.status = Some(TransactionStatus::Pending);
    let created = ledger.transactions.create(input, actor()).await.unwrap();

    let cancelled = ledger.transactions.cancel(created.transaction.id, actor()).await.unwrap();
    assert_eq!(cancelled.status, TransactionStatus::Cancelled);

    let err = ledger
        .transactions
        .complete(created.transaction.id, actor())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_STATUS_TRANSITION");
    assert_eq!(balance(&ledger, cash.id, Currency::Try).await, Decimal::ZERO);

    // Deleting a cancelled transaction touches no balance either.
    ledger.transactions.delete(created.transaction.id, actor()).await.unwrap();
    assert_eq!(balance(&ledger, cash.id, Currency::Try).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_completed_cannot_be_cancelled() {
    let ledger = ledger();
    let cash = open_single(&ledger, "Cash", Currency::Try).await;
    let created = ledger
        .transactions
        .create(income(cash.id, dec!(1), Currency::Try), actor())
        .await
        .unwrap();

    let err = ledger.transactions.cancel(created.transaction.id, actor()).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidStatusTransition { .. }));
}

#[tokio::test]
async fn test_deleting_unknown_transaction() {
    let ledger = ledger();
    let err = ledger
        .transactions
        .delete(TransactionId::new(), actor())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "TRANSACTION_NOT_FOUND");
}

// ============================================================================
// Numbering, listing and reporting
// ============================================================================

#[tokio::test]
async fn test_transaction_numbers_are_unique() {
    let ledger = ledger();
    let cash = open_single(&ledger, "Cash", Currency::Try).await;

    let mut numbers = HashSet::new();
    for _ in 0..25 {
        let created = ledger
            .transactions
            .create(income(cash.id, dec!(1), Currency::Try), actor())
            .await
            .unwrap();
        assert!(created.transaction_number.starts_with("TRX-"));
        assert_eq!(created.transaction_number, created.transaction.transaction_number);
        assert!(numbers.insert(created.transaction_number));
    }
}

#[tokio::test]
async fn test_account_filter_matches_counter_side() {
    let ledger = ledger();
    let first = open_single(&ledger, "First", Currency::Try).await;
    let second = open_single(&ledger, "Second", Currency::Try).await;
    fund(&ledger, first.id, dec!(100), Currency::Try).await;
    ledger
        .transactions
        .create(transfer(first.id, second.id, dec!(40), Currency::Try, None, None), actor())
        .await
        .unwrap();

    let filter = TransactionFilter {
        account_id: Some(second.id),
        ..TransactionFilter::default()
    };
    let page = ledger
        .transactions
        .list(&filter, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0].transaction_type, TransactionType::Transfer);
}

#[tokio::test]
async fn test_listing_is_paginated_newest_first() {
    let ledger = ledger();
    let cash = open_single(&ledger, "Cash", Currency::Try).await;
    for (day, amount) in [(1, dec!(1)), (2, dec!(2)), (3, dec!(3))] {
        let mut input = income(cash.id, amount, Currency::Try);
        input.transaction_date = NaiveDate::from_ymd_opt(2026, 3, day);
        ledger.transactions.create(input, actor()).await.unwrap();
    }

    let page = ledger
        .transactions
        .list(&TransactionFilter::default(), &PageRequest::new(1, 2))
        .await
        .unwrap();
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.meta.total_pages, 2);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].amount, dec!(3));

    let last = ledger
        .transactions
        .list(&TransactionFilter::default(), &PageRequest::new(2, 2))
        .await
        .unwrap();
    assert_eq!(last.data.len(), 1);
    assert_eq!(last.data[0].amount, dec!(1));
}

#[tokio::test]
async fn test_summary_counts_only_completed_income_and_expense() {
    let ledger = ledger();
    let cash = open_single(&ledger, "Cash", Currency::Try).await;
    let other = open_single(&ledger, "Other", Currency::Try).await;
    fund(&ledger, cash.id, dec!(500), Currency::Try).await;
    ledger
        .transactions
        .create(expense(cash.id, dec!(120), Currency::Try), actor())
        .await
        .unwrap();
    ledger
        .transactions
        .create(transfer(cash.id, other.id, dec!(30), Currency::Try, None, None), actor())
        .await
        .unwrap();
    let mut pending = income(cash.id, dec!(999), Currency::Try);
    pending.status = Some(TransactionStatus::Pending);
    ledger.transactions.create(pending, actor()).await.unwrap();

    let summary = ledger.transactions.summarize(&TransactionFilter::default()).await.unwrap();
    let lira = &summary.by_currency[&Currency::Try];
    assert_eq!(lira.income, dec!(500));
    assert_eq!(lira.expense, dec!(120));
    assert_eq!(lira.net, dec!(380));
    assert_eq!(summary.by_status[&TransactionStatus::Pending], 1);
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn test_account_with_balance_cannot_be_deleted() {
    let ledger = ledger();
    let cash = open_single(&ledger, "Cash", Currency::Try).await;
    fund(&ledger, cash.id, dec!(1), Currency::Try).await;

    let err = ledger.accounts.delete(cash.id, actor()).await.unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_HAS_BALANCE");

    ledger
        .transactions
        .create(expense(cash.id, dec!(1), Currency::Try), actor())
        .await
        .unwrap();
    ledger.accounts.delete(cash.id, actor()).await.unwrap();

    let account = ledger.accounts.get(cash.id).await.unwrap();
    assert!(!account.is_active);
}

#[tokio::test]
async fn test_one_default_per_currency() {
    let ledger = ledger();
    let mut input = single_input("Main", Currency::Try);
    input.is_default = true;
    let main = ledger.accounts.create(input.clone(), actor()).await.unwrap();

    input.name = "Second".into();
    let err = ledger.accounts.create(input, actor()).await.unwrap_err();
    assert_eq!(err.error_code(), "DUPLICATE_DEFAULT");

    let found = ledger.accounts.default_account(Currency::Try).await.unwrap();
    assert_eq!(found.map(|a| a.id), Some(main.id));
    assert!(ledger.accounts.default_account(Currency::Usd).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_never_touches_balances() {
    let ledger = ledger();
    let wallet = open_multi(&ledger, "FX", Currency::Try, &[Currency::Try]).await;
    fund(&ledger, wallet.id, dec!(42), Currency::Try).await;

    let updated = ledger
        .accounts
        .update(
            wallet.id,
            UpdateAccountInput {
                name: Some("Treasury".into()),
                add_currencies: vec![Currency::Usd],
                ..UpdateAccountInput::default()
            },
            actor(),
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Treasury");
    assert_eq!(updated.balance(Currency::Try), Some(dec!(42)));
    assert_eq!(updated.balance(Currency::Usd), Some(Decimal::ZERO));
}

#[tokio::test]
async fn test_update_on_inactive_account_is_rejected() {
    let ledger = ledger();
    let closed = open_single(&ledger, "Closed", Currency::Try).await;
    ledger.accounts.delete(closed.id, actor()).await.unwrap();

    let err = ledger
        .accounts
        .update(
            closed.id,
            UpdateAccountInput {
                is_default: Some(true),
                ..UpdateAccountInput::default()
            },
            actor(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_INACTIVE");

    let stored = ledger.accounts.get(closed.id).await.unwrap();
    assert!(!stored.is_active);
    assert!(!stored.is_default);
}

#[tokio::test]
async fn test_total_balances_skip_inactive_accounts() {
    let ledger = ledger();
    let cash = open_single(&ledger, "Cash", Currency::Try).await;
    let wallet = open_multi(&ledger, "FX", Currency::Usd, &[Currency::Try, Currency::Usd]).await;
    let closed = open_single(&ledger, "Closed", Currency::Try).await;
    fund(&ledger, cash.id, dec!(10), Currency::Try).await;
    fund(&ledger, wallet.id, dec!(5), Currency::Try).await;
    fund(&ledger, wallet.id, dec!(7), Currency::Usd).await;
    ledger.accounts.delete(closed.id, actor()).await.unwrap();

    let totals = ledger.accounts.total_balances().await.unwrap();
    assert_eq!(totals[&Currency::Try], dec!(15));
    assert_eq!(totals[&Currency::Usd], dec!(7));
}

#[tokio::test]
async fn test_disabled_currency_cannot_open_accounts() {
    let mut config = config();
    config.ledger.currencies = vec![Currency::Try, Currency::Usd];
    let ledger = ledger_with(&config, Arc::new(UnavailableRateSource));

    let err = ledger
        .accounts
        .create(single_input("Pounds", Currency::Gbp), actor())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_CURRENCY");
}
