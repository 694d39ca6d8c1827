//! The ledger against a real `PostgreSQL` database.
//!
//! Needs `DATABASE_URL` (or `KASA__DATABASE__URL`); every test returns early
//! when neither is set. Tests create their own accounts and never clear
//! collections, so they can share a database.

mod common;

use std::env;
use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm_migration::MigratorTrait;

use kasa_core::ledger::TransactionFilter;
use kasa_db::repositories::UnavailableRateSource;
use kasa_db::{Ledger, Migrator, PgStore};
use kasa_shared::config::DatabaseConfig;
use kasa_shared::types::Currency;

use common::*;

fn database_url() -> Option<String> {
    env::var("DATABASE_URL")
        .or_else(|_| env::var("KASA__DATABASE__URL"))
        .ok()
}

async fn pg_ledger(max_retries: u32) -> Option<Ledger> {
    let Some(url) = database_url() else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
        return None;
    };
    let store = PgStore::connect(&DatabaseConfig {
        url: Some(url),
        ..DatabaseConfig::default()
    })
    .await
    .unwrap();
    Migrator::up(store.connection(), None).await.unwrap();

    let mut config = config();
    config.ledger.max_retries = max_retries;
    Some(Ledger::new(Arc::new(store), Arc::new(UnavailableRateSource), &config))
}

#[tokio::test]
async fn test_postgres_income_expense_delete() {
    let Some(ledger) = pg_ledger(8).await else { return };
    let cash = open_single(&ledger, "Cash TRY (pg)", Currency::Try).await;

    fund(&ledger, cash.id, dec!(1000), Currency::Try).await;
    let spent = ledger
        .transactions
        .create(expense(cash.id, dec!(400), Currency::Try), actor())
        .await
        .unwrap();
    assert_eq!(balance(&ledger, cash.id, Currency::Try).await, dec!(600));

    ledger.transactions.delete(spent.transaction.id, actor()).await.unwrap();
    assert_eq!(balance(&ledger, cash.id, Currency::Try).await, dec!(1000));

    let stored = ledger.accounts.get(cash.id).await.unwrap();
    assert_eq!(stored.version, 3);
}

#[tokio::test]
async fn test_postgres_multi_currency_transfer() {
    let Some(ledger) = pg_ledger(8).await else { return };
    let wallet = open_multi(&ledger, "FX (pg)", Currency::Usd, &[Currency::Usd, Currency::Eur]).await;
    let euros = open_single(&ledger, "EUR (pg)", Currency::Eur).await;
    fund(&ledger, wallet.id, dec!(50), Currency::Eur).await;

    let created = ledger
        .transactions
        .create(transfer(wallet.id, euros.id, dec!(20), Currency::Eur, None, None), actor())
        .await
        .unwrap();

    let fetched = ledger.transactions.get(created.transaction.id).await.unwrap();
    assert_eq!(fetched.transaction_number, created.transaction_number);
    assert_eq!(fetched.transfer, created.transaction.transfer);
    assert_eq!(balance(&ledger, wallet.id, Currency::Eur).await, dec!(30));
    assert_eq!(balance(&ledger, euros.id, Currency::Eur).await, dec!(20));

    let listed = ledger
        .transactions
        .list_all(&TransactionFilter {
            account_id: Some(euros.id),
            ..TransactionFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_postgres_concurrent_incomes() {
    let Some(ledger) = pg_ledger(256).await else { return };
    let cash = open_single(&ledger, "Concurrent (pg)", Currency::Try).await;

    let results = join_all((0..20).map(|_| {
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

    assert_eq!(balance(&ledger, cash.id, Currency::Try).await, dec!(20));
}
