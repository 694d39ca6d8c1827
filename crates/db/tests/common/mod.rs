//! Shared fixtures for the ledger integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;

use kasa_core::ledger::{
    Account, AccountMode, AccountType, CreateAccountInput, CreateTransactionInput, ExchangeInput, TransactionType,
    TransferDirection, TransferInput,
};
use kasa_db::repositories::{RateSource, StaticRateSource, UnavailableRateSource};
use kasa_db::{Ledger, MemoryStore};
use kasa_shared::AppConfig;
use kasa_shared::types::{AccountId, Currency, UserId};

pub fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.ledger.retry_backoff_ms = 1;
    config
}

pub fn ledger_with(config: &AppConfig, source: Arc<dyn RateSource>) -> Ledger {
    Ledger::new(Arc::new(MemoryStore::new()), source, config)
}

pub fn ledger() -> Ledger {
    ledger_with(&config(), Arc::new(UnavailableRateSource))
}

pub fn ledger_with_rates(rates: StaticRateSource) -> Ledger {
    ledger_with(&config(), Arc::new(rates))
}

pub fn actor() -> UserId {
    UserId::new()
}

pub fn single_input(name: &str, currency: Currency) -> CreateAccountInput {
    CreateAccountInput {
        name: name.to_string(),
        account_type: AccountType::Cash,
        mode: AccountMode::Single,
        currency,
        supported_currencies: Vec::new(),
        is_default: false,
        description: None,
        bank_name: None,
        iban: None,
    }
}

pub fn multi_input(name: &str, currency: Currency, supported: &[Currency]) -> CreateAccountInput {
    CreateAccountInput {
        account_type: AccountType::Bank,
        mode: AccountMode::Multi,
        supported_currencies: supported.to_vec(),
        ..single_input(name, currency)
    }
}

pub async fn open_single(ledger: &Ledger, name: &str, currency: Currency) -> Account {
    ledger.accounts.create(single_input(name, currency), actor()).await.unwrap()
}

pub async fn open_multi(ledger: &Ledger, name: &str, currency: Currency, supported: &[Currency]) -> Account {
    ledger
        .accounts
        .create(multi_input(name, currency, supported), actor())
        .await
        .unwrap()
}

pub fn income(account_id: AccountId, amount: Decimal, currency: Currency) -> CreateTransactionInput {
    CreateTransactionInput::simple(TransactionType::Income, account_id, amount, currency)
}

pub fn expense(account_id: AccountId, amount: Decimal, currency: Currency) -> CreateTransactionInput {
    CreateTransactionInput::simple(TransactionType::Expense, account_id, amount, currency)
}

pub fn transfer(
    from: AccountId,
    to: AccountId,
    amount: Decimal,
    currency: Currency,
    counter_currency: Option<Currency>,
    rate: Option<Decimal>,
) -> CreateTransactionInput {
    let mut input = CreateTransactionInput::simple(TransactionType::Transfer, from, amount, currency);
    input.transfer = Some(TransferInput {
        counter_account_id: to,
        direction: TransferDirection::Out,
        counter_currency,
        rate,
    });
    input
}

pub fn exchange(
    account_id: AccountId,
    amount: Decimal,
    from: Currency,
    to: Currency,
    rate: Option<Decimal>,
) -> CreateTransactionInput {
    let mut input = CreateTransactionInput::simple(TransactionType::Exchange, account_id, amount, from);
    input.exchange = Some(ExchangeInput { to_currency: to, rate });
    input
}

pub async fn balance(ledger: &Ledger, id: AccountId, currency: Currency) -> Decimal {
    ledger
        .accounts
        .get(id)
        .await
        .unwrap()
        .balance(currency)
        .unwrap_or_default()
}

pub async fn fund(ledger: &Ledger, id: AccountId, amount: Decimal, currency: Currency) {
    ledger.transactions.create(income(id, amount, currency), actor()).await.unwrap();
}
