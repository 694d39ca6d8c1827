//! Property-based tests for balance mutation.
//!
//! - Reversal restores every touched slot decimal-exactly
//! - Stored balances always equal the replay of COMPLETED history

use std::collections::BTreeMap;

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use kasa_shared::types::{AccountId, Currency, UserId};

use super::account::Account;
use super::balance::{BalanceMutator, OverdraftPolicy, audit};
use super::transaction::fixtures::simple;
use super::transaction::{ExchangeDetails, Transaction, TransferDetails};
use super::types::{AccountMode, AccountType, CreateAccountInput, TransactionType, TransferDirection};
use crate::currency::CurrencyCatalog;

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn open(mode: AccountMode) -> Account {
    Account::open(
        &CreateAccountInput {
            name: "Prop".into(),
            account_type: AccountType::Bank,
            mode,
            currency: Currency::Try,
            supported_currencies: vec![Currency::Try, Currency::Usd],
            is_default: false,
            description: None,
            bank_name: None,
            iban: None,
        },
        &CurrencyCatalog::all(),
        UserId::new(),
        Utc::now(),
    )
    .expect("valid account")
}

#[derive(Debug, Clone)]
enum Op {
    Income(Decimal),
    Expense(Decimal),
    TransferOut(Decimal, Decimal),
    TransferIn(Decimal, Decimal),
    Exchange(Decimal, Decimal),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        amount().prop_map(Op::Income),
        amount().prop_map(Op::Expense),
        (amount(), amount()).prop_map(|(a, b)| Op::TransferOut(a, b)),
        (amount(), amount()).prop_map(|(a, b)| Op::TransferIn(a, b)),
        (amount(), amount()).prop_map(|(a, b)| Op::Exchange(a, b)),
    ]
}

/// Builds a transaction on `multi` (TRY/USD) with `single` (TRY) as counter.
fn build(op: &Op, multi: AccountId, single: AccountId) -> Transaction {
    match op {
        Op::Income(a) => simple(TransactionType::Income, multi, *a, Currency::Usd),
        Op::Expense(a) => simple(TransactionType::Expense, multi, *a, Currency::Try),
        Op::TransferOut(a, b) | Op::TransferIn(a, b) => {
            let mut tx = simple(TransactionType::Transfer, multi, *a, Currency::Usd);
            tx.transfer = Some(TransferDetails {
                counter_account_id: single,
                counter_account_name: "Single".into(),
                direction: if matches!(op, Op::TransferOut(..)) {
                    TransferDirection::Out
                } else {
                    TransferDirection::In
                },
                counter_currency: Currency::Try,
                counter_amount: *b,
                rate: Decimal::ONE,
            });
            tx
        }
        Op::Exchange(a, b) => {
            let mut tx = simple(TransactionType::Exchange, multi, *a, Currency::Usd);
            tx.exchange = Some(ExchangeDetails {
                to_currency: Currency::Try,
                to_amount: *b,
                rate: Decimal::ONE,
            });
            tx
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// reverse(apply(t)) leaves every slot exactly where it was.
    #[test]
    fn prop_reverse_undoes_apply(history in prop::collection::vec(op(), 0..20), last in op()) {
        let multi = open(AccountMode::Multi);
        let single = open(AccountMode::Single);
        let mut accounts: BTreeMap<AccountId, Account> =
            [(multi.id, multi.clone()), (single.id, single.clone())].into_iter().collect();

        for op in &history {
            BalanceMutator::apply(&build(op, multi.id, single.id), &mut accounts, OverdraftPolicy::Allow)
                .expect("apply");
        }
        let before = accounts.clone();

        let tx = build(&last, multi.id, single.id);
        BalanceMutator::apply(&tx, &mut accounts, OverdraftPolicy::Allow).expect("apply");
        BalanceMutator::reverse(&tx, &mut accounts).expect("reverse");

        for (id, account) in &before {
            prop_assert_eq!(account.slots(), accounts[id].slots());
        }
    }

    /// Applied balances always match a replay of the history.
    #[test]
    fn prop_balances_match_replay(history in prop::collection::vec(op(), 0..30)) {
        let multi = open(AccountMode::Multi);
        let single = open(AccountMode::Single);
        let mut accounts: BTreeMap<AccountId, Account> =
            [(multi.id, multi.clone()), (single.id, single.clone())].into_iter().collect();

        let txs: Vec<Transaction> = history.iter().map(|op| build(op, multi.id, single.id)).collect();
        for tx in &txs {
            BalanceMutator::apply(tx, &mut accounts, OverdraftPolicy::Allow).expect("apply");
        }

        let mismatches = audit(accounts.values(), txs.iter()).expect("audit");
        prop_assert!(mismatches.is_empty(), "drift: {:?}", mismatches);
    }

    /// With overdraft denied, no debit ever leaves a negative slot.
    #[test]
    fn prop_deny_never_goes_negative(history in prop::collection::vec(op(), 0..30)) {
        let multi = open(AccountMode::Multi);
        let single = open(AccountMode::Single);
        let mut accounts: BTreeMap<AccountId, Account> =
            [(multi.id, multi.clone()), (single.id, single.clone())].into_iter().collect();

        for op in &history {
            let mut attempt = accounts.clone();
            if BalanceMutator::apply(&build(op, multi.id, single.id), &mut attempt, OverdraftPolicy::Deny).is_ok() {
                accounts = attempt;
            }
        }

        for account in accounts.values() {
            for (_, balance) in account.slots() {
                prop_assert!(balance >= Decimal::ZERO);
            }
        }
    }
}
