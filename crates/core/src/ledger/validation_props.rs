//! Property-based tests for transaction validation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use kasa_shared::types::{AccountId, Currency};

use super::error::LedgerError;
use super::types::{CreateTransactionInput, ExchangeInput, TransactionType, TransferDirection, TransferInput};
use super::validation::check_transaction_input;

fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..=0i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn transaction_type() -> impl Strategy<Value = TransactionType> {
    prop::sample::select(vec![
        TransactionType::Income,
        TransactionType::Expense,
        TransactionType::Transfer,
        TransactionType::Exchange,
    ])
}

/// A well-formed input of the given type with `amount`.
fn input(transaction_type: TransactionType, amount: Decimal) -> CreateTransactionInput {
    let mut input = CreateTransactionInput::simple(transaction_type, AccountId::new(), amount, Currency::Usd);
    match transaction_type {
        TransactionType::Transfer => {
            input.transfer = Some(TransferInput {
                counter_account_id: AccountId::new(),
                direction: TransferDirection::Out,
                counter_currency: None,
                rate: None,
            });
        }
        TransactionType::Exchange => {
            input.exchange = Some(ExchangeInput {
                to_currency: Currency::Try,
                rate: None,
            });
        }
        TransactionType::Income | TransactionType::Expense => {}
    }
    input
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// amount <= 0 is rejected with INVALID_AMOUNT for every type.
    #[test]
    fn prop_non_positive_amount_rejected(
        ty in transaction_type(),
        amount in non_positive_amount(),
    ) {
        let result = check_transaction_input(&input(ty, amount));
        prop_assert!(matches!(result, Err(LedgerError::InvalidAmount(a)) if a == amount));
    }

    /// Well-formed inputs with a positive amount pass the shape check.
    #[test]
    fn prop_positive_amount_accepted(
        ty in transaction_type(),
        amount in positive_amount(),
    ) {
        prop_assert!(check_transaction_input(&input(ty, amount)).is_ok());
    }
}
