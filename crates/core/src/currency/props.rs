//! Property-based tests for currency operations.

use proptest::prelude::*;
use rust_decimal::Decimal;

use kasa_shared::types::Currency;

use super::catalog::CurrencyCatalog;
use super::conversion::{convert_amount, inverse_rate};

/// Strategy to generate positive decimal amounts (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate positive exchange rates (0.0001 to 10000.0000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn any_currency() -> impl Strategy<Value = Currency> {
    prop::sample::select(Currency::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Conversion never produces more digits than the target precision.
    #[test]
    fn prop_convert_respects_precision(
        amount in positive_amount(),
        rate in positive_rate(),
        dp in 0u32..=4,
    ) {
        let result = convert_amount(amount, rate, dp).unwrap();
        prop_assert!(result.scale() <= dp, "{} has scale above {}", result, dp);
    }

    /// Conversion with rate 1 is the identity for already-rounded amounts.
    #[test]
    fn prop_unit_rate_is_identity(amount in positive_amount()) {
        prop_assert_eq!(convert_amount(amount, Decimal::ONE, 2), Some(amount));
    }

    /// Rounding twice changes nothing.
    #[test]
    fn prop_round_is_idempotent(
        cents in -10_000_000_000i64..10_000_000_000i64,
        currency in any_currency(),
    ) {
        let amount = Decimal::new(cents, 4);
        let once = CurrencyCatalog::round(amount, currency);
        prop_assert_eq!(CurrencyCatalog::round(once, currency), once);
    }

    /// A rate times its stored inverse stays within rate precision of one.
    #[test]
    fn prop_inverse_rate_is_close(rate in positive_rate()) {
        let inverse = inverse_rate(rate).unwrap();
        let product = rate * inverse;
        let tolerance = rate * Decimal::new(1, 8);
        prop_assert!((product - Decimal::ONE).abs() <= tolerance);
    }

    /// Formatting keeps every digit of the rounded amount.
    #[test]
    fn prop_format_keeps_digits(amount in positive_amount(), currency in any_currency()) {
        let formatted = CurrencyCatalog::format(amount, currency);
        let digits: String = formatted.chars().filter(char::is_ascii_digit).collect();
        let expected: String = format!("{:.2}", CurrencyCatalog::round(amount, currency))
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        prop_assert_eq!(digits, expected);
    }
}
