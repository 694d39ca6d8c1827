//! Currency conversion logic.
//!
//! CRITICAL: Rounding strategy for multi-currency:
//! - Always round to the target currency's decimal places
//! - Use banker's rounding (round half to even)
//! - Store both original and converted amounts

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

use kasa_shared::types::Currency;

use super::catalog::currency_info;

/// Decimal places kept on stored and derived exchange rates.
pub const RATE_DECIMAL_PLACES: u32 = 8;

/// Converts an amount using the given exchange rate.
///
/// Uses banker's rounding (round half to even) to minimize cumulative errors.
/// Returns `None` on overflow.
#[must_use]
pub fn convert_amount(amount: Decimal, rate: Decimal, decimal_places: u32) -> Option<Decimal> {
    amount
        .checked_mul(rate)
        .map(|converted| converted.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven))
}

/// Converts an amount backwards through a rate (`amount / rate`).
///
/// Returns `None` for a zero rate or on overflow.
#[must_use]
pub fn invert_amount(amount: Decimal, rate: Decimal, decimal_places: u32) -> Option<Decimal> {
    amount
        .checked_div(rate)
        .map(|converted| converted.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven))
}

/// Converts into `to`, rounding to its minor unit.
#[must_use]
pub fn convert_to(amount: Decimal, rate: Decimal, to: Currency) -> Option<Decimal> {
    convert_amount(amount, rate, currency_info(to).decimal_places)
}

/// Returns `1 / rate` at stored-rate precision.
#[must_use]
pub fn inverse_rate(rate: Decimal) -> Option<Decimal> {
    Decimal::ONE
        .checked_div(rate)
        .map(|inverse| inverse.round_dp_with_strategy(RATE_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven))
}
