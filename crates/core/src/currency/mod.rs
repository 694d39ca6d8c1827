//! Currency catalog, conversion and exchange rates.

pub mod catalog;
pub mod conversion;
pub mod exchange;

#[cfg(test)]
mod props;

pub use catalog::{CurrencyCatalog, CurrencyInfo, SymbolPosition, currency_info};
pub use conversion::{RATE_DECIMAL_PLACES, convert_amount, convert_to, invert_amount, inverse_rate};
pub use exchange::{ExchangeRate, Freshness, RateOrigin};
