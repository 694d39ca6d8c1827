//! Supported currencies and their display rules.

use std::collections::BTreeSet;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use kasa_shared::types::Currency;

use crate::ledger::LedgerError;

/// Where the currency symbol goes relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolPosition {
    /// `$1,234.50`
    Prefix,
    /// `1.234,50 ₺`
    Suffix,
}

/// Static display and rounding rules for one currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyInfo {
    /// ISO 4217 code.
    pub code: Currency,
    /// English display name.
    pub name: &'static str,
    /// Display symbol.
    pub symbol: &'static str,
    /// Minor-unit digits; balances and converted amounts round to this.
    pub decimal_places: u32,
    /// Digit group separator.
    pub thousands_separator: char,
    /// Separator between whole and fractional part.
    pub decimal_separator: char,
    /// Symbol placement.
    pub symbol_position: SymbolPosition,
}

/// Returns the display rules for a currency.
#[must_use]
pub const fn currency_info(currency: Currency) -> CurrencyInfo {
    match currency {
        Currency::Try => CurrencyInfo {
            code: Currency::Try,
            name: "Turkish Lira",
            symbol: "₺",
            decimal_places: 2,
            thousands_separator: '.',
            decimal_separator: ',',
            symbol_position: SymbolPosition::Suffix,
        },
        Currency::Usd => CurrencyInfo {
            code: Currency::Usd,
            name: "US Dollar",
            symbol: "$",
            decimal_places: 2,
            thousands_separator: ',',
            decimal_separator: '.',
            symbol_position: SymbolPosition::Prefix,
        },
        Currency::Eur => CurrencyInfo {
            code: Currency::Eur,
            name: "Euro",
            symbol: "€",
            decimal_places: 2,
            thousands_separator: '.',
            decimal_separator: ',',
            symbol_position: SymbolPosition::Prefix,
        },
        Currency::Gbp => CurrencyInfo {
            code: Currency::Gbp,
            name: "British Pound",
            symbol: "£",
            decimal_places: 2,
            thousands_separator: ',',
            decimal_separator: '.',
            symbol_position: SymbolPosition::Prefix,
        },
    }
}

/// The set of currencies this deployment accepts for new accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyCatalog {
    enabled: BTreeSet<Currency>,
}

impl Default for CurrencyCatalog {
    fn default() -> Self {
        Self::all()
    }
}

impl CurrencyCatalog {
    /// Creates a catalog limited to the given currencies.
    #[must_use]
    pub fn new(enabled: impl IntoIterator<Item = Currency>) -> Self {
        Self {
            enabled: enabled.into_iter().collect(),
        }
    }

    /// Creates a catalog with every known currency enabled.
    #[must_use]
    pub fn all() -> Self {
        Self::new(Currency::ALL)
    }

    /// Returns true if accounts may be opened in this currency.
    #[must_use]
    pub fn is_enabled(&self, currency: Currency) -> bool {
        self.enabled.contains(&currency)
    }

    /// Fails with `INVALID_CURRENCY` if the currency is not enabled.
    pub fn ensure_enabled(&self, currency: Currency) -> Result<(), LedgerError> {
        if self.is_enabled(currency) {
            Ok(())
        } else {
            Err(LedgerError::InvalidCurrency(currency))
        }
    }

    /// Enabled currencies in display order.
    pub fn enabled(&self) -> impl Iterator<Item = Currency> + '_ {
        self.enabled.iter().copied()
    }

    /// Display rules for every enabled currency.
    #[must_use]
    pub fn infos(&self) -> Vec<CurrencyInfo> {
        self.enabled().map(currency_info).collect()
    }

    /// Rounds an amount to the currency's minor unit using banker's rounding.
    #[must_use]
    pub fn round(amount: Decimal, currency: Currency) -> Decimal {
        amount.round_dp_with_strategy(
            currency_info(currency).decimal_places,
            RoundingStrategy::MidpointNearestEven,
        )
    }

    /// Formats an amount for display, e.g. `1.234,50 ₺` or `-$12.00`.
    #[must_use]
    pub fn format(amount: Decimal, currency: Currency) -> String {
        let info = currency_info(currency);
        let rounded = Self::round(amount, currency);
        let digits = format!(
            "{:.prec$}",
            rounded.abs(),
            prec = info.decimal_places as usize
        );
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (digits.as_str(), None),
        };

        let mut number = group_digits(whole, info.thousands_separator);
        if let Some(fraction) = fraction {
            number.push(info.decimal_separator);
            number.push_str(fraction);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        match info.symbol_position {
            SymbolPosition::Prefix => format!("{sign}{}{number}", info.symbol),
            SymbolPosition::Suffix => format!("{sign}{number} {}", info.symbol),
        }
    }
}

fn group_digits(whole: &str, separator: char) -> String {
    let len = whole.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}
