//! Exchange rate types and freshness rules.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kasa_shared::types::Currency;

use super::conversion::inverse_rate;
use crate::ledger::LedgerError;

/// Where a cached rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateOrigin {
    /// Fetched from the upstream rate source.
    Upstream,
    /// Entered by an operator; never expires.
    Manual,
    /// Identity rate between a currency and itself.
    Identity,
}

impl RateOrigin {
    /// Stable string form used for persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upstream => "UPSTREAM",
            Self::Manual => "MANUAL",
            Self::Identity => "IDENTITY",
        }
    }
}

impl std::str::FromStr for RateOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPSTREAM" => Ok(Self::Upstream),
            "MANUAL" => Ok(Self::Manual),
            "IDENTITY" => Ok(Self::Identity),
            _ => Err(format!("Unknown rate origin: {s}")),
        }
    }
}

/// How usable a cached rate is at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Within the TTL; serve without asking upstream.
    Fresh,
    /// Past the TTL but inside the stale window; usable only if upstream fails.
    Stale,
    /// Too old to serve at all.
    Expired,
}

/// Exchange rate between two currencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Source currency.
    pub from: Currency,
    /// Target currency.
    pub to: Currency,
    /// Exchange rate (1 `from` = `rate` `to`).
    pub rate: Decimal,
    /// When the rate was obtained.
    pub fetched_at: DateTime<Utc>,
    /// Where the rate came from.
    pub origin: RateOrigin,
}

impl ExchangeRate {
    /// Creates a new exchange rate.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_EXCHANGE_RATE` unless the rate is positive, and
    /// `SAME_CURRENCY_EXCHANGE` for a non-identity rate between equal currencies.
    pub fn new(
        from: Currency,
        to: Currency,
        rate: Decimal,
        fetched_at: DateTime<Utc>,
        origin: RateOrigin,
    ) -> Result<Self, LedgerError> {
        if rate <= Decimal::ZERO {
            return Err(LedgerError::InvalidExchangeRate);
        }
        if from == to && origin != RateOrigin::Identity {
            return Err(LedgerError::SameCurrencyExchange);
        }
        Ok(Self {
            from,
            to,
            rate,
            fetched_at,
            origin,
        })
    }

    /// The rate `1` between a currency and itself.
    #[must_use]
    pub fn identity(currency: Currency, now: DateTime<Utc>) -> Self {
        Self {
            from: currency,
            to: currency,
            rate: Decimal::ONE,
            fetched_at: now,
            origin: RateOrigin::Identity,
        }
    }

    /// Returns the inverse rate, or `None` if it cannot be represented.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let rate = inverse_rate(self.rate)?;
        if rate.is_zero() {
            return None;
        }
        Some(Self {
            from: self.to,
            to: self.from,
            rate,
            fetched_at: self.fetched_at,
            origin: self.origin,
        })
    }

    /// Classifies the rate against a TTL and a maximum stale age.
    ///
    /// Manual and identity rates are always fresh.
    #[must_use]
    pub fn freshness(&self, now: DateTime<Utc>, ttl: Duration, max_stale: Duration) -> Freshness {
        if matches!(self.origin, RateOrigin::Manual | RateOrigin::Identity) {
            return Freshness::Fresh;
        }
        let age = now.signed_duration_since(self.fetched_at);
        if age <= ttl {
            Freshness::Fresh
        } else if age <= max_stale {
            Freshness::Stale
        } else {
            Freshness::Expired
        }
    }
}
