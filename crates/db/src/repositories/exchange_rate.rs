//! Exchange rate provider with a TTL cache in the store.
//!
//! Lookup order for a pair:
//! 1. Identity rate for equal currencies
//! 2. Fresh cached rate, direct or inverse
//! 3. Upstream [`RateSource`], cached on success
//! 4. Stale cached rate younger than `max_stale_secs`, with a warning
//!
//! Freshness is checked passively on read; nothing runs in the background.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use kasa_core::LedgerError;
use kasa_core::currency::{ExchangeRate, Freshness, RateOrigin, convert_to};
use kasa_core::ledger::validate_rate;
use kasa_shared::ExchangeRateConfig;
use kasa_shared::types::Currency;

use super::rate_source::RateSource;
use crate::store::LedgerStore;

/// Rate lookups for cross-currency transfers, exchanges and reporting.
#[derive(Clone)]
pub struct ExchangeRateProvider {
    store: Arc<dyn LedgerStore>,
    source: Arc<dyn RateSource>,
    ttl: Duration,
    max_stale: Duration,
}

fn seconds(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

impl ExchangeRateProvider {
    /// Creates a provider over the store's rate cache.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, source: Arc<dyn RateSource>, config: &ExchangeRateConfig) -> Self {
        Self {
            store,
            source,
            ttl: seconds(config.ttl_secs),
            max_stale: seconds(config.max_stale_secs),
        }
    }

    /// Returns the rate converting `from` into `to`.
    ///
    /// # Errors
    ///
    /// Returns `RATE_UNAVAILABLE` when neither the cache nor upstream can
    /// supply a usable rate.
    pub async fn get_rate(&self, from: Currency, to: Currency) -> Result<ExchangeRate, LedgerError> {
        let now = Utc::now();
        if from == to {
            return Ok(ExchangeRate::identity(from, now));
        }

        let cached = self.cached(from, to).await?;
        if let Some(rate) = cached
            .iter()
            .find(|rate| rate.freshness(now, self.ttl, self.max_stale) == Freshness::Fresh)
        {
            debug!(%from, %to, rate = %rate.rate, "Exchange rate cache hit");
            return Ok(rate.clone());
        }

        match self.source.fetch_rate(from, to).await {
            Ok(quote) => {
                let rate = ExchangeRate::new(from, to, quote, now, RateOrigin::Upstream)?;
                self.store.put_rate(&rate).await?;
                info!(%from, %to, rate = %rate.rate, "Fetched exchange rate from upstream");
                Ok(rate)
            }
            Err(err) => {
                let stale = cached
                    .into_iter()
                    .find(|rate| rate.freshness(now, self.ttl, self.max_stale) == Freshness::Stale);
                match stale {
                    Some(rate) => {
                        warn!(
                            %from,
                            %to,
                            error = %err,
                            fetched_at = %rate.fetched_at,
                            "Upstream rate unavailable, serving stale cached rate"
                        );
                        Ok(rate)
                    }
                    None => {
                        warn!(%from, %to, error = %err, "No exchange rate available");
                        Err(LedgerError::RateUnavailable { from, to })
                    }
                }
            }
        }
    }

    /// Cached candidates for a pair: the direct entry, then the inverted
    /// reverse entry.
    async fn cached(&self, from: Currency, to: Currency) -> Result<Vec<ExchangeRate>, LedgerError> {
        let mut candidates = Vec::with_capacity(2);
        if let Some(direct) = self.store.get_rate(from, to).await? {
            candidates.push(direct);
        }
        if let Some(inverse) = self.store.get_rate(to, from).await?.and_then(|r| r.inverse()) {
            candidates.push(inverse);
        }
        Ok(candidates)
    }

    /// Stores an operator-entered rate. Manual rates never expire.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_EXCHANGE_RATE` unless the rate is positive and
    /// `SAME_CURRENCY_EXCHANGE` for equal currencies.
    pub async fn set_manual_rate(
        &self,
        from: Currency,
        to: Currency,
        rate: Decimal,
    ) -> Result<ExchangeRate, LedgerError> {
        validate_rate(rate)?;
        let rate = ExchangeRate::new(from, to, rate, Utc::now(), RateOrigin::Manual)?;
        self.store.put_rate(&rate).await?;
        info!(%from, %to, rate = %rate.rate, "Manual exchange rate set");
        Ok(rate)
    }

    /// Converts an amount, rounded to the target currency's minor unit.
    ///
    /// # Errors
    ///
    /// Returns `RATE_UNAVAILABLE` without a usable rate.
    pub async fn convert(&self, amount: Decimal, from: Currency, to: Currency) -> Result<Decimal, LedgerError> {
        let rate = self.get_rate(from, to).await?;
        convert_to(amount, rate.rate, to)
            .ok_or_else(|| LedgerError::Internal(format!("overflow converting {amount} {from} to {to}")))
    }
}
