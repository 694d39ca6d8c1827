//! Upstream exchange rate sources.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use kasa_shared::types::Currency;

/// Errors raised while asking an upstream source for a rate.
#[derive(Debug, thiserror::Error)]
pub enum RateSourceError {
    /// HTTP transport or decoding failure.
    #[error("Rate request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The source answered without the requested pair.
    #[error("Upstream has no rate for {from} to {to}")]
    MissingRate {
        /// Source currency.
        from: Currency,
        /// Target currency.
        to: Currency,
    },

    /// No upstream is configured.
    #[error("No upstream rate source configured")]
    Unavailable,
}

/// Something that can quote the current rate of a currency pair.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Returns how many `to` one `from` buys.
    async fn fetch_rate(&self, from: Currency, to: Currency) -> Result<Decimal, RateSourceError>;
}

#[derive(Debug, Deserialize)]
struct LatestRates {
    rates: HashMap<String, Decimal>,
}

/// HTTP JSON rate API.
///
/// Requests `GET {base_url}/latest?from=USD&to=TRY` and expects
/// `{"rates": {"TRY": "32.15"}}`.
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRateSource {
    /// Builds a source with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RateSourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch_rate(&self, from: Currency, to: Currency) -> Result<Decimal, RateSourceError> {
        let body: LatestRates = self
            .client
            .get(format!("{}/latest", self.base_url))
            .query(&[("from", from.code()), ("to", to.code())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        body.rates
            .get(to.code())
            .copied()
            .filter(|rate| *rate > Decimal::ZERO)
            .ok_or(RateSourceError::MissingRate { from, to })
    }
}

/// Fixed table of rates. Used for tests and offline deployments.
#[derive(Debug, Clone, Default)]
pub struct StaticRateSource {
    rates: HashMap<(Currency, Currency), Decimal>,
}

impl StaticRateSource {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a quote.
    #[must_use]
    pub fn with_rate(mut self, from: Currency, to: Currency, rate: Decimal) -> Self {
        self.rates.insert((from, to), rate);
        self
    }
}

#[async_trait]
impl RateSource for StaticRateSource {
    async fn fetch_rate(&self, from: Currency, to: Currency) -> Result<Decimal, RateSourceError> {
        self.rates
            .get(&(from, to))
            .copied()
            .ok_or(RateSourceError::MissingRate { from, to })
    }
}

/// Source that always fails; the provider then serves cached and manual rates only.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRateSource;

#[async_trait]
impl RateSource for UnavailableRateSource {
    async fn fetch_rate(&self, _from: Currency, _to: Currency) -> Result<Decimal, RateSourceError> {
        Err(RateSourceError::Unavailable)
    }
}
