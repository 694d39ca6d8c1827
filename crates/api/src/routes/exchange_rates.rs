//! Exchange rate routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use kasa_core::currency::ExchangeRate;
use kasa_shared::types::Currency;

use crate::{AppState, error::ApiError, extractors::Actor};

/// Creates the exchange rate routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/exchange-rates/convert", get(convert))
        .route("/exchange-rates/{from}/{to}", get(get_rate).put(set_manual_rate))
}

/// Request body for a manual rate.
#[derive(Debug, Deserialize)]
pub struct ManualRateRequest {
    /// 1 `from` = `rate` `to`.
    pub rate: Decimal,
}

/// Query parameters for a conversion.
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    /// Amount in `from`.
    pub amount: Decimal,
    /// Source currency.
    pub from: Currency,
    /// Target currency.
    pub to: Currency,
}

/// Response for a conversion.
#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    /// Amount in `from`.
    pub amount: Decimal,
    /// Source currency.
    pub from: Currency,
    /// Converted amount, rounded to `to`'s minor unit.
    pub converted: Decimal,
    /// Target currency.
    pub to: Currency,
}

/// GET `/exchange-rates/{from}/{to}` - Cached, upstream or stale rate.
async fn get_rate(
    State(state): State<AppState>,
    Path((from, to)): Path<(Currency, Currency)>,
) -> Result<Json<ExchangeRate>, ApiError> {
    Ok(Json(state.ledger.rates.get_rate(from, to).await?))
}

/// PUT `/exchange-rates/{from}/{to}` - Operator override.
async fn set_manual_rate(
    State(state): State<AppState>,
    actor: Actor,
    Path((from, to)): Path<(Currency, Currency)>,
    Json(payload): Json<ManualRateRequest>,
) -> Result<Json<ExchangeRate>, ApiError> {
    let rate = state.ledger.rates.set_manual_rate(from, to, payload.rate).await?;
    info!(%from, %to, actor = %actor.user_id(), "Manual rate set via API");
    Ok(Json(rate))
}

/// GET `/exchange-rates/convert?amount=&from=&to=`
async fn convert(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let converted = state
        .ledger
        .rates
        .convert(query.amount, query.from, query.to)
        .await?;
    Ok(Json(ConvertResponse {
        amount: query.amount,
        from: query.from,
        converted,
        to: query.to,
    }))
}
