//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod accounts;
pub mod admin;
pub mod currencies;
pub mod exchange_rates;
pub mod health;
pub mod payables;
pub mod personnel;
pub mod transactions;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(currencies::routes())
        .merge(accounts::routes())
        .merge(transactions::routes())
        .merge(exchange_rates::routes())
        .merge(personnel::routes())
        .merge(payables::routes())
        .merge(admin::routes())
}
