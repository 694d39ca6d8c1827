//! Currency listing routes.

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};

use crate::AppState;

/// Creates the currency routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/currencies", get(list_currencies))
}

/// GET `/currencies` - Enabled currencies with their display rules.
async fn list_currencies(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "currencies": state.ledger.accounts.catalog().infos() }))
}
