//! Supplier payable routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

use kasa_core::personnel::{CreatePayableInput, PayPayableInput, Payable, PayableView};
use kasa_db::repositories::PayablePayment;
use kasa_shared::types::PayableId;

use crate::{AppState, error::ApiError, extractors::Actor};

/// Creates the payable routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payables", get(list_payables).post(create_payable))
        .route("/payables/{payable_id}", get(get_payable))
        .route("/payables/{payable_id}/pay", post(pay_payable))
}

/// Query parameters for listing payables.
#[derive(Debug, Deserialize)]
pub struct ListPayablesQuery {
    /// Only payables with an open amount.
    #[serde(default)]
    pub open_only: bool,
}

/// GET `/payables`
async fn list_payables(
    State(state): State<AppState>,
    Query(query): Query<ListPayablesQuery>,
) -> Result<Json<Value>, ApiError> {
    let payables = state.ledger.personnel.list_payables(query.open_only).await?;
    Ok(Json(json!({ "payables": payables })))
}

/// POST `/payables`
async fn create_payable(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreatePayableInput>,
) -> Result<(StatusCode, Json<Payable>), ApiError> {
    let payable = state
        .ledger
        .personnel
        .create_payable(payload, actor.user_id())
        .await?;
    Ok((StatusCode::CREATED, Json(payable)))
}

/// GET `/payables/{payable_id}` - The payable with its settlement.
async fn get_payable(
    State(state): State<AppState>,
    Path(payable_id): Path<PayableId>,
) -> Result<Json<PayableView>, ApiError> {
    Ok(Json(state.ledger.personnel.get_payable(payable_id).await?))
}

/// POST `/payables/{payable_id}/pay` - Pay all or part of the open amount.
async fn pay_payable(
    State(state): State<AppState>,
    actor: Actor,
    Path(payable_id): Path<PayableId>,
    Json(payload): Json<PayPayableInput>,
) -> Result<(StatusCode, Json<PayablePayment>), ApiError> {
    let payment = state
        .ledger
        .personnel
        .pay_payable(payable_id, payload, actor.user_id())
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}
