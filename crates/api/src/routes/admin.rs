//! Maintenance routes: statistics, audit and guarded clears.
//!
//! Clearing is two-step. POST `/admin/confirmations` with a scope issues a
//! token but never returns it: the token goes to the operator through the
//! server log, and the clear call must then present it.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use kasa_db::repositories::AuditReport;
use kasa_db::store::ClearPlan;

use crate::{AppState, error::ApiError, extractors::Actor};

/// Creates the admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/stats", get(get_stats))
        .route("/admin/audit", get(audit_balances))
        .route("/admin/confirmations", post(request_confirmation))
        .route("/admin/collections/{name}", delete(clear_collection))
        .route("/admin/clear-all", post(clear_all))
}

/// Request body for a confirmation token.
#[derive(Debug, Deserialize)]
pub struct ConfirmationRequest {
    /// `all` or a collection name.
    pub scope: String,
}

/// Acknowledges an issued token without disclosing it.
#[derive(Debug, Serialize)]
pub struct ConfirmationIssued {
    /// Scope the token authorises.
    pub scope: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// The token authorising a destructive call.
#[derive(Debug, Deserialize)]
pub struct TokenParams {
    /// Token issued via `/admin/confirmations` and relayed from the log.
    #[serde(default)]
    pub token: String,
}

/// GET `/admin/stats` - Row count per collection.
async fn get_stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let counts = state.ledger.admin.get_stats().await?;
    Ok(Json(json!({ "collections": counts })))
}

/// GET `/admin/audit` - Recompute every balance from history.
async fn audit_balances(State(state): State<AppState>) -> Result<Json<AuditReport>, ApiError> {
    Ok(Json(state.ledger.admin.audit_balances().await?))
}

/// POST `/admin/confirmations` - Issue a token and hand it to the operator log.
async fn request_confirmation(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<ConfirmationRequest>,
) -> Result<(StatusCode, Json<ConfirmationIssued>), ApiError> {
    let scope = payload.scope.trim();
    if scope.is_empty() {
        return Err(ApiError::BadRequest("scope is required".to_string()));
    }
    let confirmation = state.ledger.admin.request_confirmation(scope)?;
    warn!(scope = %confirmation.scope, actor = %actor.user_id(), "Destructive operation requested");
    Ok((
        StatusCode::ACCEPTED,
        Json(ConfirmationIssued {
            scope: confirmation.scope,
            expires_at: confirmation.expires_at,
        }),
    ))
}

/// DELETE `/admin/collections/{name}?token=`
async fn clear_collection(
    State(state): State<AppState>,
    actor: Actor,
    Path(name): Path<String>,
    Query(params): Query<TokenParams>,
) -> Result<Json<ClearPlan>, ApiError> {
    let plan = state.ledger.admin.clear_collection(&name, &params.token).await?;
    warn!(collection = %name, actor = %actor.user_id(), "Collection cleared via API");
    Ok(Json(plan))
}

/// POST `/admin/clear-all`
async fn clear_all(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<TokenParams>,
) -> Result<Json<ClearPlan>, ApiError> {
    let plan = state.ledger.admin.clear_all(&payload.token).await?;
    warn!(actor = %actor.user_id(), "All ledger data cleared via API");
    Ok(Json(plan))
}
