//! Account management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};

use kasa_core::ledger::{Account, AccountFilter, CreateAccountInput, UpdateAccountInput};
use kasa_shared::types::{AccountId, Currency};

use crate::{AppState, error::ApiError, extractors::Actor};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/totals", get(total_balances))
        .route("/accounts/default/{currency}", get(default_account))
        .route(
            "/accounts/{account_id}",
            get(get_account).put(update_account).delete(delete_account),
        )
}

/// GET `/accounts` - List accounts, filtered by `account_type`, `currency`
/// and `is_active`.
async fn list_accounts(
    State(state): State<AppState>,
    Query(filter): Query<AccountFilter>,
) -> Result<Json<Value>, ApiError> {
    let accounts = state.ledger.accounts.list(&filter).await?;
    Ok(Json(json!({ "accounts": accounts })))
}

/// POST `/accounts` - Open an account.
async fn create_account(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateAccountInput>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    let account = state.ledger.accounts.create(payload, actor.user_id()).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET `/accounts/{account_id}`
async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<Account>, ApiError> {
    Ok(Json(state.ledger.accounts.get(account_id).await?))
}

/// PUT `/accounts/{account_id}` - Edit metadata. Balances cannot be set here.
async fn update_account(
    State(state): State<AppState>,
    actor: Actor,
    Path(account_id): Path<AccountId>,
    Json(payload): Json<UpdateAccountInput>,
) -> Result<Json<Account>, ApiError> {
    let account = state
        .ledger
        .accounts
        .update(account_id, payload, actor.user_id())
        .await?;
    Ok(Json(account))
}

/// DELETE `/accounts/{account_id}` - Deactivate an empty account.
async fn delete_account(
    State(state): State<AppState>,
    actor: Actor,
    Path(account_id): Path<AccountId>,
) -> Result<StatusCode, ApiError> {
    state.ledger.accounts.delete(account_id, actor.user_id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/accounts/default/{currency}` - The default account for a currency,
/// or `null`.
async fn default_account(
    State(state): State<AppState>,
    Path(currency): Path<Currency>,
) -> Result<Json<Value>, ApiError> {
    let account = state.ledger.accounts.default_account(currency).await?;
    Ok(Json(json!({ "account": account })))
}

/// GET `/accounts/totals` - Sum of balances per currency over active accounts.
async fn total_balances(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let totals = state.ledger.accounts.total_balances().await?;
    Ok(Json(json!({ "totals": totals })))
}
