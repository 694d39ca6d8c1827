//! Transaction routes: create, list, status transitions and delete.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};

use kasa_core::ledger::{CreateTransactionInput, Transaction, TransactionFilter, TransactionSummary};
use kasa_db::repositories::CreatedTransaction;
use kasa_shared::types::{PageRequest, PageResponse, TransactionId};

use crate::{AppState, error::ApiError, extractors::Actor};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route("/transactions/summary", get(summarize))
        .route(
            "/transactions/{transaction_id}",
            get(get_transaction).delete(delete_transaction),
        )
        .route("/transactions/{transaction_id}/complete", post(complete_transaction))
        .route("/transactions/{transaction_id}/cancel", post(cancel_transaction))
}

/// GET `/transactions` - Newest first. Filter fields and `page`/`per_page`
/// share the query string.
async fn list_transactions(
    State(state): State<AppState>,
    Query(filter): Query<TransactionFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<Transaction>>, ApiError> {
    Ok(Json(state.ledger.transactions.list(&filter, &page).await?))
}

/// POST `/transactions` - Record a transaction and apply its balance effect.
async fn create_transaction(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateTransactionInput>,
) -> Result<(StatusCode, Json<CreatedTransaction>), ApiError> {
    let created = state
        .ledger
        .transactions
        .create(payload, actor.user_id())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET `/transactions/summary` - Income, expense and net per currency.
async fn summarize(
    State(state): State<AppState>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<TransactionSummary>, ApiError> {
    Ok(Json(state.ledger.transactions.summarize(&filter).await?))
}

/// GET `/transactions/{transaction_id}`
async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, ApiError> {
    Ok(Json(state.ledger.transactions.get(transaction_id).await?))
}

/// DELETE `/transactions/{transaction_id}` - Reverse (if completed) and remove.
async fn delete_transaction(
    State(state): State<AppState>,
    actor: Actor,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, ApiError> {
    state
        .ledger
        .transactions
        .delete(transaction_id, actor.user_id())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/transactions/{transaction_id}/complete`
async fn complete_transaction(
    State(state): State<AppState>,
    actor: Actor,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, ApiError> {
    let transaction = state
        .ledger
        .transactions
        .complete(transaction_id, actor.user_id())
        .await?;
    Ok(Json(transaction))
}

/// POST `/transactions/{transaction_id}/cancel`
async fn cancel_transaction(
    State(state): State<AppState>,
    actor: Actor,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, ApiError> {
    let transaction = state
        .ledger
        .transactions
        .cancel(transaction_id, actor.user_id())
        .await?;
    Ok(Json(transaction))
}
