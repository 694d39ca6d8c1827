//! Personnel, salary and advance routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

use kasa_core::personnel::{
    AdvanceRecord, AdvanceReport, CreatePersonnelInput, PayAdvanceInput, PaySalaryInput, Personnel,
    RecordAdvanceInput,
};
use kasa_db::repositories::{AdvancePayment, SalaryPayment};
use kasa_shared::types::PersonnelId;

use crate::{AppState, error::ApiError, extractors::Actor};

/// Creates the personnel routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/personnel", get(list_personnel).post(create_personnel))
        .route("/personnel/{personnel_id}", get(get_personnel))
        .route("/personnel/{personnel_id}/deactivate", post(deactivate_personnel))
        .route("/personnel/{personnel_id}/salary", get(list_salary_records).post(pay_salary))
        .route("/personnel/{personnel_id}/advances", post(pay_advance))
        .route("/personnel/{personnel_id}/advances/records", post(record_advance))
        .route("/reports/advances", get(advance_report))
}

/// Query parameters for listing personnel.
#[derive(Debug, Deserialize)]
pub struct ListPersonnelQuery {
    /// Only active (or only inactive) personnel.
    pub is_active: Option<bool>,
}

/// Query parameters for the advance report.
#[derive(Debug, Deserialize)]
pub struct AdvanceReportQuery {
    /// Limit the report to one employee.
    pub personnel_id: Option<PersonnelId>,
}

/// GET `/personnel`
async fn list_personnel(
    State(state): State<AppState>,
    Query(query): Query<ListPersonnelQuery>,
) -> Result<Json<Value>, ApiError> {
    let personnel = state.ledger.personnel.list_personnel(query.is_active).await?;
    Ok(Json(json!({ "personnel": personnel })))
}

/// POST `/personnel`
async fn create_personnel(
    State(state): State<AppState>,
    _actor: Actor,
    Json(payload): Json<CreatePersonnelInput>,
) -> Result<(StatusCode, Json<Personnel>), ApiError> {
    let personnel = state.ledger.personnel.create_personnel(payload).await?;
    Ok((StatusCode::CREATED, Json(personnel)))
}

/// GET `/personnel/{personnel_id}`
async fn get_personnel(
    State(state): State<AppState>,
    Path(personnel_id): Path<PersonnelId>,
) -> Result<Json<Personnel>, ApiError> {
    Ok(Json(state.ledger.personnel.get_personnel(personnel_id).await?))
}

/// POST `/personnel/{personnel_id}/deactivate`
async fn deactivate_personnel(
    State(state): State<AppState>,
    _actor: Actor,
    Path(personnel_id): Path<PersonnelId>,
) -> Result<Json<Personnel>, ApiError> {
    Ok(Json(state.ledger.personnel.deactivate_personnel(personnel_id).await?))
}

/// GET `/personnel/{personnel_id}/salary` - Salary, bonus and SSK records.
async fn list_salary_records(
    State(state): State<AppState>,
    Path(personnel_id): Path<PersonnelId>,
) -> Result<Json<Value>, ApiError> {
    let records = state
        .ledger
        .personnel
        .list_salary_records(Some(personnel_id))
        .await?;
    Ok(Json(json!({ "salary_records": records })))
}

/// POST `/personnel/{personnel_id}/salary` - Pay a salary, bonus or SSK.
async fn pay_salary(
    State(state): State<AppState>,
    actor: Actor,
    Path(personnel_id): Path<PersonnelId>,
    Json(payload): Json<PaySalaryInput>,
) -> Result<(StatusCode, Json<SalaryPayment>), ApiError> {
    let payment = state
        .ledger
        .personnel
        .pay_salary(personnel_id, payload, actor.user_id())
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// POST `/personnel/{personnel_id}/advances` - Pay out an advance.
async fn pay_advance(
    State(state): State<AppState>,
    actor: Actor,
    Path(personnel_id): Path<PersonnelId>,
    Json(payload): Json<PayAdvanceInput>,
) -> Result<(StatusCode, Json<AdvancePayment>), ApiError> {
    let payment = state
        .ledger
        .personnel
        .pay_advance(personnel_id, payload, actor.user_id())
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// POST `/personnel/{personnel_id}/advances/records` - Record an advance paid
/// outside the ledger.
async fn record_advance(
    State(state): State<AppState>,
    _actor: Actor,
    Path(personnel_id): Path<PersonnelId>,
    Json(payload): Json<RecordAdvanceInput>,
) -> Result<(StatusCode, Json<AdvanceRecord>), ApiError> {
    let record = state
        .ledger
        .personnel
        .record_advance(personnel_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET `/reports/advances` - Advance records reconciled with ADVANCE expenses.
async fn advance_report(
    State(state): State<AppState>,
    Query(query): Query<AdvanceReportQuery>,
) -> Result<Json<AdvanceReport>, ApiError> {
    Ok(Json(state.ledger.personnel.advance_report(query.personnel_id).await?))
}
