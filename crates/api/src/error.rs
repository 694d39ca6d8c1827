//! JSON error responses.
//!
//! Every failure renders as `{"error": <CODE>, "message": <text>}` with the
//! status the ledger assigns to the error.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use kasa_core::LedgerError;

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    /// A ledger operation failed.
    Ledger(LedgerError),
    /// The request could not be understood.
    BadRequest(String),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl ApiError {
    /// Status code of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Ledger(err) => {
                StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable error code for clients.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ledger(err) => err.error_code(),
            Self::BadRequest(_) => "BAD_REQUEST",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Ledger(err) if status.is_server_error() && !err.is_retryable() => {
                error!(error = %err, code = err.error_code(), "Request failed");
                "An internal error occurred".to_string()
            }
            Self::Ledger(err) => {
                warn!(error = %err, code = err.error_code(), "Request rejected");
                err.to_string()
            }
            Self::BadRequest(message) => message.clone(),
        };

        (status, Json(json!({ "error": self.code(), "message": message }))).into_response()
    }
}
