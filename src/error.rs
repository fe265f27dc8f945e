use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::engine::DepositError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("insufficient points: need {required}, have {available}")]
    InsufficientPoints { required: u64, available: u64 },

    #[error("product {0} is out of stock")]
    OutOfStock(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DepositError> for AppError {
    fn from(err: DepositError) -> Self {
        match err {
            DepositError::InvalidInput(msg) => AppError::BadRequest(msg),
            DepositError::TypeMismatch { .. } => AppError::BadRequest(err.to_string()),
            DepositError::BinFull { .. } => AppError::Conflict(
                "this bin is full; please use another bin or notify staff".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::InsufficientPoints { .. } | AppError::OutOfStock(_) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
