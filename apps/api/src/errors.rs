use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Only the variants below ever reach the caller. Agent failures, per-item
/// validation drops, and per-item persistence failures are recovered inside
/// the generation pipeline and never surface as HTTP errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Analytics not available for product {0}")]
    AnalyticsMissing(Uuid),

    #[error("Product {0} is not linked to a project")]
    ProjectMissing(Uuid),

    #[error("Task generation produced no tasks: {0}")]
    TotalGenerationFailure(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            AppError::AnalyticsMissing(product_id) => (
                StatusCode::BAD_REQUEST,
                "ANALYTICS_MISSING",
                format!(
                    "No analytics snapshot for product {product_id}. \
                    Run product analytics before generating tasks."
                ),
            ),
            AppError::ProjectMissing(product_id) => (
                StatusCode::NOT_FOUND,
                "PROJECT_MISSING",
                format!("Product {product_id} is not linked to a project"),
            ),
            AppError::TotalGenerationFailure(msg) => {
                tracing::error!("Total generation failure: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "GENERATION_FAILED",
                    msg.clone(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
