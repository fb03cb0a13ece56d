//! Axum route handlers for the task generation API.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::taskgen::types::{GenerationRequest, GenerationResult};

/// POST /api/v1/products/:product_id/generate-tasks
///
/// Full pipeline: analytics → model generation → validation → fallback →
/// ordering → persistence. Returns the persisted tasks with their ids.
pub async fn handle_generate_tasks(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<GenerationResult>, AppError> {
    let result = state
        .task_generator
        .generate_and_save(product_id, request.user_id, request.max_tasks)
        .await?;

    Ok(Json(result))
}

/// POST /api/v1/products/:product_id/generate-tasks/preview
///
/// Same pipeline, nothing persisted. Lets the caller inspect what would be
/// created before committing.
pub async fn handle_preview_tasks(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<GenerationResult>, AppError> {
    let result = state
        .task_generator
        .preview(product_id, request.user_id, request.max_tasks)
        .await?;

    Ok(Json(result))
}
