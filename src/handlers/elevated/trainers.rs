// handlers/elevated/trainers.rs - /api/admin/trainers[/:id]
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::app::AppState;
use crate::auth::password::hash_password;
use crate::database::models::{Trainer, TrainerInput, TrainerPatch};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};

/// bcrypt off the async workers
async fn hash(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            tracing::error!("password hashing task failed: {}", e);
            ApiError::internal_server_error("Failed to hash password")
        })?
        .map_err(|e| {
            tracing::error!("password hashing failed: {}", e);
            ApiError::internal_server_error("Failed to hash password")
        })
}

pub async fn list(_admin: AdminUser, State(state): State<AppState>) -> ApiResult<Vec<Trainer>> {
    Ok(ApiResponse::success(state.store.list_trainers().await?))
}

pub async fn create(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    payload: Result<Json<TrainerInput>, JsonRejection>,
) -> ApiResult<Trainer> {
    let Json(input) = payload?;
    input.validate().map_err(ApiError::bad_request)?;

    let password_hash = hash(input.password.clone()).await?;
    let trainer = state.store.create_trainer(input.into_new(password_hash)).await?;
    info!(admin = %admin.user_id, trainer = %trainer.id, "admin created trainer");
    Ok(ApiResponse::created(trainer))
}

pub async fn update(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TrainerPatch>, JsonRejection>,
) -> ApiResult<Trainer> {
    let id = parse_id(Some(&id), "Trainer")?;
    let Json(patch) = payload?;

    let password_hash = match patch.password.clone().filter(|p| !p.is_empty()) {
        Some(password) => Some(hash(password).await?),
        None => None,
    };

    let trainer = state
        .store
        .update_trainer(id, patch.into_update(password_hash))
        .await?
        .ok_or_else(|| ApiError::not_found("Trainer not found"))?;
    Ok(ApiResponse::success(trainer))
}

pub async fn delete(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(Some(&id), "Trainer")?;

    if !state.store.delete_trainer(id).await? {
        return Err(ApiError::not_found("Trainer not found"));
    }
    Ok(Json(json!({ "success": true })))
}
