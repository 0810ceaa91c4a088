// handlers/elevated/notifications.rs - /api/admin/notifications
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::Notification;
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct NotificationId {
    pub id: Option<String>,
}

/// GET - newest first
pub async fn list(_admin: AdminUser, State(state): State<AppState>) -> ApiResult<Vec<Notification>> {
    Ok(ApiResponse::success(state.store.list_notifications().await?))
}

/// PATCH {id} - mark one notification as read
pub async fn mark_read(
    _admin: AdminUser,
    State(state): State<AppState>,
    payload: Result<Json<NotificationId>, JsonRejection>,
) -> ApiResult<Notification> {
    let Json(body) = payload?;
    let id = parse_id(body.id.as_deref(), "Notification")?;

    let notification = state
        .store
        .mark_notification_read(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Notification not found"))?;
    Ok(ApiResponse::success(notification))
}

/// DELETE ?id=
pub async fn delete(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<NotificationId>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(query.id.as_deref(), "Notification")?;

    if !state.store.delete_notification(id).await? {
        return Err(ApiError::not_found("Notification not found"));
    }
    Ok(Json(json!({ "success": true })))
}
