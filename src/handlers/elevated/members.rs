// handlers/elevated/members.rs - /api/admin/members[/:id]
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::app::AppState;
use crate::database::models::{Member, MemberPatch, NewMember};
use crate::error::ApiError;
use crate::handlers::{parse_id, update_member};
use crate::middleware::{AdminUser, ApiResponse, ApiResult};

pub async fn list(_admin: AdminUser, State(state): State<AppState>) -> ApiResult<Vec<Member>> {
    Ok(ApiResponse::success(state.store.list_members().await?))
}

pub async fn show(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Member> {
    let id = parse_id(Some(&id), "Member")?;
    let member = state
        .store
        .get_member(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Member not found"))?;
    Ok(ApiResponse::success(member))
}

pub async fn create(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    payload: Result<Json<NewMember>, JsonRejection>,
) -> ApiResult<Member> {
    let Json(input) = payload?;
    input.validate().map_err(ApiError::bad_request)?;

    let member = state.store.create_member(input).await?;
    info!(admin = %admin.user_id, member = %member.id, "admin added member");
    Ok(ApiResponse::created(member))
}

pub async fn update(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MemberPatch>, JsonRejection>,
) -> ApiResult<Member> {
    let id = parse_id(Some(&id), "Member")?;
    let Json(patch) = payload?;

    let member = update_member(state.store.as_ref(), id, patch).await?;
    Ok(ApiResponse::success(member))
}

pub async fn delete(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(Some(&id), "Member")?;

    let member = state
        .store
        .delete_member(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Member not found"))?;
    info!(admin = %admin.user_id, member = %member.id, "admin deleted member");
    Ok(Json(json!({ "success": true })))
}
