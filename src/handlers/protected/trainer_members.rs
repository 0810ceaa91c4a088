// handlers/protected/trainer_members.rs - /api/trainers/members
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::app::AppState;
use crate::auth::Identity;
use crate::database::models::{Member, MemberPatch, NewMember, NewNotification, NotificationKind};
use crate::database::Store;
use crate::error::ApiError;
use crate::handlers::{parse_id, update_member};
use crate::middleware::{ApiResponse, ApiResult, TrainerUser};

#[derive(Debug, Default, Deserialize)]
pub struct MemberIdQuery {
    pub id: Option<String>,
}

/// Record a trainer action for the admin feed. Failures are logged and swallowed.
pub async fn notify(store: &dyn Store, kind: NotificationKind, trainer: &Identity, member: &Member) {
    let notification = NewNotification {
        kind,
        trainer_id: trainer.user_id.clone(),
        trainer_name: trainer.name.clone(),
        member_id: Some(member.id.to_string()),
        member_name: Some(member.name.clone()),
    };

    if let Err(e) = store.create_notification(notification).await {
        error!(kind = kind.as_str(), member = %member.id, "failed to record notification: {}", e);
    }
}

/// GET - every member
pub async fn list(_trainer: TrainerUser, State(state): State<AppState>) -> ApiResult<Vec<Member>> {
    Ok(ApiResponse::success(state.store.list_members().await?))
}

/// POST - add a member
pub async fn create(
    TrainerUser(trainer): TrainerUser,
    State(state): State<AppState>,
    payload: Result<Json<NewMember>, JsonRejection>,
) -> ApiResult<Member> {
    let Json(input) = payload?;
    input.validate().map_err(ApiError::bad_request)?;

    let member = state.store.create_member(input).await?;
    info!(trainer = %trainer.user_id, member = %member.id, "trainer added member");
    notify(state.store.as_ref(), NotificationKind::MemberAdded, &trainer, &member).await;

    Ok(ApiResponse::created(member))
}

/// PUT ?id= - partial update
pub async fn update(
    TrainerUser(trainer): TrainerUser,
    State(state): State<AppState>,
    Query(query): Query<MemberIdQuery>,
    payload: Result<Json<MemberPatch>, JsonRejection>,
) -> ApiResult<Member> {
    let id = parse_id(query.id.as_deref(), "Member")?;
    let Json(patch) = payload?;

    let member = update_member(state.store.as_ref(), id, patch).await?;
    notify(state.store.as_ref(), NotificationKind::MemberUpdated, &trainer, &member).await;

    Ok(ApiResponse::success(member))
}

/// DELETE ?id=
pub async fn delete(
    TrainerUser(trainer): TrainerUser,
    State(state): State<AppState>,
    Query(query): Query<MemberIdQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(query.id.as_deref(), "Member")?;

    let member = state
        .store
        .delete_member(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Member not found"))?;
    info!(trainer = %trainer.user_id, member = %member.id, "trainer deleted member");
    notify(state.store.as_ref(), NotificationKind::MemberDeleted, &trainer, &member).await;

    Ok(Json(json!({ "success": true })))
}
