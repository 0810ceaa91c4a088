// handlers/elevated/stats.rs - GET /api/admin/stats
use axum::extract::State;
use chrono::Utc;

use crate::app::AppState;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::services::stats_service::{dashboard_stats, DashboardStats};

pub async fn get(_admin: AdminUser, State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let today = Utc::now().date_naive();
    let stats = dashboard_stats(state.store.as_ref(), today).await?;
    Ok(ApiResponse::success(stats))
}
