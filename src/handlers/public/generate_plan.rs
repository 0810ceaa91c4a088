// handlers/public/generate_plan.rs - POST /api/generate-plan
use std::net::SocketAddr;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::HeaderMap,
    response::Json,
};
use tracing::warn;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::rate_limit::{client_id, RateDecision};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::plan_service::{PlanOutcome, WellnessForm};

/// Generate a workout and diet plan. Every call counts against the caller's daily quota,
/// including ones later rejected for bad input.
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<WellnessForm>, JsonRejection>,
) -> ApiResult<PlanOutcome> {
    let client = client_id(&headers, peer.map(|ConnectInfo(addr)| addr));
    if state.limiter.check(&client) == RateDecision::Denied {
        return Err(ApiError::too_many_requests(format!(
            "Daily request limit ({}) reached. Try again tomorrow.",
            state.limiter.quota()
        )));
    }

    let Json(form) = payload?;
    form.validate().map_err(ApiError::bad_request)?;

    let outcome = state.planner.generate(&form).await?;
    if outcome.is_fallback() {
        warn!(client = %client, "returning placeholder plan");
    }
    Ok(ApiResponse::success(outcome))
}
