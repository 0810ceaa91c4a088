// handlers/public/root.rs - Service info, health and the JSON 404
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "gymdesk API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Gym management backend - members, trainers, notifications and AI workout plans",
        "endpoints": {
            "health": "/health (public)",
            "auth": "/api/auth/login, /api/auth/logout, /api/auth/me",
            "trainer_auth": "/api/trainers/auth (public)",
            "generate_plan": "/api/generate-plan (public, 10 requests per day)",
            "trainer_members": "/api/trainers/members (trainer token)",
            "admin": "/api/admin/{stats,notifications,members,trainers} (super_admin token)",
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> Response {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            ApiError::service_unavailable("Database unavailable").into_response()
        }
    }
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
