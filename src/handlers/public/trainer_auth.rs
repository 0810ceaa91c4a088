// handlers/public/trainer_auth.rs - POST /api/trainers/auth
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::{info, warn};

use super::auth::LoginRequest;
use crate::app::AppState;
use crate::auth::password::check_password;
use crate::auth::{Identity, Role, TRAINER_COOKIE};
use crate::database::models::Trainer;
use crate::error::ApiError;
use crate::handlers::cookies::session_cookie;
use crate::middleware::ApiResponse;

#[derive(Debug, Serialize)]
pub struct TrainerLoginResponse {
    pub trainer: Trainer,
    pub token: String,
}

/// Sign in an active trainer and start a `trainer` session
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, ApiResponse<TrainerLoginResponse>), ApiError> {
    let Json(request) = payload?;
    let (email, password) = request.credentials()?;

    let trainer = state.store.find_trainer_by_email(email).await?;
    let matches = check_password(password, trainer.as_ref().map(|t| t.password_hash.as_str())).await;

    let trainer = match trainer {
        Some(trainer) if matches && trainer.is_active => trainer,
        _ => {
            warn!(email = %email, "rejected trainer login");
            return Err(ApiError::unauthorized("Invalid credentials"));
        }
    };

    let identity = Identity::new(
        trainer.id.to_string(),
        trainer.email.clone(),
        Role::Trainer,
        trainer.name.clone(),
    );
    let token = state.tokens.issue(&identity)?;
    info!(trainer = %trainer.id, "trainer signed in");

    let jar = jar.add(session_cookie(
        TRAINER_COOKIE,
        token.clone(),
        state.config.security.cookie_secure,
    ));
    Ok((jar, ApiResponse::success(TrainerLoginResponse { trainer, token })))
}
