use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::app::AppState;
use crate::auth::{extract_token, Identity, Role, TokenCodec, AUTH_COOKIE, TRAINER_COOKIE};
use crate::error::ApiError;

/// Resolve the caller's identity from the bearer header or the `auth-token` cookie.
/// Every verification failure comes back as `None`.
pub fn authenticate(tokens: &TokenCodec, headers: &HeaderMap) -> Option<Identity> {
    let token = extract_token(headers, AUTH_COOKIE)?;
    tokens.verify(&token)
}

/// Any caller holding a valid token
#[derive(Clone, Debug)]
pub struct AuthUser(pub Identity);

/// Caller holding a valid `super_admin` token
#[derive(Clone, Debug)]
pub struct AdminUser(pub Identity);

/// Caller holding a valid `trainer` token, from the bearer header or the `trainer-token` cookie
#[derive(Clone, Debug)]
pub struct TrainerUser(pub Identity);

fn require_identity(parts: &Parts, state: &AppState, cookie_name: &str) -> Result<Identity, ApiError> {
    extract_token(&parts.headers, cookie_name)
        .and_then(|token| state.tokens.verify(&token))
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))
}

fn require_role(identity: Identity, role: Role) -> Result<Identity, ApiError> {
    if identity.role == role {
        Ok(identity)
    } else {
        tracing::debug!(user = %identity.user_id, role = %identity.role, "role {} required", role);
        Err(ApiError::forbidden(format!("{} access required", role)))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_identity(parts, state, AUTH_COOKIE).map(AuthUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = require_identity(parts, state, AUTH_COOKIE)?;
        require_role(identity, Role::SuperAdmin).map(AdminUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for TrainerUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = require_identity(parts, state, TRAINER_COOKIE)?;
        require_role(identity, Role::Trainer).map(TrainerUser)
    }
}
