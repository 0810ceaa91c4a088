use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::auth::authenticate;
use crate::app::AppState;
use crate::auth::credentials::{bearer_token, cookie_token};
use crate::auth::{TokenCodec, TRAINER_COOKIE};
use crate::error::ApiError;

/// Path sets consulted by the gate, in evaluation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePolicy {
    /// Checked first; a match skips every other rule
    pub public_prefixes: Vec<String>,
    pub admin_area: String,
    pub admin_login: String,
    pub trainer_area: String,
    pub trainer_login: String,
    pub admin_api_prefixes: Vec<String>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            public_prefixes: [
                "/",
                "/trainers",
                "/astrology",
                "/ai-planner",
                "/api/auth/login",
                "/api/trainers/auth",
                "/api/upload",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            admin_area: "/admin".to_string(),
            admin_login: "/admin/login".to_string(),
            trainer_area: "/trainer".to_string(),
            trainer_login: "/trainer/login".to_string(),
            admin_api_prefixes: vec![
                "/api/admin/stats".to_string(),
                "/api/admin/notifications".to_string(),
            ],
        }
    }
}

/// Outcome of running a request through the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(String),
    Reject,
}

/// Segment-aware prefix match: `/trainers` covers `/trainers` and `/trainers/42`
/// but not `/trainers-archive`. The root prefix only covers `/` itself.
pub fn path_matches(prefix: &str, path: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return path == "/";
    }

    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl RoutePolicy {
    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes.iter().any(|p| path_matches(p, path))
    }

    pub fn is_admin_area(&self, path: &str) -> bool {
        path_matches(&self.admin_area, path) && path != self.admin_login
    }

    pub fn is_trainer_area(&self, path: &str) -> bool {
        path_matches(&self.trainer_area, path) && path != self.trainer_login
    }

    pub fn is_admin_api(&self, path: &str) -> bool {
        self.admin_api_prefixes.iter().any(|p| path_matches(p, path))
    }

    pub fn evaluate(&self, path: &str, headers: &HeaderMap, tokens: &TokenCodec) -> Decision {
        if self.is_public(path) {
            return Decision::Allow;
        }

        if self.is_admin_area(path) && !has_super_admin(headers, tokens) {
            return Decision::Redirect(self.admin_login.clone());
        }

        // Trainer pages only check that a session token is present
        if self.is_trainer_area(path) && !has_trainer_token(headers) {
            return Decision::Redirect(self.trainer_login.clone());
        }

        if self.is_admin_api(path) && !has_super_admin(headers, tokens) {
            return Decision::Reject;
        }

        Decision::Allow
    }
}

fn has_super_admin(headers: &HeaderMap, tokens: &TokenCodec) -> bool {
    authenticate(tokens, headers).is_some_and(|identity| identity.is_super_admin())
}

fn has_trainer_token(headers: &HeaderMap) -> bool {
    cookie_token(headers, TRAINER_COOKIE).is_some() || bearer_token(headers).is_some()
}

/// Request interceptor applied in front of every route
pub async fn gate_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    match state.config.routes.evaluate(&path, request.headers(), &state.tokens) {
        Decision::Allow => next.run(request).await,
        Decision::Redirect(location) => {
            debug!(path = %path, location = %location, "gate redirect");
            Redirect::temporary(&location).into_response()
        }
        Decision::Reject => {
            debug!(path = %path, "gate rejected unauthenticated API request");
            ApiError::unauthorized("Unauthorized").into_response()
        }
    }
}
