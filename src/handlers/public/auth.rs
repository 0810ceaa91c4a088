// handlers/public/auth.rs - Admin session: POST /api/auth/login, POST /api/auth/logout, GET /api/auth/me
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::handlers::cookies::{expired_cookie, session_cookie};
use crate::app::AppState;
use crate::auth::password::check_password;
use crate::auth::{Identity, Role, AUTH_COOKIE, TRAINER_COOKIE};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser};

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn credentials(&self) -> Result<(&str, &str), ApiError> {
        let email = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
        let password = self.password.as_deref().filter(|p| !p.is_empty());
        match (email, password) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(ApiError::bad_request("Email and password are required")),
        }
    }
}

/// Public view of an authenticated identity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub name: String,
}

impl From<Identity> for UserView {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.user_id,
            email: identity.email,
            role: identity.role,
            name: identity.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserView,
}

/// POST /api/auth/login - verify admin credentials and start a `super_admin` session
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, ApiResponse<LoginResponse>), ApiError> {
    let Json(request) = payload?;
    let (email, password) = request.credentials()?;

    let admin = state.store.find_admin_by_email(email).await?;
    let matches = check_password(password, admin.as_ref().map(|a| a.password_hash.as_str())).await;

    let admin = match admin {
        Some(admin) if matches => admin,
        _ => {
            warn!(email = %email, "rejected admin login");
            return Err(ApiError::unauthorized("Invalid credentials"));
        }
    };

    let identity = Identity::new(admin.id.to_string(), admin.email, Role::SuperAdmin, admin.name);
    let token = state.tokens.issue(&identity)?;
    info!(user = %identity.user_id, "admin signed in");

    let jar = jar.add(session_cookie(
        AUTH_COOKIE,
        token.clone(),
        state.config.security.cookie_secure,
    ));
    Ok((
        jar,
        ApiResponse::success(LoginResponse {
            token,
            user: identity.into(),
        }),
    ))
}

/// POST /api/auth/logout - clear both session cookies; issued tokens stay valid until they expire
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar
        .add(expired_cookie(AUTH_COOKIE))
        .add(expired_cookie(TRAINER_COOKIE));
    (jar, Json(json!({ "success": true })))
}

/// GET /api/auth/me
pub async fn me(AuthUser(identity): AuthUser) -> ApiResponse<MeResponse> {
    ApiResponse::success(MeResponse {
        user: identity.into(),
    })
}
