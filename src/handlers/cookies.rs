// handlers/cookies.rs - Session cookie construction
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::auth::TOKEN_TTL_DAYS;

/// HttpOnly session cookie living as long as the token it carries
pub fn session_cookie(name: &'static str, token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::days(TOKEN_TTL_DAYS))
        .secure(secure)
        .build()
}

/// Cookie that makes the browser drop `name` immediately
pub fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}
