use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::cookie::CookieJar;

/// Cookie holding the admin/general session token
pub const AUTH_COOKIE: &str = "auth-token";

/// Cookie holding the trainer session token
pub const TRAINER_COOKIE: &str = "trainer-token";

/// Extract a token from `Authorization: Bearer <token>`, falling back to `cookie_name`.
///
/// The header always wins when both are present. Empty values count as absent.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    bearer_token(headers)
        .map(str::to_string)
        .or_else(|| cookie_token(headers, cookie_name))
}

/// Token from the `Authorization` header, if it uses the Bearer scheme
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Raw token stored in the named cookie
pub fn cookie_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    jar.get(cookie_name)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|value| !value.is_empty())
}
