// handlers/mod.rs - Handlers grouped by the access they require
//
// Public (no token) → Protected (trainer token) → Elevated (super_admin token)
pub mod cookies;
pub mod elevated;
pub mod protected;
pub mod public;

use uuid::Uuid;

use crate::database::models::{Member, MemberPatch};
use crate::database::Store;
use crate::error::ApiError;

/// Parse a record id taken from the path or query string
pub(crate) fn parse_id(raw: Option<&str>, entity: &str) -> Result<Uuid, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{} id required", entity)))?;
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid {} id", entity.to_lowercase())))
}

/// Apply `patch` to member `id` unless the merged record would fail validation
pub(crate) async fn update_member(store: &dyn Store, id: Uuid, patch: MemberPatch) -> Result<Member, ApiError> {
    let current = store
        .get_member(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Member not found"))?;
    patch.validate(&current).map_err(ApiError::bad_request)?;

    store
        .update_member(id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Member not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(Some(&id.to_string()), "Member").unwrap(), id);

        let missing = parse_id(None, "Member").unwrap_err();
        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.message(), "Member id required");

        assert_eq!(parse_id(Some("not-a-uuid"), "Member").unwrap_err().message(), "Invalid member id");
    }
}
