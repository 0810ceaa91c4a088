use bcrypt::{hash, verify, DEFAULT_COST};

/// Well-formed cost-12 hash that matches no password. Checked when no account has the
/// submitted email so that lookups for unknown accounts take as long as real ones.
const UNKNOWN_ACCOUNT_HASH: &str = "$2b$12$.....................................................";

/// Hash a plaintext password with bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Check a plaintext password against a stored bcrypt hash.
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match verify(password, password_hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Stored password hash could not be checked: {}", e);
            false
        }
    }
}

/// `verify_password` on the blocking pool. With no stored hash a full bcrypt round still runs
/// and the result is always a mismatch.
pub async fn check_password(password: &str, password_hash: Option<&str>) -> bool {
    let known = password_hash.is_some();
    let password = password.to_string();
    let password_hash = password_hash.unwrap_or(UNKNOWN_ACCOUNT_HASH).to_string();

    match tokio::task::spawn_blocking(move || verify_password(&password, &password_hash)).await {
        Ok(matches) => known && matches,
        Err(e) => {
            tracing::error!("password check task failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("squat-rack").unwrap();
        assert_ne!(hashed, "squat-rack");
        assert!(verify_password("squat-rack", &hashed));
        assert!(!verify_password("bench-press", &hashed));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn test_unknown_account_hash_runs_a_full_round() {
        assert_eq!(UNKNOWN_ACCOUNT_HASH.len(), 60);
        assert!(matches!(verify("owner-password", UNKNOWN_ACCOUNT_HASH), Ok(false)));
    }

    #[tokio::test]
    async fn test_check_password_off_the_runtime() {
        let hashed = hash_password("deadlift").unwrap();
        assert!(check_password("deadlift", Some(&hashed)).await);
        assert!(!check_password("squat", Some(&hashed)).await);
        assert!(!check_password("deadlift", None).await);
    }
}
