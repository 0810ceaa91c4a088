use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use tracing::debug;

use super::{Claims, Identity};

/// Lifetime of every issued token
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret is not configured")]
    MissingSecret,

    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token payload is malformed: {0}")]
    MalformedPayload(String),

    #[error("JWT generation error: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::MalformedPayload(err.to_string()),
        }
    }
}

/// Signs and verifies HS256 identity tokens with a shared secret
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Issue a token for `identity` that expires seven days from now
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if it had been signed at `issued_at`
    pub fn issue_at(&self, identity: &Identity, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::new(identity, issued_at);
        let header = Header::new(Algorithm::HS256);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify a token and return its identity.
    ///
    /// Signature mismatches, expiry and payload shape errors all come back as `None`;
    /// the concrete cause is only visible in the debug log.
    pub fn verify(&self, token: &str) -> Option<Identity> {
        match self.decode(token) {
            Ok(claims) => Some(claims.into()),
            Err(e) => {
                debug!(token_len = token.len(), "token verification failed: {}", e);
                None
            }
        }
    }

    fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use chrono::Duration;
    use serde_json::json;

    fn admin() -> Identity {
        Identity::new("64f0c2", "owner@gym.test", Role::SuperAdmin, "Owner")
    }

    #[test]
    fn test_issue_then_verify_returns_identity() {
        let codec = TokenCodec::new("test-secret-key-12345").unwrap();
        let token = codec.issue(&admin()).unwrap();

        assert!(!token.is_empty());
        assert_eq!(codec.verify(&token), Some(admin()));
    }

    #[test]
    fn test_trainer_identity_round_trips() {
        let codec = TokenCodec::new("test-secret-key-12345").unwrap();
        let trainer = Identity::new("t-9", "coach@gym.test", Role::Trainer, "Coach Ravi");
        let token = codec.issue(&trainer).unwrap();
        assert_eq!(codec.verify(&token), Some(trainer));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(TokenCodec::new(""), Err(TokenError::MissingSecret)));
    }

    #[test]
    fn test_expired_token_is_absent() {
        let codec = TokenCodec::new("test-secret-key-12345").unwrap();
        let issued = Utc::now() - Duration::days(TOKEN_TTL_DAYS + 1);
        let token = codec.issue_at(&admin(), issued).unwrap();

        assert!(codec.verify(&token).is_none());
        assert!(matches!(codec.decode(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_token_near_end_of_life_still_valid() {
        let codec = TokenCodec::new("test-secret-key-12345").unwrap();
        let issued = Utc::now() - Duration::days(TOKEN_TTL_DAYS) + Duration::minutes(5);
        let token = codec.issue_at(&admin(), issued).unwrap();
        assert!(codec.verify(&token).is_some());
    }

    #[test]
    fn test_different_secrets_reject() {
        let signer = TokenCodec::new("secret1").unwrap();
        let verifier = TokenCodec::new("secret2").unwrap();
        let token = signer.issue(&admin()).unwrap();

        assert!(verifier.verify(&token).is_none());
        assert!(matches!(verifier.decode(&token), Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_garbage_token_is_absent() {
        let codec = TokenCodec::new("secret").unwrap();
        assert!(codec.verify("invalid.token.here").is_none());
        assert!(codec.verify("").is_none());
    }

    fn sign_raw(secret: &str, claims: serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_token_without_iat_is_accepted() {
        let codec = TokenCodec::new("secret").unwrap();
        let exp = (Utc::now() + Duration::days(1)).timestamp();
        let token = sign_raw(
            "secret",
            json!({"userId": "t-1", "email": "coach@gym.test", "role": "trainer", "name": "Coach", "exp": exp}),
        );

        assert_eq!(
            codec.verify(&token),
            Some(Identity::new("t-1", "coach@gym.test", Role::Trainer, "Coach"))
        );
    }

    #[test]
    fn test_unknown_role_is_malformed() {
        let codec = TokenCodec::new("secret").unwrap();
        let exp = (Utc::now() + Duration::days(1)).timestamp();
        let token = sign_raw(
            "secret",
            json!({"userId": "1", "email": "x@y", "role": "member", "name": "X", "exp": exp, "iat": 0}),
        );

        assert!(codec.verify(&token).is_none());
        assert!(matches!(codec.decode(&token), Err(TokenError::MalformedPayload(_))));
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let codec = TokenCodec::new("secret").unwrap();
        let exp = (Utc::now() + Duration::days(1)).timestamp();
        // Legacy trainer tokens carried `id` instead of `userId`
        let token = sign_raw(
            "secret",
            json!({"id": "1", "email": "x@y", "role": "trainer", "name": "X", "exp": exp, "iat": 0}),
        );
        assert!(codec.verify(&token).is_none());
    }

    #[test]
    fn test_wrong_field_type_is_malformed() {
        let codec = TokenCodec::new("secret").unwrap();
        let exp = (Utc::now() + Duration::days(1)).timestamp();
        let token = sign_raw(
            "secret",
            json!({"userId": 42, "email": "x@y", "role": "trainer", "name": "X", "exp": exp, "iat": 0}),
        );
        assert!(codec.verify(&token).is_none());
    }
}
