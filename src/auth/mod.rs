pub mod credentials;
pub mod password;
pub mod token;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub use credentials::{extract_token, AUTH_COOKIE, TRAINER_COOKIE};
pub use token::{TokenCodec, TokenError, TOKEN_TTL_DAYS};

/// Roles an identity token can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Trainer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Trainer => "trainer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Role::SuperAdmin),
            "trainer" => Ok(Role::Trainer),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Verified user identity carried inside a signed token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub name: String,
}

impl Identity {
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        name: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            role,
            name: name.into(),
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}

/// JWT claims: the identity payload plus the registered time claims
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub name: String,
    pub exp: i64,
    /// Always written on issue; tokens signed elsewhere may leave it out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    pub fn new(identity: &Identity, issued_at: DateTime<Utc>) -> Self {
        let exp = (issued_at + Duration::days(TOKEN_TTL_DAYS)).timestamp();

        Self {
            user_id: identity.user_id.clone(),
            email: identity.email.clone(),
            role: identity.role,
            name: identity.name.clone(),
            exp,
            iat: Some(issued_at.timestamp()),
        }
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
            name: claims.name,
        }
    }
}
