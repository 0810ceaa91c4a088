use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Back-office account allowed to sign in as `super_admin`
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccount {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

impl NewAdmin {
    pub fn into_admin(self, id: Uuid, now: DateTime<Utc>) -> AdminAccount {
        AdminAccount {
            id,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            created_at: now,
        }
    }
}
