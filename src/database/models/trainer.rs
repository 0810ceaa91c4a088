use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Trainer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Admin-supplied trainer fields; the password arrives in plaintext and is hashed before storage
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub is_active: Option<bool>,
}

/// Trainer record ready for insertion
#[derive(Debug, Clone)]
pub struct NewTrainer {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub is_active: bool,
}

impl NewTrainer {
    pub fn into_trainer(self, id: Uuid, now: DateTime<Utc>) -> Trainer {
        Trainer {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            specialization: self.specialization,
            is_active: self.is_active,
            password_hash: self.password_hash,
            created_at: now,
        }
    }
}

/// Stored form of a trainer update, with any new password already hashed
#[derive(Debug, Clone, Default)]
pub struct TrainerUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub is_active: Option<bool>,
}

impl TrainerUpdate {
    pub fn apply(self, trainer: &mut Trainer) {
        if let Some(v) = self.name {
            trainer.name = v;
        }
        if let Some(v) = self.email {
            trainer.email = v;
        }
        if let Some(v) = self.password_hash {
            trainer.password_hash = v;
        }
        if let Some(v) = self.phone {
            trainer.phone = Some(v);
        }
        if let Some(v) = self.specialization {
            trainer.specialization = Some(v);
        }
        if let Some(v) = self.is_active {
            trainer.is_active = v;
        }
    }
}

impl TrainerInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Trainer name is required".to_string());
        }
        if self.email.trim().is_empty() {
            return Err("Trainer email is required".to_string());
        }
        if self.password.is_empty() {
            return Err("Trainer password is required".to_string());
        }
        Ok(())
    }

    pub fn into_new(self, password_hash: String) -> NewTrainer {
        NewTrainer {
            name: self.name,
            email: self.email,
            password_hash,
            phone: self.phone,
            specialization: self.specialization,
            is_active: self.is_active,
        }
    }
}

impl TrainerPatch {
    /// Convert to a storable update; `password_hash` replaces the plaintext password
    pub fn into_update(self, password_hash: Option<String>) -> TrainerUpdate {
        TrainerUpdate {
            name: self.name,
            email: self.email,
            password_hash,
            phone: self.phone,
            specialization: self.specialization,
            is_active: self.is_active,
        }
    }
}
