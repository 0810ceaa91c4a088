pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use models::{
    AdminAccount, Member, MemberPatch, NewAdmin, NewMember, NewNotification, NewTrainer,
    Notification, Trainer, TrainerUpdate,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors from a Store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Already exists: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence for admins, trainers, members and notifications.
///
/// Update and delete methods return `None`/`false` for unknown ids rather than an error,
/// leaving the 404 decision to the handler.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminAccount>, StoreError>;
    async fn create_admin(&self, admin: NewAdmin) -> Result<AdminAccount, StoreError>;

    async fn list_trainers(&self) -> Result<Vec<Trainer>, StoreError>;
    async fn find_trainer_by_email(&self, email: &str) -> Result<Option<Trainer>, StoreError>;
    async fn create_trainer(&self, trainer: NewTrainer) -> Result<Trainer, StoreError>;
    async fn update_trainer(&self, id: Uuid, update: TrainerUpdate) -> Result<Option<Trainer>, StoreError>;
    async fn delete_trainer(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn list_members(&self) -> Result<Vec<Member>, StoreError>;
    async fn get_member(&self, id: Uuid) -> Result<Option<Member>, StoreError>;
    async fn create_member(&self, member: NewMember) -> Result<Member, StoreError>;
    async fn update_member(&self, id: Uuid, patch: MemberPatch) -> Result<Option<Member>, StoreError>;
    async fn delete_member(&self, id: Uuid) -> Result<Option<Member>, StoreError>;

    /// Newest first
    async fn list_notifications(&self) -> Result<Vec<Notification>, StoreError>;
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification, StoreError>;
    async fn mark_notification_read(&self, id: Uuid) -> Result<Option<Notification>, StoreError>;
    async fn delete_notification(&self, id: Uuid) -> Result<bool, StoreError>;
}
