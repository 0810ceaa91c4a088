use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{
    AdminAccount, Member, MemberPatch, NewAdmin, NewMember, NewNotification, NewTrainer,
    Notification, Trainer, TrainerUpdate,
};
use super::{Store, StoreError};

#[derive(Default)]
struct Collections {
    admins: Vec<AdminAccount>,
    trainers: Vec<Trainer>,
    members: Vec<Member>,
    notifications: Vec<Notification>,
}

/// In-process store used for local development and tests. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminAccount>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.admins.iter().find(|a| same_email(&a.email, email)).cloned())
    }

    async fn create_admin(&self, admin: NewAdmin) -> Result<AdminAccount, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.admins.iter().any(|a| same_email(&a.email, &admin.email)) {
            return Err(StoreError::Duplicate(format!("admin '{}'", admin.email)));
        }

        let admin = admin.into_admin(Uuid::new_v4(), Utc::now());
        inner.admins.push(admin.clone());
        Ok(admin)
    }

    async fn list_trainers(&self) -> Result<Vec<Trainer>, StoreError> {
        Ok(self.inner.read().await.trainers.clone())
    }

    async fn find_trainer_by_email(&self, email: &str) -> Result<Option<Trainer>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.trainers.iter().find(|t| same_email(&t.email, email)).cloned())
    }

    async fn create_trainer(&self, trainer: NewTrainer) -> Result<Trainer, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.trainers.iter().any(|t| same_email(&t.email, &trainer.email)) {
            return Err(StoreError::Duplicate(format!("trainer '{}'", trainer.email)));
        }

        let trainer = trainer.into_trainer(Uuid::new_v4(), Utc::now());
        inner.trainers.push(trainer.clone());
        Ok(trainer)
    }

    async fn update_trainer(&self, id: Uuid, update: TrainerUpdate) -> Result<Option<Trainer>, StoreError> {
        let mut inner = self.inner.write().await;

        if let Some(email) = update.email.as_deref() {
            if inner.trainers.iter().any(|t| t.id != id && same_email(&t.email, email)) {
                return Err(StoreError::Duplicate(format!("trainer '{}'", email)));
            }
        }

        let Some(trainer) = inner.trainers.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        update.apply(trainer);
        Ok(Some(trainer.clone()))
    }

    async fn delete_trainer(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.trainers.len();
        inner.trainers.retain(|t| t.id != id);
        Ok(inner.trainers.len() != before)
    }

    async fn list_members(&self) -> Result<Vec<Member>, StoreError> {
        Ok(self.inner.read().await.members.clone())
    }

    async fn get_member(&self, id: Uuid) -> Result<Option<Member>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.members.iter().find(|m| m.id == id).cloned())
    }

    async fn create_member(&self, member: NewMember) -> Result<Member, StoreError> {
        let member = member.into_member(Uuid::new_v4(), Utc::now());
        self.inner.write().await.members.push(member.clone());
        Ok(member)
    }

    async fn update_member(&self, id: Uuid, patch: MemberPatch) -> Result<Option<Member>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(member) = inner.members.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        patch.apply(member, Utc::now());
        Ok(Some(member.clone()))
    }

    async fn delete_member(&self, id: Uuid) -> Result<Option<Member>, StoreError> {
        let mut inner = self.inner.write().await;
        let position = inner.members.iter().position(|m| m.id == id);
        Ok(position.map(|index| inner.members.remove(index)))
    }

    async fn list_notifications(&self) -> Result<Vec<Notification>, StoreError> {
        let mut notifications = self.inner.read().await.notifications.clone();
        notifications.reverse();
        Ok(notifications)
    }

    async fn create_notification(&self, notification: NewNotification) -> Result<Notification, StoreError> {
        let notification = notification.into_notification(Uuid::new_v4(), Utc::now());
        self.inner.write().await.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn mark_notification_read(&self, id: Uuid) -> Result<Option<Notification>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(notification) = inner.notifications.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };
        notification.is_read = true;
        Ok(Some(notification.clone()))
    }

    async fn delete_notification(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.notifications.len();
        inner.notifications.retain(|n| n.id != id);
        Ok(inner.notifications.len() != before)
    }
}
