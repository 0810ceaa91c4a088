use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;
use uuid::Uuid;

use super::models::{
    AdminAccount, Member, MemberPatch, NewAdmin, NewMember, NewNotification, NewTrainer,
    Notification, Trainer, TrainerUpdate,
};
use super::{Store, StoreError};
use crate::config::DatabaseConfig;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS admins (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS trainers (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        phone TEXT,
        specialization TEXT,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS members (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT,
        membership_type TEXT NOT NULL,
        start_date DATE NOT NULL,
        end_date DATE,
        photo TEXT,
        photo_front TEXT,
        photo_back TEXT,
        amount_paid NUMERIC(12, 2),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS notifications (
        id UUID PRIMARY KEY,
        kind TEXT NOT NULL,
        message TEXT NOT NULL,
        trainer_id TEXT NOT NULL,
        trainer_name TEXT NOT NULL,
        member_id TEXT,
        member_name TEXT,
        is_read BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS admins_email_lower ON admins (lower(email))",
    "CREATE UNIQUE INDEX IF NOT EXISTS trainers_email_lower ON trainers (lower(email))",
    "CREATE INDEX IF NOT EXISTS notifications_created_at ON notifications (created_at DESC)",
];

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Connected to Postgres (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes that do not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

fn map_unique(err: sqlx::Error, what: impl FnOnce() -> String) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(what()),
        _ => StoreError::Sqlx(err),
    }
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    kind: String,
    message: String,
    trainer_id: String,
    trainer_name: String,
    member_id: Option<String>,
    member_name: Option<String>,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = StoreError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: row.id,
            kind: row.kind.parse().map_err(StoreError::Invalid)?,
            message: row.message,
            trainer_id: row.trainer_id,
            trainer_name: row.trainer_name,
            member_id: row.member_id,
            member_name: row.member_name,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminAccount>, StoreError> {
        let admin = sqlx::query_as::<_, AdminAccount>(
            "SELECT id, email, name, password_hash, created_at FROM admins WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    async fn create_admin(&self, admin: NewAdmin) -> Result<AdminAccount, StoreError> {
        let email = admin.email.clone();
        sqlx::query_as::<_, AdminAccount>(
            r#"
            INSERT INTO admins (id, email, name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&admin.email)
        .bind(&admin.name)
        .bind(&admin.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique(e, || format!("admin '{}'", email)))
    }

    async fn list_trainers(&self) -> Result<Vec<Trainer>, StoreError> {
        let trainers = sqlx::query_as::<_, Trainer>("SELECT * FROM trainers ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(trainers)
    }

    async fn find_trainer_by_email(&self, email: &str) -> Result<Option<Trainer>, StoreError> {
        let trainer =
            sqlx::query_as::<_, Trainer>("SELECT * FROM trainers WHERE lower(email) = lower($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(trainer)
    }

    async fn create_trainer(&self, trainer: NewTrainer) -> Result<Trainer, StoreError> {
        let email = trainer.email.clone();
        sqlx::query_as::<_, Trainer>(
            r#"
            INSERT INTO trainers (id, name, email, phone, specialization, is_active, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&trainer.name)
        .bind(&trainer.email)
        .bind(&trainer.phone)
        .bind(&trainer.specialization)
        .bind(trainer.is_active)
        .bind(&trainer.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique(e, || format!("trainer '{}'", email)))
    }

    async fn update_trainer(&self, id: Uuid, update: TrainerUpdate) -> Result<Option<Trainer>, StoreError> {
        let email = update.email.clone().unwrap_or_default();
        sqlx::query_as::<_, Trainer>(
            r#"
            UPDATE trainers SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                phone = COALESCE($5, phone),
                specialization = COALESCE($6, specialization),
                is_active = COALESCE($7, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.password_hash)
        .bind(&update.phone)
        .bind(&update.specialization)
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique(e, || format!("trainer '{}'", email)))
    }

    async fn delete_trainer(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM trainers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_members(&self) -> Result<Vec<Member>, StoreError> {
        let members = sqlx::query_as::<_, Member>("SELECT * FROM members ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(members)
    }

    async fn get_member(&self, id: Uuid) -> Result<Option<Member>, StoreError> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    async fn create_member(&self, member: NewMember) -> Result<Member, StoreError> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (
                id, name, email, phone, membership_type, start_date, end_date,
                photo, photo_front, photo_back, amount_paid
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(&member.membership_type)
        .bind(member.start_date)
        .bind(member.end_date)
        .bind(&member.photo)
        .bind(&member.photo_front)
        .bind(&member.photo_back)
        .bind(member.amount_paid)
        .fetch_one(&self.pool)
        .await?;
        Ok(member)
    }

    async fn update_member(&self, id: Uuid, patch: MemberPatch) -> Result<Option<Member>, StoreError> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            UPDATE members SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                membership_type = COALESCE($5, membership_type),
                start_date = COALESCE($6, start_date),
                end_date = COALESCE($7, end_date),
                photo = COALESCE($8, photo),
                photo_front = COALESCE($9, photo_front),
                photo_back = COALESCE($10, photo_back),
                amount_paid = COALESCE($11, amount_paid),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(&patch.membership_type)
        .bind(patch.start_date)
        .bind(patch.end_date)
        .bind(&patch.photo)
        .bind(&patch.photo_front)
        .bind(&patch.photo_back)
        .bind(patch.amount_paid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    async fn delete_member(&self, id: Uuid) -> Result<Option<Member>, StoreError> {
        let member = sqlx::query_as::<_, Member>("DELETE FROM members WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    async fn list_notifications(&self) -> Result<Vec<Notification>, StoreError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT * FROM notifications ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn create_notification(&self, notification: NewNotification) -> Result<Notification, StoreError> {
        let notification = notification.into_notification(Uuid::new_v4(), Utc::now());
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, kind, message, trainer_id, trainer_name, member_id, member_name, is_read, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(notification.id)
        .bind(notification.kind.as_str())
        .bind(&notification.message)
        .bind(&notification.trainer_id)
        .bind(&notification.trainer_name)
        .bind(&notification.member_id)
        .bind(&notification.member_name)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;
        Ok(notification)
    }

    async fn mark_notification_read(&self, id: Uuid) -> Result<Option<Notification>, StoreError> {
        let row = sqlx::query_as::<_, NotificationRow>(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Notification::try_from).transpose()
    }

    async fn delete_notification(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
