use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trainer action that produced a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    MemberAdded,
    MemberUpdated,
    MemberDeleted,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::MemberAdded => "member_added",
            NotificationKind::MemberUpdated => "member_updated",
            NotificationKind::MemberDeleted => "member_deleted",
        }
    }

    pub fn message(&self, trainer_name: &str, member_name: &str) -> String {
        match self {
            NotificationKind::MemberAdded => {
                format!("{} added a new member: {}", trainer_name, member_name)
            }
            NotificationKind::MemberUpdated => {
                format!("{} updated member: {}", trainer_name, member_name)
            }
            NotificationKind::MemberDeleted => {
                format!("{} deleted member: {}", trainer_name, member_name)
            }
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member_added" => Ok(NotificationKind::MemberAdded),
            "member_updated" => Ok(NotificationKind::MemberUpdated),
            "member_deleted" => Ok(NotificationKind::MemberDeleted),
            other => Err(format!("unknown notification type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub trainer_id: String,
    pub trainer_name: String,
    pub member_id: Option<String>,
    pub member_name: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub trainer_id: String,
    pub trainer_name: String,
    pub member_id: Option<String>,
    pub member_name: Option<String>,
}

impl NewNotification {
    pub fn into_notification(self, id: Uuid, now: DateTime<Utc>) -> Notification {
        let message = self
            .kind
            .message(&self.trainer_name, self.member_name.as_deref().unwrap_or(""));

        Notification {
            id,
            kind: self.kind,
            message,
            trainer_id: self.trainer_id,
            trainer_name: self.trainer_name,
            member_id: self.member_id,
            member_name: self.member_name,
            is_read: false,
            created_at: now,
        }
    }
}
