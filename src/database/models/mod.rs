pub mod admin;
pub mod member;
pub mod notification;
pub mod trainer;

pub use admin::{AdminAccount, NewAdmin};
pub use member::{Member, MemberPatch, MembershipStatus, NewMember};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use trainer::{NewTrainer, Trainer, TrainerInput, TrainerPatch, TrainerUpdate};
