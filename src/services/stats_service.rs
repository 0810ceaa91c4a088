use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::database::models::{Member, Notification, Trainer};
use crate::database::{Store, StoreError};

/// Admin dashboard counters
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_members: usize,
    /// Members whose end date is today or later
    pub active_members: usize,
    pub expired_members: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    /// Revenue from memberships starting in the current UTC month
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_revenue: Decimal,
    pub total_trainers: usize,
    pub unread_notifications: usize,
}

impl DashboardStats {
    pub fn compute(
        members: &[Member],
        trainers: &[Trainer],
        notifications: &[Notification],
        today: NaiveDate,
    ) -> Self {
        let active_members = members
            .iter()
            .filter(|m| m.end_date.is_some_and(|end| end >= today))
            .count();
        let expired_members = members
            .iter()
            .filter(|m| m.end_date.is_some_and(|end| end < today))
            .count();

        let total_revenue = members.iter().filter_map(|m| m.amount_paid).sum();
        let monthly_revenue = members
            .iter()
            .filter(|m| m.start_date.year() == today.year() && m.start_date.month() == today.month())
            .filter_map(|m| m.amount_paid)
            .sum();

        Self {
            total_members: members.len(),
            active_members,
            expired_members,
            total_revenue,
            monthly_revenue,
            total_trainers: trainers.len(),
            unread_notifications: notifications.iter().filter(|n| !n.is_read).count(),
        }
    }
}

/// Load everything the dashboard needs concurrently and summarise it
pub async fn dashboard_stats(store: &dyn Store, today: NaiveDate) -> Result<DashboardStats, StoreError> {
    let (members, trainers, notifications) = futures::try_join!(
        store.list_members(),
        store.list_trainers(),
        store.list_notifications()
    )?;

    Ok(DashboardStats::compute(&members, &trainers, &notifications, today))
}
