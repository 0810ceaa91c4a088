use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Days before the end date at which a membership counts as expiring soon
pub const EXPIRY_WARNING_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub membership_type: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub photo: Option<String>,
    pub photo_front: Option<String>,
    pub photo_back: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub amount_paid: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Active,
    ExpiresSoon,
    Expired,
    Unknown,
}

impl Member {
    pub fn status_on(&self, today: NaiveDate) -> MembershipStatus {
        let Some(end) = self.end_date else {
            return MembershipStatus::Unknown;
        };

        let remaining = (end - today).num_days();
        if remaining < 0 {
            MembershipStatus::Expired
        } else if remaining <= EXPIRY_WARNING_DAYS {
            MembershipStatus::ExpiresSoon
        } else {
            MembershipStatus::Active
        }
    }
}

/// Fields accepted when creating a member
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub membership_type: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub photo: Option<String>,
    pub photo_front: Option<String>,
    pub photo_back: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub amount_paid: Option<Decimal>,
}

/// Field rules shared by creates and updates
fn check_fields(
    name: &str,
    email: &str,
    membership_type: &str,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    amount_paid: Option<Decimal>,
) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Member name is required".to_string());
    }
    if email.trim().is_empty() {
        return Err("Member email is required".to_string());
    }
    if membership_type.trim().is_empty() {
        return Err("Membership type is required".to_string());
    }
    if let Some(end) = end_date {
        if end < start_date {
            return Err("End date cannot be before start date".to_string());
        }
    }
    if matches!(amount_paid, Some(amount) if amount.is_sign_negative()) {
        return Err("Amount paid cannot be negative".to_string());
    }
    Ok(())
}

impl NewMember {
    pub fn validate(&self) -> Result<(), String> {
        check_fields(
            &self.name,
            &self.email,
            &self.membership_type,
            self.start_date,
            self.end_date,
            self.amount_paid,
        )
    }

    pub fn into_member(self, id: Uuid, now: DateTime<Utc>) -> Member {
        Member {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            membership_type: self.membership_type,
            start_date: self.start_date,
            end_date: self.end_date,
            photo: self.photo,
            photo_front: self.photo_front,
            photo_back: self.photo_back,
            amount_paid: self.amount_paid,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub membership_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub photo: Option<String>,
    pub photo_front: Option<String>,
    pub photo_back: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub amount_paid: Option<Decimal>,
}

impl MemberPatch {
    /// Check the record this patch would produce when applied to `current`
    pub fn validate(&self, current: &Member) -> Result<(), String> {
        check_fields(
            self.name.as_deref().unwrap_or(&current.name),
            self.email.as_deref().unwrap_or(&current.email),
            self.membership_type.as_deref().unwrap_or(&current.membership_type),
            self.start_date.unwrap_or(current.start_date),
            self.end_date.or(current.end_date),
            self.amount_paid.or(current.amount_paid),
        )
    }

    pub fn apply(self, member: &mut Member, now: DateTime<Utc>) {
        if let Some(v) = self.name {
            member.name = v;
        }
        if let Some(v) = self.email {
            member.email = v;
        }
        if let Some(v) = self.phone {
            member.phone = Some(v);
        }
        if let Some(v) = self.membership_type {
            member.membership_type = v;
        }
        if let Some(v) = self.start_date {
            member.start_date = v;
        }
        if let Some(v) = self.end_date {
            member.end_date = Some(v);
        }
        if let Some(v) = self.photo {
            member.photo = Some(v);
        }
        if let Some(v) = self.photo_front {
            member.photo_front = Some(v);
        }
        if let Some(v) = self.photo_back {
            member.photo_back = Some(v);
        }
        if let Some(v) = self.amount_paid {
            member.amount_paid = Some(v);
        }
        member.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn member(end: Option<NaiveDate>) -> Member {
        let now = Utc::now();
        NewMember {
            name: "Priya".into(),
            email: "priya@gym.test".into(),
            phone: None,
            membership_type: "Monthly".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: end,
            photo: None,
            photo_front: None,
            photo_back: None,
            amount_paid: None,
        }
        .into_member(Uuid::new_v4(), now)
    }

    #[test]
    fn test_membership_status() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        assert_eq!(member(None).status_on(today), MembershipStatus::Unknown);
        assert_eq!(
            member(NaiveDate::from_ymd_opt(2024, 6, 9)).status_on(today),
            MembershipStatus::Expired
        );
        assert_eq!(
            member(NaiveDate::from_ymd_opt(2024, 6, 10)).status_on(today),
            MembershipStatus::ExpiresSoon
        );
        assert_eq!(
            member(NaiveDate::from_ymd_opt(2024, 6, 17)).status_on(today),
            MembershipStatus::ExpiresSoon
        );
        assert_eq!(
            member(NaiveDate::from_ymd_opt(2024, 6, 18)).status_on(today),
            MembershipStatus::Active
        );
    }

    #[test]
    fn test_new_member_from_json() {
        let input: NewMember = serde_json::from_value(json!({
            "name": "Arjun",
            "email": "arjun@gym.test",
            "membershipType": "Quarterly",
            "startDate": "2024-03-01",
            "endDate": "2024-06-01",
            "amountPaid": 4500.5
        }))
        .unwrap();

        assert!(input.validate().is_ok());
        assert_eq!(input.amount_paid, Some(Decimal::new(45005, 1)));

        let value = serde_json::to_value(input.into_member(Uuid::new_v4(), Utc::now())).unwrap();
        assert_eq!(value["amountPaid"], json!(4500.5));
        assert_eq!(value["membershipType"], "Quarterly");
    }

    #[test]
    fn test_validation_rejects_inverted_dates() {
        let mut input = member(None);
        input.end_date = NaiveDate::from_ymd_opt(2023, 12, 1);
        let new = NewMember {
            name: input.name,
            email: input.email,
            phone: None,
            membership_type: input.membership_type,
            start_date: input.start_date,
            end_date: input.end_date,
            photo: None,
            photo_front: None,
            photo_back: None,
            amount_paid: None,
        };
        assert!(new.validate().is_err());
    }

    #[test]
    fn test_patch_keeps_unset_fields() {
        let mut m = member(None);
        let original_email = m.email.clone();
        MemberPatch {
            name: Some("Priya S".into()),
            ..Default::default()
        }
        .apply(&mut m, Utc::now());

        assert_eq!(m.name, "Priya S");
        assert_eq!(m.email, original_email);
    }

    #[test]
    fn test_patch_validated_against_current_record() {
        let current = member(NaiveDate::from_ymd_opt(2024, 3, 1));

        let blank_name = MemberPatch {
            name: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(blank_name.validate(&current).unwrap_err(), "Member name is required");

        // Only the end date moves, but it now falls before the stored start date
        let early_end = MemberPatch {
            end_date: NaiveDate::from_ymd_opt(2023, 12, 31),
            ..Default::default()
        };
        assert!(early_end.validate(&current).is_err());

        let late_start = MemberPatch {
            start_date: NaiveDate::from_ymd_opt(2024, 4, 1),
            ..Default::default()
        };
        assert!(late_start.validate(&current).is_err());

        let refund = MemberPatch {
            amount_paid: Some(Decimal::new(-500, 0)),
            ..Default::default()
        };
        assert_eq!(refund.validate(&current).unwrap_err(), "Amount paid cannot be negative");

        let renewal = MemberPatch {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            amount_paid: Some(Decimal::new(1500, 0)),
            ..Default::default()
        };
        assert!(renewal.validate(&current).is_ok());
    }
}
