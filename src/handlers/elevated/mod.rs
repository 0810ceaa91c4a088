// handlers/elevated/mod.rs - Back-office endpoints
//
// Each handler takes an `AdminUser`, which requires a verified `super_admin` token.
// Stats and notifications are additionally listed in the gate's admin API prefixes.
pub mod members;
pub mod notifications;
pub mod stats;
pub mod trainers;
