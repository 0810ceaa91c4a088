pub mod plan_service;
pub mod stats_service;

pub use plan_service::{CompletionClient, GroqClient, PlanError, PlanOutcome, PlanService, WellnessForm};
pub use stats_service::{dashboard_stats, DashboardStats};
