// handlers/public/mod.rs - Endpoints reachable without a token
//
// Login routes hand out tokens; the plan generator is guarded by the daily rate limiter instead.
pub mod auth;
pub mod generate_plan;
pub mod root;
pub mod trainer_auth;

pub use root::{health, not_found, root};
