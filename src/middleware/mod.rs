pub mod auth;
pub mod gate;
pub mod rate_limit;
pub mod response;

pub use auth::{authenticate, AdminUser, AuthUser, TrainerUser};
pub use gate::{gate_middleware, Decision, RoutePolicy};
pub use rate_limit::{client_id, Clock, DailyRateLimiter, RateDecision, SystemClock, DAILY_QUOTA};
pub use response::{ApiResponse, ApiResult};
