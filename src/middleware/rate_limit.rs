//! Per-client daily quota for the AI plan endpoint.
//!
//! Counters reset at the start of each UTC calendar day (not a sliding 24h window).
//! State lives in this process only; multiple replicas each keep their own counts.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Requests allowed per client per UTC day
pub const DAILY_QUOTA: u32 = 10;

/// How often stale records are swept
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Bucket shared by clients we cannot identify
pub const UNKNOWN_CLIENT: &str = "unknown";

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RateLimitRecord {
    count: u32,
    /// Epoch milliseconds of the UTC day this count belongs to
    reset_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Denied,
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

/// Start of the UTC day containing `now`, in epoch milliseconds
pub fn day_start_ms(now: DateTime<Utc>) -> i64 {
    now.timestamp_millis().div_euclid(DAY_MS) * DAY_MS
}

pub struct DailyRateLimiter {
    quota: u32,
    clock: Arc<dyn Clock>,
    records: Mutex<HashMap<String, RateLimitRecord>>,
}

impl Default for DailyRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl DailyRateLimiter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            quota: DAILY_QUOTA,
            clock,
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn quota(&self) -> u32 {
        self.quota
    }

    /// Count one request for `client_id` and decide whether it may proceed.
    /// A denied request leaves the stored count untouched.
    pub fn check(&self, client_id: &str) -> RateDecision {
        let today = day_start_ms(self.clock.now());
        let mut records = self.records.lock();

        match records.get_mut(client_id) {
            Some(record) if record.reset_time == today => {
                if record.count >= self.quota {
                    warn!(client = %client_id, quota = self.quota, "daily request limit reached");
                    return RateDecision::Denied;
                }
                record.count += 1;
                RateDecision::Allowed {
                    remaining: self.quota - record.count,
                }
            }
            _ => {
                records.insert(
                    client_id.to_string(),
                    RateLimitRecord {
                        count: 1,
                        reset_time: today,
                    },
                );
                RateDecision::Allowed {
                    remaining: self.quota.saturating_sub(1),
                }
            }
        }
    }

    /// Drop records from previous days; returns how many were removed
    pub fn sweep(&self) -> usize {
        let today = day_start_ms(self.clock.now());
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|_, record| record.reset_time >= today);
        before - records.len()
    }

    /// Requests counted today for `client_id`
    pub fn count_for(&self, client_id: &str) -> Option<u32> {
        let today = day_start_ms(self.clock.now());
        self.records
            .lock()
            .get(client_id)
            .filter(|record| record.reset_time == today)
            .map(|record| record.count)
    }

    pub fn tracked_clients(&self) -> usize {
        self.records.lock().len()
    }

    /// Run `sweep` every `period` on the tokio runtime
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = limiter.sweep();
                if removed > 0 {
                    debug!(removed, "swept stale rate limit records");
                }
            }
        })
    }
}

/// Client key: first `x-forwarded-for` entry, then the peer address, then a shared fallback
pub fn client_id(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => UNKNOWN_CLIENT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::{Duration as ChronoDuration, TimeZone};

    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn at(time: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(time)))
        }

        fn advance(&self, by: ChronoDuration) {
            let mut now = self.0.lock();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock()
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_day_start() {
        let start = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        assert_eq!(day_start_ms(noon()), start.timestamp_millis());
        assert_eq!(day_start_ms(start), start.timestamp_millis());
    }

    #[test]
    fn test_quota_within_a_day() {
        let limiter = DailyRateLimiter::with_clock(ManualClock::at(noon()));

        for i in 0..DAILY_QUOTA {
            assert_eq!(
                limiter.check("1.2.3.4"),
                RateDecision::Allowed {
                    remaining: DAILY_QUOTA - i - 1
                }
            );
        }
        assert_eq!(limiter.check("1.2.3.4"), RateDecision::Denied);
        assert_eq!(limiter.check("1.2.3.4"), RateDecision::Denied);
        assert_eq!(limiter.count_for("1.2.3.4"), Some(DAILY_QUOTA));
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = DailyRateLimiter::with_clock(ManualClock::at(noon()));
        for _ in 0..DAILY_QUOTA {
            limiter.check("a");
        }
        assert!(!limiter.check("a").is_allowed());
        assert!(limiter.check("b").is_allowed());
    }

    #[test]
    fn test_rollover_resets_count() {
        let clock = ManualClock::at(noon());
        let limiter = DailyRateLimiter::with_clock(clock.clone());
        for _ in 0..=DAILY_QUOTA {
            limiter.check("1.2.3.4");
        }
        assert!(!limiter.check("1.2.3.4").is_allowed());

        // 23:59:59 is still the same day
        clock.advance(ChronoDuration::hours(11) + ChronoDuration::minutes(59) + ChronoDuration::seconds(59));
        assert!(!limiter.check("1.2.3.4").is_allowed());

        clock.advance(ChronoDuration::seconds(1));
        assert!(limiter.check("1.2.3.4").is_allowed());
        assert_eq!(limiter.count_for("1.2.3.4"), Some(1));
    }

    #[test]
    fn test_sweep_drops_previous_days() {
        let clock = ManualClock::at(noon());
        let limiter = DailyRateLimiter::with_clock(clock.clone());
        limiter.check("old");

        clock.advance(ChronoDuration::days(1));
        limiter.check("fresh");

        assert_eq!(limiter.tracked_clients(), 2);
        assert_eq!(limiter.sweep(), 1);
        assert_eq!(limiter.tracked_clients(), 1);
        assert_eq!(limiter.count_for("fresh"), Some(1));
        assert_eq!(limiter.count_for("old"), None);
    }

    #[test]
    fn test_client_id_sources() {
        let peer: SocketAddr = "10.0.0.7:51234".parse().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4, 10.0.0.1"));
        assert_eq!(client_id(&headers, Some(peer)), "1.2.3.4");

        assert_eq!(client_id(&HeaderMap::new(), Some(peer)), "10.0.0.7");
        assert_eq!(client_id(&HeaderMap::new(), None), UNKNOWN_CLIENT);

        let mut blank = HeaderMap::new();
        blank.insert("x-forwarded-for", HeaderValue::from_static(" "));
        assert_eq!(client_id(&blank, None), UNKNOWN_CLIENT);
    }

    #[tokio::test]
    async fn test_sweeper_runs_in_background() {
        let clock = ManualClock::at(noon());
        let limiter = Arc::new(DailyRateLimiter::with_clock(clock.clone()));
        limiter.check("old");
        clock.advance(ChronoDuration::days(2));

        let handle = limiter.spawn_sweeper(Duration::from_millis(10));
        for _ in 0..50 {
            if limiter.tracked_clients() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();
        assert_eq!(limiter.tracked_clients(), 0);
    }
}
