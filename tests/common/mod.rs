#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::StatusCode;
use tokio::net::TcpListener;

use gymdesk_api::app::{app, seed_admin, AppState};
use gymdesk_api::auth::password::hash_password;
use gymdesk_api::auth::{Identity, Role};
use gymdesk_api::config::{AppConfig, BootstrapAdmin};
use gymdesk_api::database::models::{NewTrainer, Trainer};
use gymdesk_api::database::{MemoryStore, Store};
use gymdesk_api::middleware::{Clock, DailyRateLimiter};
use gymdesk_api::services::{CompletionClient, PlanError, PlanService};

pub const ADMIN_EMAIL: &str = "owner@gym.test";
pub const ADMIN_PASSWORD: &str = "correct-horse";

/// A valid plan, fenced the way models tend to answer
pub const FENCED_PLAN: &str = "```json\n{\"push_day\":{\"exercises\":[]},\"pull_day\":{\"exercises\":[]},\"legs_day\":{\"exercises\":[]},\"diet_plan\":{\"type\":\"Indian flexible\"}}\n```";

pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(now)))
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.0.lock().expect("clock lock");
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock lock")
    }
}

/// Completion backend that answers every prompt with the same text
pub struct StubCompletion {
    pub reply: Mutex<Result<String, StatusCode>>,
    pub calls: AtomicUsize,
}

impl StubCompletion {
    pub fn replying(content: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Ok(content.to_string())),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(status: StatusCode) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Err(status)),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for StubCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, PlanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.reply.lock().expect("stub lock") {
            Ok(content) if content.is_empty() => Err(PlanError::EmptyCompletion),
            Ok(content) => Ok(content.clone()),
            Err(status) => Err(PlanError::Upstream {
                status: *status,
                body: "upstream exploded".to_string(),
            }),
        }
    }
}

pub struct TestOptions {
    pub completion: Option<Arc<StubCompletion>>,
    pub lookup: Vec<(&'static str, String)>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            completion: Some(StubCompletion::replying(FENCED_PLAN)),
            lookup: Vec::new(),
        }
    }
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub completion: Option<Arc<StubCompletion>>,
    /// Never follows redirects so gate redirects can be asserted
    pub client: reqwest::Client,
}

pub fn test_config(extra: &[(&'static str, String)]) -> AppConfig {
    AppConfig::from_lookup(|key| {
        extra
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
            .or_else(|| (key == "JWT_SECRET").then(|| "integration-test-secret".to_string()))
    })
    .expect("test config")
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(TestOptions::default()).await
    }

    pub async fn start_with(options: TestOptions) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap());
        let limiter = Arc::new(DailyRateLimiter::with_clock(clock.clone()));
        let planner = match &options.completion {
            Some(stub) => PlanService::with_client(stub.clone()),
            None => PlanService::disabled(),
        };

        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        seed_admin(
            store.as_ref(),
            &BootstrapAdmin {
                email: ADMIN_EMAIL.to_string(),
                name: "Gym Owner".to_string(),
                password: ADMIN_PASSWORD.to_string(),
            },
        )
        .await?;

        let state = AppState::new(test_config(&options.lookup), store, limiter, planner)?;

        let listener = TcpListener::bind(("127.0.0.1", port)).await?;
        let router = app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await;
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let server = Self {
            port,
            base_url,
            state,
            clock,
            completion: options.completion,
            client,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn token(&self, role: Role) -> String {
        let identity = match role {
            Role::SuperAdmin => Identity::new("admin-1", ADMIN_EMAIL, Role::SuperAdmin, "Gym Owner"),
            Role::Trainer => Identity::new("trainer-1", "coach@gym.test", Role::Trainer, "Coach Mira"),
        };
        self.state.tokens.issue(&identity).expect("issue token")
    }

    pub async fn create_trainer(&self, email: &str, password: &str, active: bool) -> Result<Trainer> {
        Ok(self
            .state
            .store
            .create_trainer(NewTrainer {
                name: "Coach Mira".to_string(),
                email: email.to_string(),
                password_hash: hash_password(password)?,
                phone: None,
                specialization: Some("Strength".to_string()),
                is_active: active,
            })
            .await?)
    }
}

/// Value of the `name` cookie set by a response, if any
pub fn set_cookie(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&format!("{}=", name)))
        .map(str::to_string)
}
