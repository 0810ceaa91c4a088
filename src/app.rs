use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::auth::password::hash_password;
use crate::auth::{TokenCodec, TokenError};
use crate::config::{AppConfig, BootstrapAdmin, SecurityConfig};
use crate::database::models::NewAdmin;
use crate::database::{MemoryStore, PgStore, Store, StoreError};
use crate::handlers::{elevated, protected, public};
use crate::middleware::gate::gate_middleware;
use crate::middleware::rate_limit::{DailyRateLimiter, SWEEP_INTERVAL};
use crate::services::plan_service::{PlanError, PlanService};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("token codec: {0}")]
    Token(#[from] TokenError),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("AI client: {0}")]
    Plan(#[from] PlanError),

    #[error("hashing bootstrap admin password: {0}")]
    Password(#[from] bcrypt::BcryptError),

    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared handles passed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenCodec>,
    pub store: Arc<dyn Store>,
    pub limiter: Arc<DailyRateLimiter>,
    pub planner: PlanService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Store>,
        limiter: Arc<DailyRateLimiter>,
        planner: PlanService,
    ) -> Result<Self, StartupError> {
        let tokens = TokenCodec::new(&config.security.jwt_secret)?;
        Ok(Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            store,
            limiter,
            planner,
        })
    }

    /// Connect the configured store, seed the first admin and build the AI client
    pub async fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let store = connect_store(&config).await?;
        if let Some(admin) = &config.bootstrap_admin {
            seed_admin(store.as_ref(), admin).await?;
        }
        let planner = PlanService::from_config(&config.ai)?;

        Self::new(config, store, Arc::new(DailyRateLimiter::new()), planner)
    }
}

pub async fn connect_store(config: &AppConfig) -> Result<Arc<dyn Store>, StoreError> {
    match &config.database.url {
        Some(url) => {
            let store = PgStore::connect(url, &config.database).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL is not set; using the in-memory store (data is lost on restart)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Create the bootstrap admin unless an account with that email already exists
pub async fn seed_admin(store: &dyn Store, admin: &BootstrapAdmin) -> Result<(), StartupError> {
    if store.find_admin_by_email(&admin.email).await?.is_some() {
        return Ok(());
    }

    let password_hash = hash_password(&admin.password)?;
    let created = store
        .create_admin(NewAdmin {
            email: admin.email.clone(),
            name: admin.name.clone(),
            password_hash,
        })
        .await?;
    info!(email = %created.email, "created bootstrap admin account");
    Ok(())
}

pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(public::health))
        .merge(auth_routes())
        .merge(plan_routes())
        .merge(trainer_routes())
        .merge(admin_routes());

    // The UI bundle owns `/` when it is served from here
    let router = match &state.config.server.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true)),
        None => router.route("/", get(public::root)).fallback(public::not_found),
    };

    router
        .layer(from_fn_with_state(state.clone(), gate_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.security)),
        )
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(public::auth::login))
        .route("/api/auth/logout", post(public::auth::logout))
        .route("/api/auth/me", get(public::auth::me))
        .route("/api/trainers/auth", post(public::trainer_auth::login))
}

fn plan_routes() -> Router<AppState> {
    Router::new().route("/api/generate-plan", post(public::generate_plan::generate))
}

fn trainer_routes() -> Router<AppState> {
    use protected::trainer_members;

    Router::new().route(
        "/api/trainers/members",
        get(trainer_members::list)
            .post(trainer_members::create)
            .put(trainer_members::update)
            .delete(trainer_members::delete),
    )
}

fn admin_routes() -> Router<AppState> {
    use elevated::{members, notifications, stats, trainers};

    Router::new()
        .route("/api/admin/stats", get(stats::get))
        .route(
            "/api/admin/notifications",
            get(notifications::list)
                .patch(notifications::mark_read)
                .delete(notifications::delete),
        )
        .route("/api/admin/members", get(members::list).post(members::create))
        .route(
            "/api/admin/members/:id",
            get(members::show).put(members::update).delete(members::delete),
        )
        .route("/api/admin/trainers", get(trainers::list).post(trainers::create))
        .route(
            "/api/admin/trainers/:id",
            axum::routing::put(trainers::update).delete(trainers::delete),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(state: AppState) -> Result<(), StartupError> {
    let bind_addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("gymdesk API listening on http://{}", listener.local_addr()?);

    let sweeper = state.limiter.spawn_sweeper(SWEEP_INTERVAL);
    let result = axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;
    sweeper.abort();

    result?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
