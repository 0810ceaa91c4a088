use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::middleware::gate::RoutePolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingJwtSecret,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub ai: AiConfig,
    pub routes: RoutePolicy,
    #[serde(skip)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the built UI bundle, served for any unmatched route
    pub static_dir: Option<PathBuf>,
}

#[derive(Clone, Serialize)]
pub struct DatabaseConfig {
    #[serde(skip)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Clone, Serialize)]
pub struct SecurityConfig {
    #[serde(skip)]
    pub jwt_secret: String,
    pub cookie_secure: bool,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Clone, Serialize)]
pub struct AiConfig {
    #[serde(skip)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1/".to_string(),
            model: "meta-llama/llama-4-scout-17b-16e-instruct".to_string(),
            max_tokens: 3000,
            temperature: 0.7,
            request_timeout_secs: 60,
        }
    }
}

#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("max_connections", &self.max_connections)
            .field("connection_timeout", &self.connection_timeout)
            .finish()
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("cookie_secure", &self.cookie_secure)
            .field("enable_cors", &self.enable_cors)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Load configuration from the process environment (after `.env`, if present)
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let jwt_secret = lookup("JWT_SECRET")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;

        // Set defaults based on environment, then override with specific env vars
        let mut config = match environment {
            Environment::Production => Self::production(jwt_secret),
            Environment::Staging => Self::staging(jwt_secret),
            Environment::Development => Self::development(jwt_secret),
        };
        config.apply_overrides(&lookup)?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("GYMDESK_PORT").or_else(|| lookup("PORT")) {
            self.server.port = parse("PORT", &v)?;
        }
        if let Some(v) = lookup("STATIC_DIR") {
            self.server.static_dir = Some(PathBuf::from(v));
        }

        // Database overrides
        self.database.url = lookup("DATABASE_URL").filter(|v| !v.is_empty());
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_COOKIE_SECURE") {
            self.security.cookie_secure = parse("SECURITY_COOKIE_SECURE", &v)?;
        }
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = parse("SECURITY_ENABLE_CORS", &v)?;
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }

        // AI overrides
        self.ai.api_key = lookup("GROQ_API_KEY").filter(|v| !v.is_empty());
        if let Some(v) = lookup("GROQ_BASE_URL") {
            self.ai.base_url = v;
        }
        if let Some(v) = lookup("GROQ_MODEL") {
            self.ai.model = v;
        }
        if let Some(v) = lookup("GROQ_MAX_TOKENS") {
            self.ai.max_tokens = parse("GROQ_MAX_TOKENS", &v)?;
        }
        if let Some(v) = lookup("GROQ_TEMPERATURE") {
            self.ai.temperature = parse("GROQ_TEMPERATURE", &v)?;
        }
        if let Some(v) = lookup("GROQ_TIMEOUT_SECS") {
            self.ai.request_timeout_secs = parse("GROQ_TIMEOUT_SECS", &v)?;
        }

        // Route policy overrides
        if let Some(v) = lookup("GATE_PUBLIC_PREFIXES") {
            self.routes.public_prefixes = split_list(&v);
        }
        if let Some(v) = lookup("GATE_ADMIN_API_PREFIXES") {
            self.routes.admin_api_prefixes = split_list(&v);
        }

        // Optional first admin account
        if let (Some(email), Some(password)) = (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            if !email.is_empty() && !password.is_empty() {
                self.bootstrap_admin = Some(BootstrapAdmin {
                    email,
                    password,
                    name: lookup("ADMIN_NAME").unwrap_or_else(|| "Administrator".to_string()),
                });
            }
        }

        Ok(())
    }

    fn base(environment: Environment, jwt_secret: String) -> Self {
        Self {
            environment,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                static_dir: None,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret,
                cookie_secure: false,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            ai: AiConfig::default(),
            routes: RoutePolicy::default(),
            bootstrap_admin: None,
        }
    }

    fn development(jwt_secret: String) -> Self {
        let mut config = Self::base(Environment::Development, jwt_secret);
        config.security.cors_origins.push("http://localhost:5173".to_string());
        config
    }

    fn staging(jwt_secret: String) -> Self {
        let mut config = Self::base(Environment::Staging, jwt_secret);
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.cookie_secure = true;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config
    }

    fn production(jwt_secret: String) -> Self {
        let mut config = Self::base(Environment::Production, jwt_secret);
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.security.cookie_secure = true;
        config.security.cors_origins = vec!["https://app.example.com".to_string()];
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
