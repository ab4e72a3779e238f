//! Configuration management.
//!
//! All configurable parameters in one place with environment variable
//! overrides. Sensible defaults for development, explicit secrets required
//! in production.

use anyhow::{bail, Result};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Development-only defaults, refused when LUCID_ENV=production.
pub const DEV_JWT_SECRET: &str = "lucid-dev-jwt-secret-change-in-production";
pub const DEV_PASSWORD_PEPPER: &str = "lucid-dev-pepper-change-in-production";

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins (empty = allow all)
    pub allowed_origins: Vec<String>,
    /// Max age for preflight cache (seconds)
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: 86400,
        }
    }
}

impl CorsConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(origins) = env::var("LUCID_CORS_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(val) = env::var("LUCID_CORS_MAX_AGE") {
            if let Ok(n) = val.parse() {
                config.max_age_seconds = n;
            }
        }

        config
    }

    /// Convert to tower-http CorsLayer
    pub fn to_layer(&self) -> tower_http::cors::CorsLayer {
        use axum::http::{HeaderValue, Method};
        use tower_http::cors::{AllowOrigin, Any, CorsLayer};

        let mut layer = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any)
            .max_age(std::time::Duration::from_secs(self.max_age_seconds));

        if self.allowed_origins.is_empty() {
            layer = layer.allow_origin(Any);
        } else {
            let mut valid_origins = Vec::new();
            for origin_str in &self.allowed_origins {
                match origin_str.parse::<HeaderValue>() {
                    Ok(origin) => valid_origins.push(origin),
                    Err(_) => tracing::warn!("CORS: invalid origin '{}' - skipping", origin_str),
                }
            }
            // An empty list denies all cross-origin requests rather than
            // falling back to permissive on a config error.
            layer = layer.allow_origin(AllowOrigin::list(valid_origins));
        }

        layer
    }
}

/// Server configuration loaded from environment with defaults
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host address (default: 127.0.0.1)
    pub host: String,

    /// Server port (default: 4080)
    pub port: u16,

    /// SQLite database file path (default: ./lucid_journal.db)
    pub database_path: PathBuf,

    /// JWT signing secret
    pub jwt_secret: String,

    /// Access token lifetime in seconds (default: 86400 = 24 hours)
    pub jwt_ttl_secs: u64,

    /// Server-side pepper mixed into passwords before hashing
    pub password_pepper: String,

    /// Backup codes issued per user (default: 8)
    pub backup_code_count: usize,

    /// Rate limit: requests per second (default: 50)
    pub rate_limit_per_second: u64,

    /// Rate limit: burst size (default: 100)
    pub rate_limit_burst: u32,

    /// Maximum concurrent requests (default: 100)
    pub max_concurrent_requests: usize,

    /// Whether running in production mode (LUCID_ENV=production)
    pub is_production: bool,

    /// CORS configuration
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4080,
            database_path: PathBuf::from("./lucid_journal.db"),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl_secs: 86_400,
            password_pepper: DEV_PASSWORD_PEPPER.to_string(),
            backup_code_count: 8,
            rate_limit_per_second: 50,
            rate_limit_burst: 100,
            max_concurrent_requests: 100,
            is_production: false,
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults
    #[allow(clippy::field_reassign_with_default)] // Environment overrides require mutable config
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.is_production = env::var("LUCID_ENV")
            .map(|v| {
                let v = v.to_lowercase();
                v == "production" || v == "prod"
            })
            .unwrap_or(false);

        if let Ok(val) = env::var("LUCID_HOST") {
            config.host = val;
        }

        if let Ok(val) = env::var("LUCID_PORT") {
            if let Ok(port) = val.parse() {
                config.port = port;
            }
        }

        if let Ok(val) = env::var("LUCID_DB_PATH") {
            config.database_path = PathBuf::from(val);
        }

        if let Ok(val) = env::var("LUCID_JWT_SECRET") {
            if !val.trim().is_empty() {
                config.jwt_secret = val;
            }
        }

        if let Ok(val) = env::var("LUCID_JWT_TTL_SECS") {
            if let Ok(n) = val.parse() {
                config.jwt_ttl_secs = n;
            }
        }

        if let Ok(val) = env::var("LUCID_PEPPER") {
            if !val.trim().is_empty() {
                config.password_pepper = val;
            }
        }

        if let Ok(val) = env::var("LUCID_BACKUP_CODES") {
            if let Ok(n) = val.parse() {
                config.backup_code_count = n;
            }
        }

        if let Ok(val) = env::var("LUCID_RATE_LIMIT") {
            if let Ok(n) = val.parse() {
                config.rate_limit_per_second = n;
            }
        }

        if let Ok(val) = env::var("LUCID_RATE_BURST") {
            if let Ok(n) = val.parse() {
                config.rate_limit_burst = n;
            }
        }

        if let Ok(val) = env::var("LUCID_MAX_CONCURRENT") {
            if let Ok(n) = val.parse() {
                config.max_concurrent_requests = n;
            }
        }

        config.cors = CorsConfig::from_env();

        config
    }

    /// Refuse to start with development secrets in production mode.
    pub fn validate(&self) -> Result<()> {
        if self.is_production {
            if self.jwt_secret == DEV_JWT_SECRET {
                bail!("LUCID_JWT_SECRET must be set in production mode");
            }
            if self.password_pepper == DEV_PASSWORD_PEPPER {
                bail!("LUCID_PEPPER must be set in production mode");
            }
            if self.cors.allowed_origins.is_empty() {
                tracing::warn!(
                    "PRODUCTION WARNING: CORS allows all origins. Set LUCID_CORS_ORIGINS."
                );
            }
        }
        Ok(())
    }

    /// Log the effective configuration (secrets redacted)
    pub fn log(&self) {
        info!("Configuration:");
        info!("  host: {}:{}", self.host, self.port);
        info!("  database: {:?}", self.database_path);
        info!("  jwt ttl: {}s", self.jwt_ttl_secs);
        info!("  backup codes per user: {}", self.backup_code_count);
        info!(
            "  rate limit: {} req/s (burst {})",
            self.rate_limit_per_second, self.rate_limit_burst
        );
        info!("  max concurrent requests: {}", self.max_concurrent_requests);
        info!("  production mode: {}", self.is_production);
    }
}
