//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Required Variables
//!
//! - `SESSION_SECRET` - HMAC key for session cookies (at least 32 bytes)
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `APP_ENV` - `development` or `production` (default: `development`);
//!   production marks the CSRF cookie `Secure`
//! - `SESSION_COOKIE` - Session cookie name (default: `campus_session`)
//! - `SIGN_IN_PATH` - Redirect target for denied pages (default: `/campus/auth/login`)
//! - `STATIC_DIR` - Campus frontend build served downstream (default: `public`)
//! - `REDIS_URL` / `REDIS_HOST` - Shared rate store (in-memory if unset)
//! - `LOGIN_RATE_LIMIT_MAX` / `LOGIN_RATE_LIMIT_WINDOW` - Login policy (default: 5 per 60s)
//! - `API_RATE_LIMIT_MAX` / `API_RATE_LIMIT_WINDOW` - API policy (default: 50 per 60s)
//! - `RATE_LIMIT_SWEEP_INTERVAL` - Seconds between sweeps of expired records (default: 60)
//! - `RATE_LIMIT_IDENTITY` - `forwarded` (proxy headers) or `peer` (socket address)
//!
//! ### Redis from components
//!
//! ```bash
//! export REDIS_HOST="localhost"
//! export REDIS_PORT="6379"
//! export REDIS_PASSWORD=""
//! export REDIS_DB="0"
//! ```

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

use crate::application::services::RateLimitPolicy;
use crate::domain::route_map::{Access, RouteMap};
use crate::utils::client_ip::IdentitySource;
use crate::utils::path::normalize_path;

/// Longest accepted rate-limit window, in seconds (one day).
pub const MAX_WINDOW_SECS: u64 = 86_400;

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!(
                "APP_ENV must be 'development' or 'production', got '{other}'"
            )),
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
    pub environment: Environment,
    /// HMAC key used to verify session cookies. Must be at least 32 bytes.
    pub session_secret: String,
    pub session_cookie: String,
    pub sign_in_path: String,
    pub static_dir: String,
    pub redis_url: Option<String>,
    pub login_max_requests: u32,
    pub login_window_secs: u64,
    pub api_max_requests: u32,
    pub api_window_secs: u64,
    pub sweep_interval_secs: u64,
    /// Where the rate limiter reads the client identity from.
    /// Use `peer` unless an edge proxy overwrites `X-Forwarded-For`.
    pub identity_source: IdentitySource,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `SESSION_SECRET` is missing or an enumerated
    /// variable holds an unknown value.
    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let environment = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse::<Environment>()
            .map_err(anyhow::Error::msg)?;

        let session_secret =
            env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?;
        let session_cookie =
            env::var("SESSION_COOKIE").unwrap_or_else(|_| "campus_session".to_string());
        let sign_in_path =
            env::var("SIGN_IN_PATH").unwrap_or_else(|_| "/campus/auth/login".to_string());
        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "public".to_string());

        let redis_url = Self::load_redis_url();

        let identity_source = match env::var("RATE_LIMIT_IDENTITY") {
            Ok(v) => v
                .parse::<IdentitySource>()
                .map_err(|e| anyhow::anyhow!("RATE_LIMIT_IDENTITY: {e}"))?,
            Err(_) => IdentitySource::default(),
        };

        Ok(Self {
            listen_addr,
            log_level,
            log_format,
            environment,
            session_secret,
            session_cookie,
            sign_in_path,
            static_dir,
            redis_url,
            login_max_requests: env_or("LOGIN_RATE_LIMIT_MAX", 5),
            login_window_secs: env_or("LOGIN_RATE_LIMIT_WINDOW", 60),
            api_max_requests: env_or("API_RATE_LIMIT_MAX", 50),
            api_window_secs: env_or("API_RATE_LIMIT_WINDOW", 60),
            sweep_interval_secs: env_or("RATE_LIMIT_SWEEP_INTERVAL", 60),
            identity_source,
        })
    }

    /// Loads Redis URL with fallback to component-based configuration.
    ///
    /// Priority:
    /// 1. `REDIS_URL` environment variable
    /// 2. Constructed from `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`
    ///
    /// Returns `None` if Redis is not configured.
    fn load_redis_url() -> Option<String> {
        if let Ok(url) = env::var("REDIS_URL") {
            return Some(url);
        }

        let host = env::var("REDIS_HOST").ok()?;
        let port = env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
        let password = env::var("REDIS_PASSWORD").ok();
        let db = env::var("REDIS_DB").unwrap_or_else(|_| "0".to_string());

        let url = match password {
            Some(pwd) if !pwd.is_empty() => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
            _ => format!("redis://{}:{}/{}", host, port, db),
        };

        Some(url)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is not `host:port`
    /// - `session_secret` is shorter than 32 bytes
    /// - a rate-limit maximum or sweep interval is zero
    /// - a rate-limit window is zero or longer than [`MAX_WINDOW_SECS`]
    /// - `sign_in_path` is not an absolute path on a public page
    /// - `redis_url` has an unknown scheme
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if self.session_secret.len() < 32 {
            anyhow::bail!(
                "SESSION_SECRET must be at least 32 bytes, got {}",
                self.session_secret.len()
            );
        }

        if self.session_cookie.is_empty() {
            anyhow::bail!("SESSION_COOKIE must not be empty");
        }

        if !self.sign_in_path.starts_with('/') {
            anyhow::bail!(
                "SIGN_IN_PATH must start with '/', got '{}'",
                self.sign_in_path
            );
        }

        // A gated sign-in page would redirect to itself.
        let sign_in_access = normalize_path(&self.sign_in_path)
            .map(|path| RouteMap::default().access(&path));
        if sign_in_access != Some(Access::Public) {
            anyhow::bail!(
                "SIGN_IN_PATH must be a public page, got '{}'",
                self.sign_in_path
            );
        }

        if self.login_max_requests == 0 || self.api_max_requests == 0 {
            anyhow::bail!("Rate limit maximums must be greater than 0");
        }

        if self.login_window_secs == 0 || self.api_window_secs == 0 {
            anyhow::bail!("Rate limit windows must be greater than 0");
        }

        if self.login_window_secs > MAX_WINDOW_SECS || self.api_window_secs > MAX_WINDOW_SECS {
            anyhow::bail!("Rate limit windows must be at most {MAX_WINDOW_SECS} seconds");
        }

        if self.sweep_interval_secs == 0 {
            anyhow::bail!("RATE_LIMIT_SWEEP_INTERVAL must be greater than 0");
        }

        if let Some(ref redis_url) = self.redis_url
            && !redis_url.starts_with("redis://")
            && !redis_url.starts_with("rediss://")
        {
            anyhow::bail!(
                "REDIS_URL must start with 'redis://' or 'rediss://', got '{}'",
                mask_connection_string(redis_url)
            );
        }

        Ok(())
    }

    /// Whether cookies issued by the gate carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Policy for the login endpoint.
    pub fn login_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            max_requests: self.login_max_requests,
            window: std::time::Duration::from_secs(self.login_window_secs),
            ..RateLimitPolicy::login()
        }
    }

    /// Policy for general API traffic.
    pub fn api_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            max_requests: self.api_max_requests,
            window: std::time::Duration::from_secs(self.api_window_secs),
            ..RateLimitPolicy::api()
        }
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Environment: {:?}", self.environment);

        if let Some(ref redis_url) = self.redis_url {
            tracing::info!("  Rate store: Redis {}", mask_connection_string(redis_url));
        } else {
            tracing::info!("  Rate store: in-memory");
        }

        tracing::info!(
            "  Login limit: {} per {}s",
            self.login_max_requests,
            self.login_window_secs
        );
        tracing::info!(
            "  API limit: {} per {}s",
            self.api_max_requests,
            self.api_window_secs
        );
        tracing::info!("  Client identity: {}", self.identity_source);
        tracing::info!("  Session cookie: {}", self.session_cookie);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Reads a numeric variable, falling back to `default` if unset or unparsable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Masks sensitive information in connection strings for logging.
///
/// Replaces password with `***` in URLs like:
/// - `redis://:password@host:port/db` → `redis://:***@host:port/db`
fn mask_connection_string(url: &str) -> String {
    if let Some(start) = url.find("://") {
        let scheme_end = start + 3;
        let rest = &url[scheme_end..];

        if let Some(at_pos) = rest.find('@') {
            let credentials = &rest[..at_pos];
            let host_part = &rest[at_pos..];

            if let Some(colon_pos) = credentials.rfind(':') {
                let username = &credentials[..colon_pos];
                return format!("{}://{}:***{}", &url[..start], username, host_part);
            }
        }
    }

    url.to_string()
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if required variables are missing or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
