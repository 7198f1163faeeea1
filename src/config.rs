//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::constants::{
    DEFAULT_API_VERSION, DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_MAX_BODY_BYTES,
    DEFAULT_PASSWORD_HASH_ITERATIONS, DEFAULT_PASSWORD_HASH_MEMORY_KIB,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_SESSION_SWEEP_INTERVAL_SECS, DEFAULT_SESSION_TTL_HOURS,
    DEFAULT_VALIDATION_TOKEN_TTL_MINUTES,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub log_format: LogFormat,
    /// Prefix every user route is mounted under, e.g. `/api/v1`
    pub api_version: String,
    pub request_timeout_secs: u64,
    pub max_body_bytes: usize,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Which persistence backend holds users and sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Process-local maps; state is lost on restart
    #[default]
    Memory,
    /// Users in Postgres, sessions in Redis
    Postgres,
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub redis_url: Option<String>,
}

/// Authentication and session configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_ttl_hours: i64,
    pub validation_token_ttl_minutes: i64,
    pub sweep_interval_secs: u64,
    /// Whether `isAdmin: true` is honoured on public signup
    pub allow_admin_signup: bool,
    pub password_hash_memory_kib: u32,
    pub password_hash_iterations: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            server: ServerConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            auth: AuthConfig::from_env()?,
        };
        config.validate()?;

        Ok(config)
    }

    /// Cross-field checks that cannot be expressed per variable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::Postgres {
            if self.storage.database_url.is_none() {
                return Err(ConfigError::Missing("DATABASE_URL".to_string()));
            }
            if self.storage.redis_url.is_none() {
                return Err(ConfigError::Missing("REDIS_URL".to_string()));
            }
        }
        if !self.server.api_version.starts_with('/') {
            return Err(ConfigError::InvalidValue("API_VERSION".to_string()));
        }
        if self.auth.session_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue("SESSION_TTL_HOURS".to_string()));
        }
        if self.auth.validation_token_ttl_minutes <= 0 {
            return Err(ConfigError::InvalidValue(
                "VALIDATION_TOKEN_TTL_MINUTES".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            rust_log: "info".to_string(),
            log_format: LogFormat::Pretty,
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            database_url: None,
            max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            redis_url: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            validation_token_ttl_minutes: DEFAULT_VALIDATION_TOKEN_TTL_MINUTES,
            sweep_interval_secs: DEFAULT_SESSION_SWEEP_INTERVAL_SECS,
            allow_admin_signup: true,
            password_hash_memory_kib: DEFAULT_PASSWORD_HASH_MEMORY_KIB,
            password_hash_iterations: DEFAULT_PASSWORD_HASH_ITERATIONS,
        }
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_or("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            log_format: parse_or("LOG_FORMAT", LogFormat::Pretty)?,
            api_version: env::var("API_VERSION")
                .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string()),
            request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            max_body_bytes: parse_or("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
        })
    }
}

impl StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            backend: parse_or("STORAGE_BACKEND", StorageBackend::Memory)?,
            database_url: env::var("DATABASE_URL").ok(),
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS)?,
            redis_url: env::var("REDIS_URL").ok(),
        })
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            session_ttl_hours: parse_or("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?,
            validation_token_ttl_minutes: parse_or(
                "VALIDATION_TOKEN_TTL_MINUTES",
                DEFAULT_VALIDATION_TOKEN_TTL_MINUTES,
            )?,
            sweep_interval_secs: parse_or(
                "SESSION_SWEEP_INTERVAL_SECS",
                DEFAULT_SESSION_SWEEP_INTERVAL_SECS,
            )?,
            allow_admin_signup: parse_or("AUTH_ALLOW_ADMIN_SIGNUP", true)?,
            password_hash_memory_kib: parse_or(
                "PASSWORD_HASH_MEMORY_KIB",
                DEFAULT_PASSWORD_HASH_MEMORY_KIB,
            )?,
            password_hash_iterations: parse_or(
                "PASSWORD_HASH_ITERATIONS",
                DEFAULT_PASSWORD_HASH_ITERATIONS,
            )?,
        })
    }
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" => Ok(Self::Postgres),
            _ => Err(()),
        }
    }
}

/// Read `key` and parse it, falling back to `default` when unset
fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
