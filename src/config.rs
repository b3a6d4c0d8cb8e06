use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::auth::MAX_SESSION_TIMEOUT_SECONDS;

/// Longest accepted failed-login window (one day)
const MAX_AUTH_WINDOW_SECONDS: i64 = 86_400;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Bind address (0.0.0.0 for LAN, 127.0.0.1 for localhost)
    pub bind_addr: String,
    /// SQLite database URL
    pub database_url: String,
    /// Maximum pooled database connections
    pub database_max_connections: u32,
    /// Session timeout in seconds
    pub session_timeout_seconds: u64,
    /// Failed authentication attempts allowed per IP within the window
    pub auth_max_failed_attempts: u32,
    /// Rate limit window in seconds
    pub auth_window_seconds: i64,
    /// CORS allowed origins (comma-separated in env var)
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_max_connections =
            parse_in(&lookup, "DATABASE_MAX_CONNECTIONS", 5, 1..=u32::MAX)?;
        let auth_max_failed_attempts =
            parse_in(&lookup, "AUTH_MAX_FAILED_ATTEMPTS", 10, 1..=u32::MAX)?;
        // 24 hours
        let session_timeout_seconds = parse_in(
            &lookup,
            "SESSION_TIMEOUT_SECONDS",
            86_400,
            1..=MAX_SESSION_TIMEOUT_SECONDS,
        )?;
        let auth_window_seconds =
            parse_in(&lookup, "AUTH_WINDOW_SECONDS", 60, 1..=MAX_AUTH_WINDOW_SECONDS)?;

        Ok(Self {
            port: lookup("GEOOBRA_PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            bind_addr: lookup("GEOOBRA_BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string()),
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://geoobra.db".to_string()),
            database_max_connections,
            session_timeout_seconds,
            auth_max_failed_attempts,
            auth_window_seconds,
            cors_origins: lookup("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| {
                    vec![
                        "http://localhost:3000".to_string(),
                        "http://127.0.0.1:3000".to_string(),
                    ]
                }),
        })
    }

    /// Get the full bind address (addr:port)
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Parse `key` when set, falling back to `default`; the value must lie in `range`
fn parse_in<F, T>(lookup: &F, key: &str, default: T, range: RangeInclusive<T>) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Display,
{
    let value = match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            ConfigError::InvalidValue(format!("{} has an invalid value: {}", key, raw))
        })?,
        None => default,
    };

    if !range.contains(&value) {
        return Err(ConfigError::InvalidValue(format!(
            "{} must be between {} and {}",
            key,
            range.start(),
            range.end()
        )));
    }
    Ok(value)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}
