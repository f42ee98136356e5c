//! Runtime settings from the environment (with `.env` support).

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/student_records";
pub const DEFAULT_LOG_FILTER: &str = "student_records=info,tower_http=info";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// Role assigned when a payload omits `roleId`.
    pub default_role_id: i64,
    pub body_limit_bytes: usize,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: DEFAULT_DATABASE_URL.into(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_connections: 5,
            default_role_id: 1,
            body_limit_bytes: 64 * 1024,
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();
        Ok(AppConfig {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: parsed(&lookup, "BIND_ADDR")?.unwrap_or(defaults.bind_addr),
            max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS")?.unwrap_or(defaults.max_connections),
            default_role_id: parsed(&lookup, "DEFAULT_ROLE_ID")?.unwrap_or(defaults.default_role_id),
            body_limit_bytes: parsed(&lookup, "BODY_LIMIT_BYTES")?.unwrap_or(defaults.body_limit_bytes),
            log_filter: lookup("LOG_FILTER").unwrap_or(defaults.log_filter),
        })
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}
