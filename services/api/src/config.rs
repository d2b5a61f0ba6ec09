//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which `DatabaseService` implementation backs the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    Memory,
}

/// Session lifetimes beyond ten years are rejected before they reach date arithmetic.
const SESSION_TTL_DAYS_RANGE: RangeInclusive<i64> = 1..=3650;

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub store: StoreBackend,
    pub db_max_connections: u32,
    pub log_level: Level,
    pub cors_origin: String,
    pub session_ttl_days: i64,
    pub cookie_secure: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Store Settings ---
        let bind_address = parse_var("BIND_ADDRESS", "0.0.0.0:3000")?;

        let store = match var_or("STORE_BACKEND", "postgres").to_lowercase().as_str() {
            "postgres" => StoreBackend::Postgres {
                database_url: std::env::var("DATABASE_URL")
                    .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::InvalidValue(
                    "STORE_BACKEND".to_string(),
                    format!("'{}' is not one of postgres, memory", other),
                ))
            }
        };
        let db_max_connections = parse_var("DB_MAX_CONNECTIONS", "5")?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load HTTP / Cookie Settings ---
        let cors_origin = var_or("CORS_ORIGIN", "http://localhost:3000");
        let session_ttl_days =
            parse_var_in_range("SESSION_TTL_DAYS", "30", SESSION_TTL_DAYS_RANGE)?;
        let cookie_secure = parse_var("COOKIE_SECURE", "true")?;

        Ok(Self {
            bind_address,
            store,
            db_max_connections,
            log_level,
            cors_origin,
            session_ttl_days,
            cookie_secure,
        })
    }

    /// A configuration for in-process use, backed by the memory store.
    pub fn in_memory() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 0)),
            store: StoreBackend::Memory,
            db_max_connections: 1,
            log_level: Level::INFO,
            cors_origin: "http://localhost:3000".to_string(),
            session_ttl_days: 30,
            cookie_secure: false,
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var_or(name, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

fn parse_var_in_range<T>(
    name: &str,
    default: &str,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    let value: T = parse_var(name, default)?;
    if !range.contains(&value) {
        return Err(ConfigError::InvalidValue(
            name.to_string(),
            format!("{} is outside {}..={}", value, range.start(), range.end()),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ttl_outside_range_is_rejected() {
        for value in ["0", "-1", "9999999999999"] {
            let err = parse_var_in_range(
                "AFRILEAD_TEST_UNSET_TTL",
                value,
                SESSION_TTL_DAYS_RANGE,
            )
            .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue(ref name, _) if name == "AFRILEAD_TEST_UNSET_TTL")
            );
        }
        let days =
            parse_var_in_range("AFRILEAD_TEST_UNSET_TTL", "30", SESSION_TTL_DAYS_RANGE).unwrap();
        assert_eq!(days, 30);
    }

    #[test]
    fn parse_var_uses_default_when_unset() {
        let port: u32 = parse_var("AFRILEAD_TEST_UNSET_VARIABLE", "42").unwrap();
        assert_eq!(port, 42);
    }

    #[test]
    fn parse_var_reports_the_variable_name() {
        let err = parse_var::<bool>("AFRILEAD_TEST_UNSET_BOOL", "maybe").unwrap_err();
        assert!(err.to_string().contains("AFRILEAD_TEST_UNSET_BOOL"));
    }

    #[test]
    fn in_memory_config_uses_memory_store() {
        let config = Config::in_memory();
        assert_eq!(config.store, StoreBackend::Memory);
        assert!(!config.cookie_secure);
    }
}
