use std::env;
use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::SecurityHeaders;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_JWT_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            port: parse_or("PORT", DEFAULT_PORT)?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl_hours: parse_or("JWT_TTL_HOURS", DEFAULT_JWT_TTL_HOURS)?,
            production: env::var("RUST_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn parse_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        Err(_) => {
            tracing::debug!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_falls_back_to_default() {
        std::env::remove_var("POOLPASS_TEST_UNSET_PORT");
        let port: u16 = parse_or("POOLPASS_TEST_UNSET_PORT", 5000).unwrap();
        assert_eq!(port, 5000);
    }

    #[test]
    fn test_parse_or_rejects_garbage() {
        std::env::set_var("POOLPASS_TEST_BAD_PORT", "not-a-port");
        let result: Result<u16, _> = parse_or("POOLPASS_TEST_BAD_PORT", 5000);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                key: "POOLPASS_TEST_BAD_PORT",
                ..
            })
        ));
    }

    #[test]
    fn test_required_rejects_blank() {
        std::env::set_var("POOLPASS_TEST_BLANK_SECRET", "   ");
        assert!(matches!(
            required("POOLPASS_TEST_BLANK_SECRET"),
            Err(ConfigError::Missing("POOLPASS_TEST_BLANK_SECRET"))
        ));
    }
}
