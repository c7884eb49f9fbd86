use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;

const DEV_AUTH_SECRET: &str = "rental-api-dev-secret";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub auth_secret: String,
    pub token_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: try_load("PORT", "8080")?,
            db_max_connections: try_load("DB_MAX_CONNECTIONS", "5")?,
            auth_secret: auth_secret()?,
            token_ttl_hours: try_load("TOKEN_TTL_HOURS", "24")?,
        })
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        log::debug!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value: raw,
    })
}

fn auth_secret() -> Result<String, ConfigError> {
    match env::var("AUTH_SECRET") {
        Ok(secret) if !secret.is_empty() => Ok(secret),
        _ if cfg!(debug_assertions) => {
            log::warn!("AUTH_SECRET not set, using the development secret");
            Ok(DEV_AUTH_SECRET.to_string())
        }
        _ => Err(ConfigError::Missing("AUTH_SECRET")),
    }
}
