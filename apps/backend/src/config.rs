//! Environment-driven configuration.

use std::time::Duration;

use crate::error::{ApiError, Result};

const DEFAULT_LEXICAL_API_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub lexical_api_url: String,
    pub lexical_max_elapsed: Duration,
    pub db_max_connections: u32,
}

impl Config {
    /// Build configuration from environment variables.
    ///
    /// Required env vars:
    /// - DATABASE_URL: PostgreSQL connection string
    ///
    /// Optional env vars:
    /// - HOST, PORT: bind address (default 0.0.0.0:3000)
    /// - APP_ENV: environment label (default "production")
    /// - LEXICAL_API_URL: dictionary endpoint the word is appended to
    /// - LEXICAL_MAX_ELAPSED_SECS: retry budget per lookup (default 60)
    /// - DB_MAX_CONNECTIONS: pool size (default 10)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            get("DATABASE_URL").ok_or_else(|| ApiError::Config("DATABASE_URL must be set".to_string()))?;

        Ok(Self {
            database_url,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 3000)?,
            environment: get("APP_ENV").unwrap_or_else(|| "production".to_string()),
            lexical_api_url: get("LEXICAL_API_URL")
                .unwrap_or_else(|| DEFAULT_LEXICAL_API_URL.to_string()),
            lexical_max_elapsed: Duration::from_secs(parse_or(&get, "LEXICAL_MAX_ELAPSED_SECS", 60)?),
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 10)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ApiError::Config(format!("{key} is not a valid number: {raw}"))),
        None => Ok(default),
    }
}
