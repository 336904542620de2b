use dotenvy::dotenv;
use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Where conversations, profiles and identities are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(AppError::Config(format!(
                "STORAGE_BACKEND must be 'postgres' or 'memory', got '{other}'"
            ))),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub storage_backend: StorageBackend,
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("storage_backend", &self.storage_backend)
            .field("database_url", &db_pool::redact_url(&self.database_url))
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_ttl_hours", &self.jwt_ttl_hours)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Postgres,
        };

        let database_url = lookup("DATABASE_URL").unwrap_or_default();
        if storage_backend == StorageBackend::Postgres && database_url.is_empty() {
            return Err(AppError::Config(
                "DATABASE_URL is required when STORAGE_BACKEND=postgres".into(),
            ));
        }

        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|e| AppError::Config(format!("invalid PORT '{value}': {e}")))?,
            None => 8000,
        };

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| AppError::Config("JWT_SECRET is required".into()))?;
        if jwt_secret.len() < crypto_core::jwt::MIN_SECRET_LENGTH {
            return Err(AppError::Config(format!(
                "JWT_SECRET must be at least {} bytes",
                crypto_core::jwt::MIN_SECRET_LENGTH
            )));
        }

        let jwt_ttl_hours = match lookup("JWT_TTL_HOURS") {
            Some(value) => value
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .ok_or_else(|| AppError::Config(format!("invalid JWT_TTL_HOURS '{value}'")))?,
            None => 24,
        };

        Ok(Config {
            storage_backend,
            database_url,
            port,
            jwt_secret,
            jwt_ttl_hours,
        })
    }
}
