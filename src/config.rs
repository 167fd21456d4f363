//! Server configuration parsed from environment variables.
//!
//! Read once at startup. `main` loads `.env` (if present) before calling
//! [`AppConfig::from_env`].

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_NOTIFY_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
    #[error("unsupported BULK_UPDATE_MODE '{0}' (expected 'sequential' or 'atomic')")]
    InvalidBulkUpdateMode(String),
}

/// How a bulk update behaves when an id in the middle of the batch is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BulkUpdateMode {
    /// Apply entries one by one; entries before the failure stay committed.
    #[default]
    Sequential,
    /// Apply all entries or none.
    Atomic,
}

impl BulkUpdateMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Atomic => "atomic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Postgres URL. `None` selects the in-memory board store.
    pub database_url: Option<String>,
    pub port: u16,
    pub db_max_connections: u32,
    /// Buffered notifications per subscriber before the slowest ones lag.
    pub notify_channel_capacity: usize,
    pub bulk_update_mode: BulkUpdateMode,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `DATABASE_URL`: unset or blank selects the in-memory store
    /// - `PORT`: default 3000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `NOTIFY_CHANNEL_CAPACITY`: default 256, minimum 1
    /// - `BULK_UPDATE_MODE`: `sequential` (default) or `atomic`
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` or `BULK_UPDATE_MODE` is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let port = parse_port(std::env::var("PORT").ok().as_deref())?;
        let bulk_update_mode = parse_bulk_update_mode(std::env::var("BULK_UPDATE_MODE").ok().as_deref())?;

        Ok(Self {
            database_url,
            port,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            notify_channel_capacity: env_parse("NOTIFY_CHANNEL_CAPACITY", DEFAULT_NOTIFY_CHANNEL_CAPACITY).max(1),
            bulk_update_mode,
        })
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    match raw {
        None => Ok(DEFAULT_PORT),
        Some(value) => value
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(value.to_owned())),
    }
}

fn parse_bulk_update_mode(raw: Option<&str>) -> Result<BulkUpdateMode, ConfigError> {
    match raw.map(str::trim).unwrap_or("sequential") {
        "sequential" | "" => Ok(BulkUpdateMode::Sequential),
        "atomic" => Ok(BulkUpdateMode::Atomic),
        other => Err(ConfigError::InvalidBulkUpdateMode(other.to_owned())),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
