// ABOUTME: Database configuration loaded from the environment
// ABOUTME: Pool size, acquire timeout, WAL mode and database path

use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::constants::{
    MEMBERDESK_DATABASE_PATH, MEMBERDESK_DB_ACQUIRE_TIMEOUT_SECS, MEMBERDESK_DB_ENABLE_WAL,
    MEMBERDESK_DB_MAX_CONNECTIONS,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid number for {0}: {1}")]
    InvalidNumber(&'static str, ParseIntError),
    #[error("{0} must be at least 1")]
    ZeroConnections(&'static str),
    #[error("Invalid boolean for {0}: {1}. Must be 'true' or 'false'")]
    InvalidBoolean(&'static str, String),
}

/// Connection settings for the SQLite database
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub enable_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: memberdesk_core::database_file(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
            enable_wal: true,
        }
    }
}

impl DatabaseConfig {
    /// Config for a database at `path` with default pool settings
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let path = env::var(MEMBERDESK_DATABASE_PATH)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.path);

        let max_connections = match env::var(MEMBERDESK_DB_MAX_CONNECTIONS) {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|e| ConfigError::InvalidNumber(MEMBERDESK_DB_MAX_CONNECTIONS, e))?,
            Err(_) => defaults.max_connections,
        };

        if max_connections == 0 {
            return Err(ConfigError::ZeroConnections(MEMBERDESK_DB_MAX_CONNECTIONS));
        }

        let acquire_timeout = match env::var(MEMBERDESK_DB_ACQUIRE_TIMEOUT_SECS) {
            Ok(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(|e| {
                ConfigError::InvalidNumber(MEMBERDESK_DB_ACQUIRE_TIMEOUT_SECS, e)
            })?),
            Err(_) => defaults.acquire_timeout,
        };

        let enable_wal = match env::var(MEMBERDESK_DB_ENABLE_WAL) {
            Ok(raw) => match raw.trim().to_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(ConfigError::InvalidBoolean(MEMBERDESK_DB_ENABLE_WAL, raw)),
            },
            Err(_) => defaults.enable_wal,
        };

        let config = Self {
            path,
            max_connections,
            acquire_timeout,
            enable_wal,
        };

        debug!("Loaded database config: {:?}", config);

        Ok(config)
    }

    /// sqlx connection URL for this database file
    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}
