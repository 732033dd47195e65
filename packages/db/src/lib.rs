// ABOUTME: Database connection management and storage initialization
// ABOUTME: Provides shared access to the SQLite pool and every storage layer

mod logging;

use std::sync::Arc;

use memberdesk_audit::LoginLogStorage;
use memberdesk_config::{ConfigError, DatabaseConfig};
use memberdesk_districts::DistrictStorage;
use memberdesk_employment::EmploymentStatusStorage;
use memberdesk_imports::ImportLogStorage;
use memberdesk_payers::PayerStorage;
use memberdesk_settings::SettingsStorage;
use memberdesk_storage::StorageError;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;

pub use logging::init_tracing;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Shared database state for callers that need several storages
#[derive(Clone)]
pub struct DbState {
    pub pool: SqlitePool,
    pub settings_storage: Arc<SettingsStorage>,
    pub district_storage: Arc<DistrictStorage>,
    pub employment_storage: Arc<EmploymentStatusStorage>,
    pub payer_storage: Arc<PayerStorage>,
    pub import_log_storage: Arc<ImportLogStorage>,
    pub login_log_storage: Arc<LoginLogStorage>,
}

impl DbState {
    /// Create database state on an already-migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            settings_storage: Arc::new(SettingsStorage::new(pool.clone())),
            district_storage: Arc::new(DistrictStorage::new(pool.clone())),
            employment_storage: Arc::new(EmploymentStatusStorage::new(pool.clone())),
            payer_storage: Arc::new(PayerStorage::new(pool.clone())),
            import_log_storage: Arc::new(ImportLogStorage::new(pool.clone())),
            login_log_storage: Arc::new(LoginLogStorage::new(pool.clone())),
            pool,
        }
    }

    /// Connect with `config` and apply the schema
    pub async fn init(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let pool = memberdesk_storage::connect(config).await?;
        debug!("Database state initialized at {}", config.path.display());
        Ok(Self::new(pool))
    }

    /// Connect using `MEMBERDESK_*` environment configuration
    pub async fn init_from_env() -> Result<Self, DbError> {
        let config = DatabaseConfig::from_env()?;
        Ok(Self::init(&config).await?)
    }

    /// Fresh in-memory database, for tests and throwaway tooling
    pub async fn in_memory() -> Result<Self, StorageError> {
        let pool = memberdesk_storage::connect_in_memory().await?;
        Ok(Self::new(pool))
    }
}
