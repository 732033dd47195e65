// ABOUTME: Tests for shared database state initialization
// ABOUTME: Covers file-backed init, env configuration and cross-storage sharing

use memberdesk_config::constants::{
    MEMBERDESK_DATABASE_PATH, MEMBERDESK_DB_MAX_CONNECTIONS, RUST_LOG,
};
use memberdesk_config::DatabaseConfig;
use memberdesk_db::{init_tracing, DbError, DbState};
use memberdesk_districts::DistrictCreateInput;
use serial_test::serial;
use tempfile::TempDir;

#[tokio::test]
async fn test_storages_share_one_database() {
    let state = DbState::in_memory().await.unwrap();

    state
        .settings_storage
        .set("mail", "host", "smtp.example.com", None)
        .await
        .unwrap();
    state
        .district_storage
        .create(DistrictCreateInput {
            region_id: 1,
            name: "Harbour".to_string(),
            code: None,
        })
        .await
        .unwrap();

    let settings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM settings")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    let districts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM districts")
        .fetch_one(&state.pool)
        .await
        .unwrap();

    assert_eq!(settings, 1);
    assert_eq!(districts, 1);
}

#[tokio::test]
async fn test_init_creates_database_file() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("memberdesk.db");

    let state = DbState::init(&DatabaseConfig::at(&db_path)).await.unwrap();

    assert!(db_path.exists());
    assert_eq!(state.payer_storage.count(false).await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_init_from_env() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("env.db");

    std::env::set_var(MEMBERDESK_DATABASE_PATH, &db_path);
    std::env::remove_var(MEMBERDESK_DB_MAX_CONNECTIONS);

    let state = DbState::init_from_env().await.unwrap();
    assert!(db_path.exists());
    assert_eq!(state.import_log_storage.stats().await.unwrap().total_imports, 0);

    std::env::remove_var(MEMBERDESK_DATABASE_PATH);
}

#[tokio::test]
#[serial]
async fn test_init_from_env_rejects_bad_config() {
    std::env::set_var(MEMBERDESK_DB_MAX_CONNECTIONS, "many");

    let result = DbState::init_from_env().await;
    assert!(matches!(result, Err(DbError::Config(_))));

    std::env::remove_var(MEMBERDESK_DB_MAX_CONNECTIONS);
}

#[test]
#[serial]
fn test_init_tracing_is_repeatable() {
    std::env::set_var(RUST_LOG, "memberdesk=debug");

    init_tracing();
    init_tracing();
    tracing::debug!("subscriber installed");

    std::env::remove_var(RUST_LOG);
}
