// ABOUTME: Integration tests for pool setup and the embedded schema
// ABOUTME: Verifies file-backed connections, table creation and uniqueness checks

use memberdesk_config::DatabaseConfig;
use memberdesk_core::{FieldRules, Rule};
use memberdesk_storage::{connect, connect_in_memory, ensure_unique, run_migrations, StorageError};
use sqlx::Row;
use tempfile::TempDir;

const PAYER_RULES: &[FieldRules] = &[FieldRules::new("name", &[Rule::Required, Rule::Unique])];

#[tokio::test]
async fn test_connect_creates_database_file_and_directory() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("memberdesk.db");
    let config = DatabaseConfig::at(&path);

    let pool = connect(&config).await.unwrap();

    assert!(path.exists(), "database file should be created");

    let journal_mode: String = sqlx::query_scalar("PRAGMA journal_mode")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(journal_mode.to_lowercase(), "wal");

    let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(foreign_keys, 1);
}

#[tokio::test]
async fn test_all_tables_created() {
    let pool = connect_in_memory().await.unwrap();

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for required in [
        "districts",
        "employment_statuses",
        "import_logs",
        "login_logs",
        "members",
        "payers",
        "settings",
    ] {
        assert!(
            tables.iter().any(|t| t == required),
            "missing table {}",
            required
        );
    }
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let pool = connect_in_memory().await.unwrap();

    run_migrations(&pool).await.unwrap();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn test_settings_pair_is_unique_at_storage_layer() {
    let pool = connect_in_memory().await.unwrap();

    sqlx::query("INSERT INTO settings (class, key, value, type) VALUES ('mail', 'host', 'a', 'string')")
        .execute(&pool)
        .await
        .unwrap();

    let duplicate = sqlx::query(
        "INSERT INTO settings (class, key, value, type) VALUES ('mail', 'host', 'b', 'string')",
    )
    .execute(&pool)
    .await;
    assert!(duplicate.is_err());

    let row = sqlx::query("SELECT COUNT(*) AS count FROM settings")
        .fetch_one(&pool)
        .await
        .unwrap();
    let count: i64 = row.try_get("count").unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_ensure_unique_detects_collisions() {
    let pool = connect_in_memory().await.unwrap();

    sqlx::query("INSERT INTO payers (name) VALUES ('City Council')")
        .execute(&pool)
        .await
        .unwrap();

    let taken = vec![("name", Some("City Council".to_string()))];
    let result = ensure_unique(&pool, "payers", PAYER_RULES, &taken, None).await;
    match result {
        Err(StorageError::Validation(msg)) => assert!(msg.contains("already taken")),
        other => panic!("Expected Validation error, got {:?}", other),
    }

    // The row itself may keep its own name
    let own_id: i64 = sqlx::query_scalar("SELECT id FROM payers WHERE name = 'City Council'")
        .fetch_one(&pool)
        .await
        .unwrap();
    ensure_unique(&pool, "payers", PAYER_RULES, &taken, Some(own_id))
        .await
        .unwrap();

    let free = vec![("name", Some("County Board".to_string()))];
    ensure_unique(&pool, "payers", PAYER_RULES, &free, None)
        .await
        .unwrap();

    let absent = vec![("name", None)];
    ensure_unique(&pool, "payers", PAYER_RULES, &absent, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_column_default_timestamps_are_utc() {
    let pool = connect_in_memory().await.unwrap();

    sqlx::query("INSERT INTO members (full_name) VALUES ('Ada')")
        .execute(&pool)
        .await
        .unwrap();

    let drift_secs: f64 = sqlx::query_scalar(
        "SELECT ABS(julianday('now') - julianday(created_at)) * 86400.0 FROM members",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    assert!(drift_secs < 60.0, "default timestamp drifted {drift_secs}s from UTC now");
}
