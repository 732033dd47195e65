// ABOUTME: Tests for environment-driven database configuration
// ABOUTME: Covers defaults, overrides and invalid values

use memberdesk_config::constants::{
    MEMBERDESK_DATABASE_PATH, MEMBERDESK_DB_ACQUIRE_TIMEOUT_SECS, MEMBERDESK_DB_ENABLE_WAL,
    MEMBERDESK_DB_MAX_CONNECTIONS,
};
use memberdesk_config::{ConfigError, DatabaseConfig};
use rstest::rstest;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

fn clear_env() {
    env::remove_var(MEMBERDESK_DATABASE_PATH);
    env::remove_var(MEMBERDESK_DB_MAX_CONNECTIONS);
    env::remove_var(MEMBERDESK_DB_ACQUIRE_TIMEOUT_SECS);
    env::remove_var(MEMBERDESK_DB_ENABLE_WAL);
}

#[test]
#[serial]
fn test_config_from_env_defaults() {
    clear_env();

    let config = DatabaseConfig::from_env().unwrap();

    assert_eq!(config.path, memberdesk_core::database_file());
    assert_eq!(config.max_connections, 10);
    assert_eq!(config.acquire_timeout, Duration::from_secs(30));
    assert!(config.enable_wal);
}

#[test]
#[serial]
fn test_config_from_env_with_all_custom() {
    clear_env();
    env::set_var(MEMBERDESK_DATABASE_PATH, "/var/lib/memberdesk/test.db");
    env::set_var(MEMBERDESK_DB_MAX_CONNECTIONS, "4");
    env::set_var(MEMBERDESK_DB_ACQUIRE_TIMEOUT_SECS, "5");
    env::set_var(MEMBERDESK_DB_ENABLE_WAL, "false");

    let config = DatabaseConfig::from_env().unwrap();

    assert_eq!(config.path, PathBuf::from("/var/lib/memberdesk/test.db"));
    assert_eq!(config.max_connections, 4);
    assert_eq!(config.acquire_timeout, Duration::from_secs(5));
    assert!(!config.enable_wal);
    assert_eq!(config.url(), "sqlite:/var/lib/memberdesk/test.db");

    clear_env();
}

#[test]
#[serial]
fn test_config_zero_connections_rejected() {
    clear_env();
    env::set_var(MEMBERDESK_DB_MAX_CONNECTIONS, "0");

    let result = DatabaseConfig::from_env();

    assert!(matches!(result, Err(ConfigError::ZeroConnections(_))));

    clear_env();
}

#[rstest]
#[case(MEMBERDESK_DB_MAX_CONNECTIONS, "many")]
#[case(MEMBERDESK_DB_ACQUIRE_TIMEOUT_SECS, "-3")]
#[serial]
fn test_config_invalid_number(#[case] var: &str, #[case] value: &str) {
    clear_env();
    env::set_var(var, value);

    let result = DatabaseConfig::from_env();

    assert!(matches!(result, Err(ConfigError::InvalidNumber(name, _)) if name == var));

    clear_env();
}

#[test]
#[serial]
fn test_config_invalid_wal_flag() {
    clear_env();
    env::set_var(MEMBERDESK_DB_ENABLE_WAL, "sometimes");

    let result = DatabaseConfig::from_env();

    assert!(matches!(result, Err(ConfigError::InvalidBoolean(_, ref v)) if v == "sometimes"));

    clear_env();
}

#[test]
fn test_config_at_keeps_pool_defaults() {
    let config = DatabaseConfig::at("/tmp/other.db");

    assert_eq!(config.path, PathBuf::from("/tmp/other.db"));
    assert_eq!(config.max_connections, 10);
    assert!(config.enable_wal);
}
