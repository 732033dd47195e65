// ABOUTME: Environment-driven configuration for Memberdesk
// ABOUTME: Database connection settings and environment variable names

pub mod constants;
pub mod database;

pub use database::{ConfigError, DatabaseConfig};
