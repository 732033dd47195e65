// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Memberdesk

// Database Configuration
pub const MEMBERDESK_DATABASE_PATH: &str = "MEMBERDESK_DATABASE_PATH";
pub const MEMBERDESK_DB_MAX_CONNECTIONS: &str = "MEMBERDESK_DB_MAX_CONNECTIONS";
pub const MEMBERDESK_DB_ACQUIRE_TIMEOUT_SECS: &str = "MEMBERDESK_DB_ACQUIRE_TIMEOUT_SECS";
pub const MEMBERDESK_DB_ENABLE_WAL: &str = "MEMBERDESK_DB_ENABLE_WAL";

// Logging
pub const RUST_LOG: &str = "RUST_LOG";
