// ABOUTME: Filesystem locations for Memberdesk data
// ABOUTME: Data directory and default database file path

use std::env;
use std::path::PathBuf;

/// File name of the SQLite database inside the data directory
pub const DATABASE_FILE_NAME: &str = "memberdesk.db";

/// Get the path to the Memberdesk directory (~/.memberdesk)
pub fn memberdesk_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".memberdesk")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".memberdesk")
    }
}

/// Get the default database path (~/.memberdesk/memberdesk.db)
pub fn database_file() -> PathBuf {
    memberdesk_dir().join(DATABASE_FILE_NAME)
}
