// ABOUTME: Shared persistence layer for Memberdesk
// ABOUTME: Storage error type, SQLite pool setup, schema and uniqueness checks

use memberdesk_core::ValidationError;
use thiserror::Error;

pub mod pool;
pub mod unique;

pub use pool::{connect, connect_in_memory, run_migrations};
pub use unique::ensure_unique;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl From<ValidationError> for StorageError {
    fn from(err: ValidationError) -> Self {
        StorageError::Validation(err.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// SQLite stores booleans as 0/1 integers
pub fn bool_from_int(value: i64) -> bool {
    value != 0
}

/// Escape `%`, `_` and `\` so `text` matches literally inside a LIKE pattern
/// declared with `ESCAPE '\'`
pub fn like_contains(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
