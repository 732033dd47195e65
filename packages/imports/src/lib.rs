// ABOUTME: Import log records for bulk member imports
// ABOUTME: Tracks each run from start to completion or failure

pub mod storage;
pub mod types;

pub use storage::ImportLogStorage;
pub use types::{
    ImportLog, ImportLogCreateInput, ImportLogFilter, ImportOutcome, ImportRowError, ImportStats,
    ImportStatus, IMPORT_LOG_RULES,
};
