// ABOUTME: Login audit trail
// ABOUTME: Append-only login attempts with failure counting and risk flags

pub mod storage;
pub mod types;

pub use storage::LoginLogStorage;
pub use types::{LoginAttempt, LoginLog, LoginLogFilter, LOGIN_LOG_RULES, MAX_RISK_SCORE};
