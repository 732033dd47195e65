// ABOUTME: Login log type definitions
// ABOUTME: Records, attempts, filters and validation rules for login logs

use chrono::{DateTime, Utc};
use memberdesk_core::{FieldRules, FieldValues, Rule};
use serde::{Deserialize, Serialize};

pub const LOGIN_LOG_RULES: &[FieldRules] = &[
    FieldRules::new("username", &[Rule::Required, Rule::MaxLength(100)]),
    FieldRules::new("ip_address", &[Rule::Required, Rule::MaxLength(45)]),
    FieldRules::new("user_agent", &[Rule::MaxLength(500)]),
];

/// Risk scores run from 0 (benign) to this value
pub const MAX_RISK_SCORE: i64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub username: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub success: bool,
    pub failure_reason: Option<String>,
    pub risk_score: i64,
    pub is_suspicious: bool,
    pub created_at: DateTime<Utc>,
}

/// A login attempt to append to the trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginAttempt {
    /// Unknown when the username did not resolve to an account
    pub user_id: Option<i64>,
    pub username: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub success: bool,
    pub failure_reason: Option<String>,
}

impl LoginAttempt {
    pub fn field_values(&self) -> FieldValues {
        vec![
            ("username", Some(self.username.clone())),
            ("ip_address", Some(self.ip_address.clone())),
            ("user_agent", self.user_agent.clone()),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginLogFilter {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub success: Option<bool>,
    pub suspicious_only: bool,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
