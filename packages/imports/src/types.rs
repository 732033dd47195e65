// ABOUTME: Import log type definitions
// ABOUTME: Run status, per-row error detail, outcomes, filters and aggregate stats

use chrono::{DateTime, Utc};
use memberdesk_core::{FieldRules, FieldValues, Rule, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const IMPORT_STATUSES: &[&str] = &["processing", "completed", "failed"];

pub const IMPORT_LOG_RULES: &[FieldRules] = &[
    FieldRules::new("file_name", &[Rule::Required, Rule::MaxLength(255)]),
    FieldRules::new("import_type", &[Rule::Required, Rule::MaxLength(50)]),
    FieldRules::new("status", &[Rule::Required, Rule::OneOf(IMPORT_STATUSES)]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Processing,
    Completed,
    Failed,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                value: s.to_string(),
                allowed: IMPORT_STATUSES.join(", "),
            }),
        }
    }
}

/// One problem found while importing; `row` is `None` for run-level failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRowError {
    pub row: Option<i64>,
    pub message: String,
}

impl ImportRowError {
    pub fn at_row(row: i64, message: impl Into<String>) -> Self {
        Self {
            row: Some(row),
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self {
            row: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportLog {
    pub id: i64,
    pub file_name: String,
    pub import_type: String,
    pub status: ImportStatus,
    pub total_rows: i64,
    pub success_count: i64,
    pub failure_count: i64,
    pub duplicate_count: i64,
    pub errors: Vec<ImportRowError>,
    pub imported_by: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportLogCreateInput {
    pub file_name: String,
    pub import_type: String,
    pub imported_by: Option<String>,
}

impl ImportLogCreateInput {
    pub fn field_values(&self) -> FieldValues {
        vec![
            ("file_name", Some(self.file_name.clone())),
            ("import_type", Some(self.import_type.clone())),
            ("status", Some(ImportStatus::Processing.as_str().to_string())),
        ]
    }
}

/// Final counters for a finished run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub total_rows: i64,
    pub success_count: i64,
    pub failure_count: i64,
    pub duplicate_count: i64,
    pub errors: Vec<ImportRowError>,
}

#[derive(Debug, Clone, Default)]
pub struct ImportLogFilter {
    pub status: Option<ImportStatus>,
    pub import_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    pub total_imports: i64,
    pub processing: i64,
    pub completed: i64,
    pub failed: i64,
    pub total_rows: i64,
    pub success_count: i64,
    pub failure_count: i64,
    pub duplicate_count: i64,
}
