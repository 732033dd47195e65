// ABOUTME: Employment status type definitions
// ABOUTME: Records, inputs, usage rows and validation rules for statuses

use chrono::{DateTime, Utc};
use memberdesk_core::{FieldRules, FieldValues, Rule};
use serde::{Deserialize, Serialize};

pub const EMPLOYMENT_STATUS_RULES: &[FieldRules] = &[
    FieldRules::new("name", &[Rule::Required, Rule::MaxLength(50), Rule::Unique]),
    FieldRules::new("description", &[Rule::MaxLength(255)]),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmploymentStatus {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmploymentStatusCreateInput {
    pub name: String,
    pub description: Option<String>,
    pub display_order: Option<i64>,
}

impl EmploymentStatusCreateInput {
    pub fn field_values(&self) -> FieldValues {
        vec![
            ("name", Some(self.name.clone())),
            ("description", self.description.clone()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmploymentStatusUpdateInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i64>,
    pub is_active: Option<bool>,
}

impl EmploymentStatusUpdateInput {
    pub fn field_values(&self) -> FieldValues {
        vec![
            ("name", self.name.clone()),
            ("description", self.description.clone()),
        ]
    }
}

/// How many members currently hold a status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUsage {
    pub id: i64,
    pub name: String,
    pub member_count: i64,
}
