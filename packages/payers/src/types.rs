// ABOUTME: Payer type definitions
// ABOUTME: Records, inputs, filters and validation rules for payers

use chrono::{DateTime, Utc};
use memberdesk_core::{FieldRules, FieldValues, Rule};
use serde::{Deserialize, Serialize};

pub const PAYER_RULES: &[FieldRules] = &[
    FieldRules::new(
        "name",
        &[Rule::Required, Rule::MinLength(2), Rule::MaxLength(150), Rule::Unique],
    ),
    FieldRules::new("contact_email", &[Rule::MaxLength(255), Rule::Email]),
];

/// Values are checked in the form they are stored
fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payer {
    pub id: i64,
    pub name: String,
    pub contact_email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayerCreateInput {
    pub name: String,
    pub contact_email: Option<String>,
}

impl PayerCreateInput {
    pub fn field_values(&self) -> FieldValues {
        vec![
            ("name", Some(self.name.trim().to_string())),
            ("contact_email", trimmed(self.contact_email.as_deref())),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayerUpdateInput {
    pub name: Option<String>,
    pub contact_email: Option<String>,
}

impl PayerUpdateInput {
    pub fn field_values(&self) -> FieldValues {
        vec![
            ("name", trimmed(self.name.as_deref())),
            ("contact_email", trimmed(self.contact_email.as_deref())),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct PayerFilter {
    /// Substring match on name or contact email
    pub search: Option<String>,
    pub active_only: bool,
}
