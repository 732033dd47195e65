// ABOUTME: District type definitions
// ABOUTME: Records, inputs, filters and validation rules for districts

use chrono::{DateTime, Utc};
use memberdesk_core::{FieldRules, FieldValues, Rule};
use serde::{Deserialize, Serialize};

/// Validation rules for district columns. Name uniqueness is per region and
/// is checked by the storage layer.
pub const DISTRICT_RULES: &[FieldRules] = &[
    FieldRules::new("region_id", &[Rule::Required]),
    FieldRules::new("name", &[Rule::Required, Rule::MinLength(2), Rule::MaxLength(100)]),
    FieldRules::new("code", &[Rule::MaxLength(20)]),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct District {
    pub id: i64,
    pub region_id: i64,
    pub name: String,
    pub code: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistrictCreateInput {
    pub region_id: i64,
    pub name: String,
    pub code: Option<String>,
}

impl DistrictCreateInput {
    pub fn field_values(&self) -> FieldValues {
        vec![
            ("region_id", Some(self.region_id.to_string())),
            ("name", Some(self.name.trim().to_string())),
            ("code", self.code.clone()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistrictUpdateInput {
    pub region_id: Option<i64>,
    pub name: Option<String>,
    pub code: Option<String>,
}

impl DistrictUpdateInput {
    pub fn field_values(&self) -> FieldValues {
        vec![
            ("region_id", self.region_id.map(|id| id.to_string())),
            ("name", self.name.as_deref().map(|n| n.trim().to_string())),
            ("code", self.code.clone()),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct DistrictFilter {
    pub region_id: Option<i64>,
    /// Substring match on the district name
    pub search: Option<String>,
    pub active_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `(id, name)` pair for select boxes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownOption {
    pub id: i64,
    pub name: String,
}
