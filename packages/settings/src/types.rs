// ABOUTME: Type definitions for stored settings
// ABOUTME: Raw setting rows and the grouped map shapes returned by the store

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::{SettingType, SettingValue};

/// A setting row as stored, before decoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub id: i64,
    pub namespace: String,
    pub key: String,
    pub value: String,
    /// Raw tag text; may be a tag this version does not recognize
    #[serde(rename = "type")]
    pub value_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Setting {
    pub fn setting_type(&self) -> SettingType {
        SettingType::from_tag(&self.value_type)
    }

    pub fn decoded(&self) -> SettingValue {
        SettingValue::decode(&self.value, self.setting_type())
    }
}

/// Decoded settings of one namespace, keyed by setting key
pub type SettingsMap = BTreeMap<String, SettingValue>;

/// Decoded settings keyed by namespace, then key
pub type GroupedSettings = BTreeMap<String, SettingsMap>;
