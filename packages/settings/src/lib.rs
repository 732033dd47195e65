// ABOUTME: Typed key/value settings store
// ABOUTME: Values persist as text plus a type tag and are cast back on read

pub mod storage;
pub mod types;
pub mod value;

pub use storage::SettingsStorage;
pub use types::{GroupedSettings, Setting, SettingsMap};
pub use value::{SettingType, SettingValue};
