// ABOUTME: Core constants and validation for Memberdesk
// ABOUTME: Foundational package shared by every storage package

pub mod constants;
pub mod validation;

// Re-export constants
pub use constants::{database_file, memberdesk_dir, DATABASE_FILE_NAME};

// Re-export validation
pub use validation::{
    validate_fields, FieldRules, FieldValues, Rule, ValidationError, ValidationMode,
};
