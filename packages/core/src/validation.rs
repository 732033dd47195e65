// ABOUTME: Field-level validation rules shared by all record storages
// ABOUTME: Declarative rule tables checked before rows are written

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(String),

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("Invalid {field} value: {value}. Must be one of: {allowed}")]
    NotAllowed {
        field: String,
        value: String,
        allowed: String,
    },

    #[error("Invalid email address for {field}: {value}")]
    InvalidEmail { field: String, value: String },

    #[error("{field} '{value}' is already taken")]
    Duplicate { field: String, value: String },
}

/// A single constraint on one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    OneOf(&'static [&'static str]),
    Email,
    /// Checked against the database by the storage layer, not here
    Unique,
}

/// Rules declared for one column
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

impl FieldRules {
    pub const fn new(field: &'static str, rules: &'static [Rule]) -> Self {
        Self { field, rules }
    }

    pub fn is_unique(&self) -> bool {
        self.rules.contains(&Rule::Unique)
    }
}

/// Field values extracted from an input, `None` meaning "not provided"
pub type FieldValues = Vec<(&'static str, Option<String>)>;

/// Whether missing fields count as violations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every `Required` field must be present and non-blank
    Create,
    /// Absent fields are left untouched; provided ones must still be valid
    Update,
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"))
}

/// Check `values` against a rule table, returning the first violation.
///
/// Fields without a rule entry are accepted as-is. `Rule::Unique` is skipped
/// here since it needs a database round-trip.
pub fn validate_fields(
    rules: &[FieldRules],
    values: &[(&'static str, Option<String>)],
    mode: ValidationMode,
) -> Result<(), ValidationError> {
    for field_rules in rules {
        let value = values
            .iter()
            .find(|(name, _)| *name == field_rules.field)
            .and_then(|(_, value)| value.as_deref());

        validate_field(field_rules, value, mode)?;
    }

    Ok(())
}

fn validate_field(
    field_rules: &FieldRules,
    value: Option<&str>,
    mode: ValidationMode,
) -> Result<(), ValidationError> {
    let field = field_rules.field;

    let value = match value {
        Some(v) => v,
        None => {
            if mode == ValidationMode::Create && field_rules.rules.contains(&Rule::Required) {
                return Err(ValidationError::Required(field.to_string()));
            }
            return Ok(());
        }
    };

    let blank = value.trim().is_empty();

    for rule in field_rules.rules {
        match rule {
            Rule::Required => {
                if blank {
                    return Err(ValidationError::Required(field.to_string()));
                }
            }
            // Optional fields left blank skip the remaining checks
            _ if blank => {}
            Rule::MinLength(min) => {
                if value.chars().count() < *min {
                    return Err(ValidationError::TooShort {
                        field: field.to_string(),
                        min: *min,
                    });
                }
            }
            Rule::MaxLength(max) => {
                if value.chars().count() > *max {
                    return Err(ValidationError::TooLong {
                        field: field.to_string(),
                        max: *max,
                    });
                }
            }
            Rule::OneOf(allowed) => {
                if !allowed.contains(&value) {
                    return Err(ValidationError::NotAllowed {
                        field: field.to_string(),
                        value: value.to_string(),
                        allowed: allowed.join(", "),
                    });
                }
            }
            Rule::Email => {
                if !email_regex().is_match(value) {
                    return Err(ValidationError::InvalidEmail {
                        field: field.to_string(),
                        value: value.to_string(),
                    });
                }
            }
            Rule::Unique => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const RULES: &[FieldRules] = &[
        FieldRules::new(
            "name",
            &[Rule::Required, Rule::MinLength(2), Rule::MaxLength(10), Rule::Unique],
        ),
        FieldRules::new("email", &[Rule::MaxLength(40), Rule::Email]),
        FieldRules::new("status", &[Rule::Required, Rule::OneOf(&["open", "closed"])]),
    ];

    fn values(name: Option<&str>, email: Option<&str>, status: Option<&str>) -> FieldValues {
        vec![
            ("name", name.map(String::from)),
            ("email", email.map(String::from)),
            ("status", status.map(String::from)),
        ]
    }

    #[test]
    fn test_valid_input_passes() {
        let input = values(Some("Acme"), Some("ops@acme.example"), Some("open"));
        assert!(validate_fields(RULES, &input, ValidationMode::Create).is_ok());
    }

    #[rstest]
    #[case(values(None, None, Some("open")), ValidationError::Required("name".into()))]
    #[case(values(Some("   "), None, Some("open")), ValidationError::Required("name".into()))]
    #[case(
        values(Some("A"), None, Some("open")),
        ValidationError::TooShort { field: "name".into(), min: 2 }
    )]
    #[case(
        values(Some("Much too long"), None, Some("open")),
        ValidationError::TooLong { field: "name".into(), max: 10 }
    )]
    #[case(
        values(Some("Acme"), Some("not-an-email"), Some("open")),
        ValidationError::InvalidEmail { field: "email".into(), value: "not-an-email".into() }
    )]
    #[case(
        values(Some("Acme"), None, Some("pending")),
        ValidationError::NotAllowed {
            field: "status".into(),
            value: "pending".into(),
            allowed: "open, closed".into(),
        }
    )]
    fn test_violations_on_create(#[case] input: FieldValues, #[case] expected: ValidationError) {
        let err = validate_fields(RULES, &input, ValidationMode::Create).unwrap_err();
        assert_eq!(err, expected);
    }

    #[test]
    fn test_update_skips_absent_required_fields() {
        let input = values(None, Some("billing@acme.example"), None);
        assert!(validate_fields(RULES, &input, ValidationMode::Update).is_ok());
    }

    #[test]
    fn test_update_still_rejects_blank_required_field() {
        let input = values(Some(""), None, None);
        let err = validate_fields(RULES, &input, ValidationMode::Update).unwrap_err();
        assert_eq!(err, ValidationError::Required("name".into()));
    }

    #[test]
    fn test_blank_optional_field_is_accepted() {
        let input = values(Some("Acme"), Some(""), Some("closed"));
        assert!(validate_fields(RULES, &input, ValidationMode::Create).is_ok());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let input = values(Some("Zürichsee"), None, Some("open"));
        assert!(validate_fields(RULES, &input, ValidationMode::Create).is_ok());
    }

    #[test]
    fn test_unique_flag() {
        assert!(RULES[0].is_unique());
        assert!(!RULES[1].is_unique());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::Required("name".into()).to_string(),
            "name is required"
        );
        assert_eq!(
            ValidationError::Duplicate {
                field: "name".into(),
                value: "Acme".into()
            }
            .to_string(),
            "name 'Acme' is already taken"
        );
    }
}
