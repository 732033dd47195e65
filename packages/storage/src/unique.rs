// ABOUTME: Uniqueness checks against the database
// ABOUTME: Rejects duplicate values for fields declared unique

use memberdesk_core::{FieldRules, ValidationError};
use sqlx::SqlitePool;
use tracing::debug;

use crate::{StorageError, StorageResult};

/// Reject values that collide with another row for every field whose rules
/// include `Rule::Unique`.
///
/// `exclude_id` is the row being updated, which may keep its own value.
pub async fn ensure_unique(
    pool: &SqlitePool,
    table: &'static str,
    rules: &[FieldRules],
    values: &[(&'static str, Option<String>)],
    exclude_id: Option<i64>,
) -> StorageResult<()> {
    for field_rules in rules.iter().filter(|r| r.is_unique()) {
        let value = values
            .iter()
            .find(|(name, _)| *name == field_rules.field)
            .and_then(|(_, value)| value.as_deref())
            .filter(|v| !v.trim().is_empty());

        let Some(value) = value else {
            continue;
        };

        // SQL injection safety: table and column names come from static rule
        // tables, the value is bound.
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ? AND (? IS NULL OR id != ?)",
            table, field_rules.field
        );

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(value)
            .bind(exclude_id)
            .bind(exclude_id)
            .fetch_one(pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if count > 0 {
            debug!(
                "Duplicate {}.{} value rejected: {}",
                table, field_rules.field, value
            );
            return Err(ValidationError::Duplicate {
                field: field_rules.field.to_string(),
                value: value.to_string(),
            }
            .into());
        }
    }

    Ok(())
}
