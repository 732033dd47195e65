// ABOUTME: Import log storage layer using SQLite
// ABOUTME: Handles run lifecycle, filtered listing, aggregate stats and retention purge

use chrono::{Duration, Utc};
use memberdesk_core::{validate_fields, ValidationMode};
use memberdesk_storage::{StorageError, StorageResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{debug, info, warn};

use crate::types::{
    ImportLog, ImportLogCreateInput, ImportLogFilter, ImportOutcome, ImportRowError, ImportStats,
    ImportStatus, IMPORT_LOG_RULES,
};

pub struct ImportLogStorage {
    pool: SqlitePool,
}

impl ImportLogStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a new run in the `processing` state
    pub async fn start(&self, input: ImportLogCreateInput) -> StorageResult<ImportLog> {
        validate_fields(IMPORT_LOG_RULES, &input.field_values(), ValidationMode::Create)?;

        debug!(
            "Starting import log: {} ({})",
            input.file_name, input.import_type
        );

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO import_logs (
                file_name, import_type, status, imported_by,
                started_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(input.file_name.trim())
        .bind(input.import_type.trim())
        .bind(ImportStatus::Processing.as_str())
        .bind(&input.imported_by)
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get(result.last_insert_rowid()).await
    }

    /// Record final counters and mark the run completed
    pub async fn complete(
        &self,
        import_id: i64,
        outcome: ImportOutcome,
    ) -> StorageResult<ImportLog> {
        debug!(
            "Completing import {}: {} rows, {} ok, {} failed, {} duplicates",
            import_id,
            outcome.total_rows,
            outcome.success_count,
            outcome.failure_count,
            outcome.duplicate_count
        );

        let errors_json = encode_errors(&outcome.errors)?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE import_logs
            SET status = ?, total_rows = ?, success_count = ?, failure_count = ?,
                duplicate_count = ?, errors = ?, completed_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(ImportStatus::Completed.as_str())
        .bind(outcome.total_rows)
        .bind(outcome.success_count)
        .bind(outcome.failure_count)
        .bind(outcome.duplicate_count)
        .bind(errors_json)
        .bind(now)
        .bind(now)
        .bind(import_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("import log {}", import_id)));
        }

        self.get(import_id).await
    }

    /// Mark the run failed, appending `message` to its error detail
    pub async fn fail(&self, import_id: i64, message: &str) -> StorageResult<ImportLog> {
        warn!("Import {} failed: {}", import_id, message);

        let existing = self.get(import_id).await?;

        let mut errors = existing.errors;
        errors.push(ImportRowError::general(message));
        let errors_json = encode_errors(&errors)?;
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE import_logs
            SET status = ?, errors = ?, completed_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(ImportStatus::Failed.as_str())
        .bind(errors_json)
        .bind(now)
        .bind(now)
        .bind(import_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get(import_id).await
    }

    pub async fn get(&self, import_id: i64) -> StorageResult<ImportLog> {
        let row = sqlx::query("SELECT * FROM import_logs WHERE id = ?")
            .bind(import_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(r) => row_to_import_log(&r),
            None => Err(StorageError::NotFound(format!("import log {}", import_id))),
        }
    }

    /// List runs matching the filter, newest first
    pub async fn list(&self, filter: ImportLogFilter) -> StorageResult<Vec<ImportLog>> {
        debug!("Fetching import logs with filter: {:?}", filter);

        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM import_logs WHERE 1=1");

        if let Some(status) = filter.status {
            query_builder.push(" AND status = ");
            query_builder.push_bind(status.as_str());
        }
        if let Some(import_type) = filter.import_type {
            query_builder.push(" AND import_type = ");
            query_builder.push_bind(import_type);
        }

        query_builder.push(" ORDER BY started_at DESC, id DESC");

        if filter.limit.is_some() || filter.offset.is_some() {
            query_builder.push(" LIMIT ");
            query_builder.push_bind(filter.limit.unwrap_or(-1));
            query_builder.push(" OFFSET ");
            query_builder.push_bind(filter.offset.unwrap_or(0));
        }

        let rows = query_builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_import_log).collect()
    }

    /// Run counts per status and summed row counters across all runs
    pub async fn stats(&self) -> StorageResult<ImportStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_imports,
                COALESCE(SUM(CASE WHEN status = 'processing' THEN 1 ELSE 0 END), 0) AS processing,
                COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0) AS completed,
                COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0) AS failed,
                COALESCE(SUM(total_rows), 0) AS total_rows,
                COALESCE(SUM(success_count), 0) AS success_count,
                COALESCE(SUM(failure_count), 0) AS failure_count,
                COALESCE(SUM(duplicate_count), 0) AS duplicate_count
            FROM import_logs
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(ImportStats {
            total_imports: row.try_get("total_imports").unwrap_or(0),
            processing: row.try_get("processing").unwrap_or(0),
            completed: row.try_get("completed").unwrap_or(0),
            failed: row.try_get("failed").unwrap_or(0),
            total_rows: row.try_get("total_rows").unwrap_or(0),
            success_count: row.try_get("success_count").unwrap_or(0),
            failure_count: row.try_get("failure_count").unwrap_or(0),
            duplicate_count: row.try_get("duplicate_count").unwrap_or(0),
        })
    }

    /// Delete runs created more than `days` days ago, returning how many went
    pub async fn purge_older_than(&self, days: u32) -> StorageResult<u64> {
        let cutoff = Utc::now() - Duration::days(i64::from(days));

        let result = sqlx::query("DELETE FROM import_logs WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let purged = result.rows_affected();
        if purged > 0 {
            info!("Purged {} import logs older than {} days", purged, days);
        }

        Ok(purged)
    }
}

fn encode_errors(errors: &[ImportRowError]) -> StorageResult<Option<String>> {
    if errors.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string(errors)?))
}

/// Unreadable error detail is dropped rather than failing the whole read
fn decode_errors(import_id: i64, raw: Option<String>) -> Vec<ImportRowError> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Vec::new();
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(
            "Discarding malformed error detail on import log {}: {}",
            import_id, e
        );
        Vec::new()
    })
}

fn row_to_import_log(row: &SqliteRow) -> StorageResult<ImportLog> {
    let id: i64 = row.try_get("id").map_err(StorageError::Sqlx)?;
    let status: String = row.try_get("status").map_err(StorageError::Sqlx)?;

    Ok(ImportLog {
        id,
        file_name: row.try_get("file_name").map_err(StorageError::Sqlx)?,
        import_type: row.try_get("import_type").map_err(StorageError::Sqlx)?,
        status: status.parse()?,
        total_rows: row.try_get("total_rows").map_err(StorageError::Sqlx)?,
        success_count: row.try_get("success_count").map_err(StorageError::Sqlx)?,
        failure_count: row.try_get("failure_count").map_err(StorageError::Sqlx)?,
        duplicate_count: row.try_get("duplicate_count").map_err(StorageError::Sqlx)?,
        errors: decode_errors(id, row.try_get("errors").map_err(StorageError::Sqlx)?),
        imported_by: row.try_get("imported_by").map_err(StorageError::Sqlx)?,
        started_at: row.try_get("started_at").map_err(StorageError::Sqlx)?,
        completed_at: row.try_get("completed_at").map_err(StorageError::Sqlx)?,
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
        updated_at: row.try_get("updated_at").map_err(StorageError::Sqlx)?,
    })
}
