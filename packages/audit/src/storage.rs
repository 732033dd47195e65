// ABOUTME: Login log storage layer using SQLite
// ABOUTME: Appends login attempts and answers failure and risk queries

use chrono::{DateTime, Utc};
use memberdesk_core::{validate_fields, ValidationMode};
use memberdesk_storage::{bool_from_int, StorageError, StorageResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{debug, warn};

use crate::types::{LoginAttempt, LoginLog, LoginLogFilter, LOGIN_LOG_RULES, MAX_RISK_SCORE};

pub struct LoginLogStorage {
    pool: SqlitePool,
}

impl LoginLogStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one login attempt
    pub async fn record(&self, attempt: LoginAttempt) -> StorageResult<LoginLog> {
        validate_fields(LOGIN_LOG_RULES, &attempt.field_values(), ValidationMode::Create)?;

        debug!(
            "Recording login attempt for {} from {} (success: {})",
            attempt.username, attempt.ip_address, attempt.success
        );

        let result = sqlx::query(
            r#"
            INSERT INTO login_logs (
                user_id, username, ip_address, user_agent, success,
                failure_reason, risk_score, is_suspicious, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, 0, 0, ?)
            "#,
        )
        .bind(attempt.user_id)
        .bind(attempt.username.trim())
        .bind(attempt.ip_address.trim())
        .bind(&attempt.user_agent)
        .bind(attempt.success)
        .bind(&attempt.failure_reason)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get(result.last_insert_rowid()).await
    }

    pub async fn get(&self, log_id: i64) -> StorageResult<LoginLog> {
        let row = sqlx::query("SELECT * FROM login_logs WHERE id = ?")
            .bind(log_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(r) => row_to_login_log(&r),
            None => Err(StorageError::NotFound(format!("login log {}", log_id))),
        }
    }

    /// List attempts matching the filter, newest first
    pub async fn list(&self, filter: LoginLogFilter) -> StorageResult<Vec<LoginLog>> {
        debug!("Fetching login logs with filter: {:?}", filter);

        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM login_logs WHERE 1=1");

        if let Some(user_id) = filter.user_id {
            query_builder.push(" AND user_id = ");
            query_builder.push_bind(user_id);
        }
        if let Some(username) = filter.username {
            query_builder.push(" AND username = ");
            query_builder.push_bind(username);
        }
        if let Some(success) = filter.success {
            query_builder.push(" AND success = ");
            query_builder.push_bind(success);
        }
        if filter.suspicious_only {
            query_builder.push(" AND is_suspicious = 1");
        }
        if let Some(since) = filter.since {
            query_builder.push(" AND created_at >= ");
            query_builder.push_bind(since);
        }

        query_builder.push(" ORDER BY created_at DESC, id DESC");

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

        rows.iter().map(row_to_login_log).collect()
    }

    /// Failed attempts for `username` at or after `since`
    pub async fn count_failures_since(
        &self,
        username: &str,
        since: DateTime<Utc>,
    ) -> StorageResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM login_logs WHERE username = ? AND success = 0 AND created_at >= ?",
        )
        .bind(username.trim())
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)
    }

    /// Mark an attempt suspicious with the given score.
    ///
    /// This is the only change ever made to a recorded attempt.
    pub async fn flag_suspicious(&self, log_id: i64, risk_score: i64) -> StorageResult<LoginLog> {
        if !(0..=MAX_RISK_SCORE).contains(&risk_score) {
            return Err(StorageError::Validation(format!(
                "risk_score must be between 0 and {}",
                MAX_RISK_SCORE
            )));
        }

        warn!(
            "Flagging login attempt {} as suspicious (risk score {})",
            log_id, risk_score
        );

        let result =
            sqlx::query("UPDATE login_logs SET is_suspicious = 1, risk_score = ? WHERE id = ?")
                .bind(risk_score)
                .bind(log_id)
                .execute(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("login log {}", log_id)));
        }

        self.get(log_id).await
    }

    pub async fn count_suspicious(&self, since: Option<DateTime<Utc>>) -> StorageResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM login_logs WHERE is_suspicious = 1 AND (? IS NULL OR created_at >= ?)",
        )
        .bind(since)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)
    }
}

fn row_to_login_log(row: &SqliteRow) -> StorageResult<LoginLog> {
    Ok(LoginLog {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        user_id: row.try_get("user_id").map_err(StorageError::Sqlx)?,
        username: row.try_get("username").map_err(StorageError::Sqlx)?,
        ip_address: row.try_get("ip_address").map_err(StorageError::Sqlx)?,
        user_agent: row.try_get("user_agent").map_err(StorageError::Sqlx)?,
        success: bool_from_int(row.try_get("success").map_err(StorageError::Sqlx)?),
        failure_reason: row.try_get("failure_reason").map_err(StorageError::Sqlx)?,
        risk_score: row.try_get("risk_score").map_err(StorageError::Sqlx)?,
        is_suspicious: bool_from_int(row.try_get("is_suspicious").map_err(StorageError::Sqlx)?),
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
    })
}
