// ABOUTME: Employment status storage layer using SQLite
// ABOUTME: Handles CRUD and member usage aggregation for employment statuses

use chrono::Utc;
use memberdesk_core::{validate_fields, ValidationMode};
use memberdesk_storage::{bool_from_int, ensure_unique, StorageError, StorageResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::types::{
    EmploymentStatus, EmploymentStatusCreateInput, EmploymentStatusUpdateInput, StatusUsage,
    EMPLOYMENT_STATUS_RULES,
};

pub struct EmploymentStatusStorage {
    pool: SqlitePool,
}

impl EmploymentStatusStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List statuses ordered by display order, then name
    pub async fn list(&self, active_only: bool) -> StorageResult<Vec<EmploymentStatus>> {
        debug!("Fetching employment statuses (active_only: {})", active_only);

        let query = if active_only {
            "SELECT * FROM employment_statuses WHERE is_active = 1 ORDER BY display_order, name"
        } else {
            "SELECT * FROM employment_statuses ORDER BY display_order, name"
        };

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_status).collect()
    }

    pub async fn get(&self, status_id: i64) -> StorageResult<EmploymentStatus> {
        debug!("Fetching employment status: {}", status_id);

        let row = sqlx::query("SELECT * FROM employment_statuses WHERE id = ?")
            .bind(status_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(r) => row_to_status(&r),
            None => Err(StorageError::NotFound(format!(
                "employment status {}",
                status_id
            ))),
        }
    }

    pub async fn create(
        &self,
        input: EmploymentStatusCreateInput,
    ) -> StorageResult<EmploymentStatus> {
        let values = input.field_values();
        validate_fields(EMPLOYMENT_STATUS_RULES, &values, ValidationMode::Create)?;
        ensure_unique(
            &self.pool,
            "employment_statuses",
            EMPLOYMENT_STATUS_RULES,
            &values,
            None,
        )
        .await?;

        debug!("Creating employment status: {}", input.name);

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO employment_statuses (name, description, display_order, is_active, created_at, updated_at)
            VALUES (?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.display_order.unwrap_or(0))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get(result.last_insert_rowid()).await
    }

    pub async fn update(
        &self,
        status_id: i64,
        input: EmploymentStatusUpdateInput,
    ) -> StorageResult<EmploymentStatus> {
        debug!("Updating employment status: {}", status_id);

        // Fails with NotFound before any validation work
        self.get(status_id).await?;

        let values = input.field_values();
        validate_fields(EMPLOYMENT_STATUS_RULES, &values, ValidationMode::Update)?;
        ensure_unique(
            &self.pool,
            "employment_statuses",
            EMPLOYMENT_STATUS_RULES,
            &values,
            Some(status_id),
        )
        .await?;

        // Build update query dynamically based on provided fields
        let mut query_parts = vec!["updated_at = ?"];

        if input.name.is_some() {
            query_parts.push("name = ?");
        }
        if input.description.is_some() {
            query_parts.push("description = ?");
        }
        if input.display_order.is_some() {
            query_parts.push("display_order = ?");
        }
        if input.is_active.is_some() {
            query_parts.push("is_active = ?");
        }

        let query_str = format!(
            "UPDATE employment_statuses SET {} WHERE id = ?",
            query_parts.join(", ")
        );
        let mut query = sqlx::query(&query_str).bind(Utc::now());

        // Bind parameters in the same order
        if let Some(name) = input.name {
            query = query.bind(name);
        }
        if let Some(description) = input.description {
            query = query.bind(description);
        }
        if let Some(display_order) = input.display_order {
            query = query.bind(display_order);
        }
        if let Some(is_active) = input.is_active {
            query = query.bind(is_active);
        }

        query = query.bind(status_id);

        query
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        self.get(status_id).await
    }

    /// Member counts per status, including statuses nobody holds
    pub async fn usage_distribution(&self) -> StorageResult<Vec<StatusUsage>> {
        debug!("Aggregating employment status usage");

        let rows = sqlx::query(
            r#"
            SELECT s.id, s.name, COUNT(m.id) AS member_count
            FROM employment_statuses s
            LEFT JOIN members m ON m.employment_status_id = s.id
            GROUP BY s.id, s.name
            ORDER BY s.display_order, s.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter()
            .map(|row| -> StorageResult<StatusUsage> {
                Ok(StatusUsage {
                    id: row.try_get("id").map_err(StorageError::Sqlx)?,
                    name: row.try_get("name").map_err(StorageError::Sqlx)?,
                    member_count: row.try_get("member_count").map_err(StorageError::Sqlx)?,
                })
            })
            .collect()
    }

    pub async fn count(&self) -> StorageResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM employment_statuses")
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)
    }
}

fn row_to_status(row: &SqliteRow) -> StorageResult<EmploymentStatus> {
    Ok(EmploymentStatus {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        name: row.try_get("name").map_err(StorageError::Sqlx)?,
        description: row.try_get("description").map_err(StorageError::Sqlx)?,
        display_order: row.try_get("display_order").map_err(StorageError::Sqlx)?,
        is_active: bool_from_int(row.try_get("is_active").map_err(StorageError::Sqlx)?),
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
        updated_at: row.try_get("updated_at").map_err(StorageError::Sqlx)?,
    })
}
