// ABOUTME: District storage layer using SQLite
// ABOUTME: Handles CRUD, activation and dropdown projection for districts

use chrono::Utc;
use memberdesk_core::{validate_fields, ValidationError, ValidationMode};
use memberdesk_storage::{bool_from_int, like_contains, StorageError, StorageResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use crate::types::{
    District, DistrictCreateInput, DistrictFilter, DistrictUpdateInput, DropdownOption,
    DISTRICT_RULES,
};

pub struct DistrictStorage {
    pool: SqlitePool,
}

impl DistrictStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List districts matching the filter, ordered by name
    pub async fn list(&self, filter: DistrictFilter) -> StorageResult<Vec<District>> {
        debug!("Fetching districts with filter: {:?}", filter);

        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM districts WHERE 1=1");

        if let Some(region_id) = filter.region_id {
            query_builder.push(" AND region_id = ");
            query_builder.push_bind(region_id);
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            query_builder.push(" AND name LIKE ");
            query_builder.push_bind(like_contains(search));
            query_builder.push(" ESCAPE '\\'");
        }
        if filter.active_only {
            query_builder.push(" AND is_active = 1");
        }

        query_builder.push(" ORDER BY name");

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

        rows.iter().map(row_to_district).collect()
    }

    pub async fn get(&self, district_id: i64) -> StorageResult<District> {
        debug!("Fetching district: {}", district_id);

        let row = sqlx::query("SELECT * FROM districts WHERE id = ?")
            .bind(district_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(r) => row_to_district(&r),
            None => Err(StorageError::NotFound(format!("district {}", district_id))),
        }
    }

    pub async fn create(&self, input: DistrictCreateInput) -> StorageResult<District> {
        validate_fields(DISTRICT_RULES, &input.field_values(), ValidationMode::Create)?;
        self.ensure_name_free(input.region_id, &input.name, None)
            .await?;

        debug!(
            "Creating district: {} (region: {})",
            input.name, input.region_id
        );

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO districts (region_id, name, code, is_active, created_at, updated_at)
            VALUES (?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(input.region_id)
        .bind(input.name.trim())
        .bind(&input.code)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get(result.last_insert_rowid()).await
    }

    /// Apply the provided fields; absent fields keep their value
    pub async fn update(
        &self,
        district_id: i64,
        input: DistrictUpdateInput,
    ) -> StorageResult<District> {
        debug!("Updating district: {}", district_id);

        let existing = self.get(district_id).await?;

        validate_fields(DISTRICT_RULES, &input.field_values(), ValidationMode::Update)?;

        if input.region_id.is_some() || input.name.is_some() {
            let region_id = input.region_id.unwrap_or(existing.region_id);
            let name = input.name.as_deref().unwrap_or(&existing.name);
            self.ensure_name_free(region_id, name, Some(district_id))
                .await?;
        }

        // SQL injection safety: column names are literals, values are bound
        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("UPDATE districts SET updated_at = ");
        query_builder.push_bind(Utc::now());

        if let Some(region_id) = input.region_id {
            query_builder.push(", region_id = ");
            query_builder.push_bind(region_id);
        }
        if let Some(name) = input.name {
            query_builder.push(", name = ");
            query_builder.push_bind(name.trim().to_string());
        }
        if let Some(code) = input.code {
            query_builder.push(", code = ");
            query_builder.push_bind(code);
        }

        query_builder.push(" WHERE id = ");
        query_builder.push_bind(district_id);

        query_builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        self.get(district_id).await
    }

    pub async fn activate(&self, district_id: i64) -> StorageResult<District> {
        self.set_active(district_id, true).await
    }

    pub async fn deactivate(&self, district_id: i64) -> StorageResult<District> {
        self.set_active(district_id, false).await
    }

    /// Active districts as `(id, name)` options, optionally for one region
    pub async fn dropdown(&self, region_id: Option<i64>) -> StorageResult<Vec<DropdownOption>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name FROM districts
            WHERE is_active = 1 AND (? IS NULL OR region_id = ?)
            ORDER BY name
            "#,
        )
        .bind(region_id)
        .bind(region_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter()
            .map(|row| -> StorageResult<DropdownOption> {
                Ok(DropdownOption {
                    id: row.try_get("id").map_err(StorageError::Sqlx)?,
                    name: row.try_get("name").map_err(StorageError::Sqlx)?,
                })
            })
            .collect()
    }

    pub async fn count(&self, region_id: Option<i64>) -> StorageResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM districts WHERE ? IS NULL OR region_id = ?")
            .bind(region_id)
            .bind(region_id)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)
    }

    async fn set_active(&self, district_id: i64, active: bool) -> StorageResult<District> {
        debug!("Setting district {} active: {}", district_id, active);

        let result = sqlx::query("UPDATE districts SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(active)
            .bind(Utc::now())
            .bind(district_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("district {}", district_id)));
        }

        self.get(district_id).await
    }

    /// Names are unique within a region
    async fn ensure_name_free(
        &self,
        region_id: i64,
        name: &str,
        exclude_id: Option<i64>,
    ) -> StorageResult<()> {
        let name = name.trim();
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM districts
            WHERE region_id = ? AND name = ? AND (? IS NULL OR id != ?)
            "#,
        )
        .bind(region_id)
        .bind(name)
        .bind(exclude_id)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if count > 0 {
            return Err(ValidationError::Duplicate {
                field: "name".to_string(),
                value: name.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

fn row_to_district(row: &SqliteRow) -> StorageResult<District> {
    Ok(District {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        region_id: row.try_get("region_id").map_err(StorageError::Sqlx)?,
        name: row.try_get("name").map_err(StorageError::Sqlx)?,
        code: row.try_get("code").map_err(StorageError::Sqlx)?,
        is_active: bool_from_int(row.try_get("is_active").map_err(StorageError::Sqlx)?),
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
        updated_at: row.try_get("updated_at").map_err(StorageError::Sqlx)?,
    })
}
