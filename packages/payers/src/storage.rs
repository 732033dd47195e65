// ABOUTME: Payer storage layer using SQLite
// ABOUTME: Handles CRUD, name lookup and active toggling for payers

use chrono::Utc;
use memberdesk_core::{validate_fields, ValidationMode};
use memberdesk_storage::{bool_from_int, ensure_unique, like_contains, StorageError, StorageResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use crate::types::{Payer, PayerCreateInput, PayerFilter, PayerUpdateInput, PAYER_RULES};

pub struct PayerStorage {
    pool: SqlitePool,
}

/// A blank email clears the column
fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
}

impl PayerStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: PayerFilter) -> StorageResult<Vec<Payer>> {
        debug!("Fetching payers with filter: {:?}", filter);

        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM payers WHERE 1=1");

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = like_contains(search);
            query_builder.push(" AND (name LIKE ");
            query_builder.push_bind(pattern.clone());
            query_builder.push(" ESCAPE '\\' OR contact_email LIKE ");
            query_builder.push_bind(pattern);
            query_builder.push(" ESCAPE '\\')");
        }
        if filter.active_only {
            query_builder.push(" AND is_active = 1");
        }

        query_builder.push(" ORDER BY name");

        let rows = query_builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_payer).collect()
    }

    pub async fn get(&self, payer_id: i64) -> StorageResult<Payer> {
        debug!("Fetching payer: {}", payer_id);

        let row = sqlx::query("SELECT * FROM payers WHERE id = ?")
            .bind(payer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(r) => row_to_payer(&r),
            None => Err(StorageError::NotFound(format!("payer {}", payer_id))),
        }
    }

    /// Exact-name lookup; `None` when no payer has that name
    pub async fn get_by_name(&self, name: &str) -> StorageResult<Option<Payer>> {
        let row = sqlx::query("SELECT * FROM payers WHERE name = ?")
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_payer).transpose()
    }

    pub async fn create(&self, input: PayerCreateInput) -> StorageResult<Payer> {
        let values = input.field_values();
        validate_fields(PAYER_RULES, &values, ValidationMode::Create)?;
        ensure_unique(&self.pool, "payers", PAYER_RULES, &values, None).await?;

        debug!("Creating payer: {}", input.name);

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO payers (name, contact_email, is_active, created_at, updated_at)
            VALUES (?, ?, 1, ?, ?)
            "#,
        )
        .bind(input.name.trim())
        .bind(normalize_email(input.contact_email))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get(result.last_insert_rowid()).await
    }

    pub async fn update(&self, payer_id: i64, input: PayerUpdateInput) -> StorageResult<Payer> {
        debug!("Updating payer: {}", payer_id);

        self.get(payer_id).await?;

        let values = input.field_values();
        validate_fields(PAYER_RULES, &values, ValidationMode::Update)?;
        ensure_unique(&self.pool, "payers", PAYER_RULES, &values, Some(payer_id)).await?;

        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("UPDATE payers SET updated_at = ");
        query_builder.push_bind(Utc::now());

        if let Some(name) = input.name {
            query_builder.push(", name = ");
            query_builder.push_bind(name.trim().to_string());
        }
        if input.contact_email.is_some() {
            query_builder.push(", contact_email = ");
            query_builder.push_bind(normalize_email(input.contact_email));
        }

        query_builder.push(" WHERE id = ");
        query_builder.push_bind(payer_id);

        query_builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        self.get(payer_id).await
    }

    /// Flip the active flag and return the updated payer
    pub async fn toggle_active(&self, payer_id: i64) -> StorageResult<Payer> {
        debug!("Toggling payer active flag: {}", payer_id);

        let result = sqlx::query(
            "UPDATE payers SET is_active = CASE is_active WHEN 0 THEN 1 ELSE 0 END, updated_at = ? WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(payer_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("payer {}", payer_id)));
        }

        self.get(payer_id).await
    }

    pub async fn count(&self, active_only: bool) -> StorageResult<i64> {
        let query = if active_only {
            "SELECT COUNT(*) FROM payers WHERE is_active = 1"
        } else {
            "SELECT COUNT(*) FROM payers"
        };

        sqlx::query_scalar(query)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)
    }
}

fn row_to_payer(row: &SqliteRow) -> StorageResult<Payer> {
    Ok(Payer {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        name: row.try_get("name").map_err(StorageError::Sqlx)?,
        contact_email: row.try_get("contact_email").map_err(StorageError::Sqlx)?,
        is_active: bool_from_int(row.try_get("is_active").map_err(StorageError::Sqlx)?),
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
        updated_at: row.try_get("updated_at").map_err(StorageError::Sqlx)?,
    })
}
