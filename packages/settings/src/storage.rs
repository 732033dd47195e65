// ABOUTME: Storage operations for typed settings
// ABOUTME: Namespaced upserts, grouped reads and search over the settings table

use chrono::Utc;
use memberdesk_storage::{like_contains, StorageError, StorageResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::types::{GroupedSettings, Setting, SettingsMap};
use crate::value::{SettingType, SettingValue};

const UPSERT_SETTING: &str = r#"
    INSERT INTO settings (class, key, value, type, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?)
    ON CONFLICT(class, key) DO UPDATE SET
        value = excluded.value,
        type = excluded.type,
        updated_at = excluded.updated_at
"#;

pub struct SettingsStorage {
    pool: SqlitePool,
}

impl SettingsStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Decoded value for the pair, or `default` untouched when absent
    pub async fn get(
        &self,
        namespace: &str,
        key: &str,
        default: impl Into<SettingValue>,
    ) -> StorageResult<SettingValue> {
        debug!("Fetching setting: {}.{}", namespace, key);

        let row = sqlx::query("SELECT value, type FROM settings WHERE class = ? AND key = ?")
            .bind(namespace)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(row) => decode_row(&row),
            None => Ok(default.into()),
        }
    }

    /// Raw row for the pair
    pub async fn find(&self, namespace: &str, key: &str) -> StorageResult<Option<Setting>> {
        let row = sqlx::query("SELECT * FROM settings WHERE class = ? AND key = ?")
            .bind(namespace)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.map(|r| row_to_setting(&r)).transpose()
    }

    /// Write one pair. The tag is inferred from `value` when `setting_type`
    /// is `None`; otherwise `value` is coerced to the given tag.
    pub async fn set(
        &self,
        namespace: &str,
        key: &str,
        value: impl Into<SettingValue>,
        setting_type: Option<SettingType>,
    ) -> StorageResult<()> {
        let value = value.into();
        let setting_type = setting_type.unwrap_or_else(|| value.setting_type());

        debug!("Setting {}.{} ({})", namespace, key, setting_type);

        let mut conn = self.pool.acquire().await.map_err(StorageError::Sqlx)?;
        upsert(&mut conn, namespace, key, &value, setting_type).await
    }

    /// Write every entry in one transaction; nothing is kept if any write
    /// fails. Repeated keys collapse to their last value.
    pub async fn set_many<I, K, V>(&self, namespace: &str, entries: I) -> StorageResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<SettingValue>,
    {
        let entries: SettingsMap = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        debug!("Setting {} keys in namespace {}", entries.len(), namespace);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        for (key, value) in &entries {
            upsert(&mut tx, namespace, key, value, value.setting_type()).await?;
        }

        tx.commit().await.map_err(StorageError::Sqlx)?;

        Ok(())
    }

    /// Remove one pair; succeeds whether or not it existed
    pub async fn delete(&self, namespace: &str, key: &str) -> StorageResult<()> {
        debug!("Deleting setting: {}.{}", namespace, key);

        sqlx::query("DELETE FROM settings WHERE class = ? AND key = ?")
            .bind(namespace)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(())
    }

    /// Remove every pair in a namespace, returning how many were removed
    pub async fn delete_namespace(&self, namespace: &str) -> StorageResult<u64> {
        debug!("Deleting namespace: {}", namespace);

        let result = sqlx::query("DELETE FROM settings WHERE class = ?")
            .bind(namespace)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected())
    }

    pub async fn get_by_namespace(&self, namespace: &str) -> StorageResult<SettingsMap> {
        debug!("Fetching settings in namespace: {}", namespace);

        let rows = sqlx::query("SELECT key, value, type FROM settings WHERE class = ? ORDER BY key")
            .bind(namespace)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter()
            .map(|row| -> StorageResult<(String, SettingValue)> {
                let key: String = row.try_get("key").map_err(StorageError::Sqlx)?;
                Ok((key, decode_row(row)?))
            })
            .collect()
    }

    /// Every setting, grouped by namespace then key, both ascending
    pub async fn get_all_grouped(&self) -> StorageResult<GroupedSettings> {
        let rows = sqlx::query("SELECT class, key, value, type FROM settings ORDER BY class, key")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut grouped = GroupedSettings::new();
        for row in &rows {
            let namespace: String = row.try_get("class").map_err(StorageError::Sqlx)?;
            let key: String = row.try_get("key").map_err(StorageError::Sqlx)?;
            grouped
                .entry(namespace)
                .or_default()
                .insert(key, decode_row(row)?);
        }

        Ok(grouped)
    }

    pub async fn list_namespaces(&self) -> StorageResult<Vec<String>> {
        sqlx::query_scalar("SELECT DISTINCT class FROM settings ORDER BY class")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)
    }

    pub async fn count_in_namespace(&self, namespace: &str) -> StorageResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM settings WHERE class = ?")
            .bind(namespace)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)
    }

    /// Raw rows whose key, stored text or namespace contains `text`.
    /// Values are returned undecoded; see [`Setting::decoded`].
    pub async fn search(&self, text: &str) -> StorageResult<Vec<Setting>> {
        debug!("Searching settings for: {}", text);

        let pattern = like_contains(text);

        let rows = sqlx::query(
            r#"
            SELECT * FROM settings
            WHERE key LIKE ? ESCAPE '\'
               OR value LIKE ? ESCAPE '\'
               OR class LIKE ? ESCAPE '\'
            ORDER BY class, key
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_setting).collect()
    }
}

async fn upsert(
    conn: &mut SqliteConnection,
    namespace: &str,
    key: &str,
    value: &SettingValue,
    setting_type: SettingType,
) -> StorageResult<()> {
    let now = Utc::now();

    sqlx::query(UPSERT_SETTING)
        .bind(namespace)
        .bind(key)
        .bind(value.encode_as(setting_type))
        .bind(setting_type.as_str())
        .bind(now)
        .bind(now)
        .execute(conn)
        .await
        .map_err(StorageError::Sqlx)?;

    Ok(())
}

fn decode_row(row: &SqliteRow) -> StorageResult<SettingValue> {
    let value: Option<String> = row.try_get("value").map_err(StorageError::Sqlx)?;
    let tag: String = row.try_get("type").map_err(StorageError::Sqlx)?;

    Ok(SettingValue::decode(
        value.as_deref().unwrap_or_default(),
        SettingType::from_tag(&tag),
    ))
}

fn row_to_setting(row: &SqliteRow) -> StorageResult<Setting> {
    let value: Option<String> = row.try_get("value").map_err(StorageError::Sqlx)?;

    Ok(Setting {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        namespace: row.try_get("class").map_err(StorageError::Sqlx)?,
        key: row.try_get("key").map_err(StorageError::Sqlx)?,
        value: value.unwrap_or_default(),
        value_type: row.try_get("type").map_err(StorageError::Sqlx)?,
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
        updated_at: row.try_get("updated_at").map_err(StorageError::Sqlx)?,
    })
}
