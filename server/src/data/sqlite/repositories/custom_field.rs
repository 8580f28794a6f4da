//! Custom field definition repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{CustomFieldRow, CustomFieldType};
use crate::utils::time::now_timestamp;

type CustomFieldTuple = (i64, String, String, String);

fn row_from_tuple((id, name, field_type, entity_key): CustomFieldTuple) -> CustomFieldRow {
    CustomFieldRow {
        id,
        name,
        // CHECK constraint keeps the column within the enum
        field_type: CustomFieldType::parse(&field_type).unwrap_or(CustomFieldType::Text),
        entity_key,
    }
}

/// List custom fields, optionally restricted to one entity key, ordered by id
pub async fn list_custom_fields(
    pool: &SqlitePool,
    entity_key: Option<&str>,
) -> Result<Vec<CustomFieldRow>, SqliteError> {
    let rows = match entity_key {
        Some(key) => {
            sqlx::query_as::<_, CustomFieldTuple>(
                "SELECT id, name, type, entity_key FROM custom_fields WHERE entity_key = ? ORDER BY id",
            )
            .bind(key)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, CustomFieldTuple>(
                "SELECT id, name, type, entity_key FROM custom_fields ORDER BY id",
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.into_iter().map(row_from_tuple).collect())
}

pub async fn get_custom_field(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<CustomFieldRow>, SqliteError> {
    let row = sqlx::query_as::<_, CustomFieldTuple>(
        "SELECT id, name, type, entity_key FROM custom_fields WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_from_tuple))
}

/// Look up a definition by its natural key
pub async fn get_by_name_and_key(
    pool: &SqlitePool,
    name: &str,
    entity_key: &str,
) -> Result<Option<CustomFieldRow>, SqliteError> {
    let row = sqlx::query_as::<_, CustomFieldTuple>(
        "SELECT id, name, type, entity_key FROM custom_fields WHERE name = ? AND entity_key = ?",
    )
    .bind(name)
    .bind(entity_key)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_from_tuple))
}

pub async fn create_custom_field(
    pool: &SqlitePool,
    name: &str,
    field_type: CustomFieldType,
    entity_key: &str,
) -> Result<CustomFieldRow, SqliteError> {
    let now = now_timestamp();

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO custom_fields (name, type, entity_key, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(field_type.as_str())
    .bind(entity_key)
    .bind(&now)
    .bind(&now)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        SqliteError::unique_or(e, || {
            format!("custom field '{}' already exists for '{}'", name, entity_key)
        })
    })?;

    tracing::debug!(id, name, entity_key, "Custom field created");

    Ok(CustomFieldRow {
        id,
        name: name.to_string(),
        field_type,
        entity_key: entity_key.to_string(),
    })
}

/// Rename a custom field. Type and entity key are immutable.
pub async fn rename_custom_field(
    pool: &SqlitePool,
    id: i64,
    name: &str,
) -> Result<Option<CustomFieldRow>, SqliteError> {
    let result = sqlx::query("UPDATE custom_fields SET name = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(now_timestamp())
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| SqliteError::unique_or(e, || format!("custom field '{}' already exists", name)))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_custom_field(pool, id).await
}

/// Delete a custom field and, through the FK cascade, all of its values
pub async fn delete_custom_field(pool: &SqlitePool, id: i64) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM custom_fields WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
