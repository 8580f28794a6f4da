//! System repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{CompiledQuery, NewSystem, SystemRow};
use crate::utils::time::now_timestamp;

use super::custom_field_value;
use super::query::{bind_operands, select_sql};

pub const ENTITY_KEY: &str = "system";

type SystemTuple = (i64, String, i64, bool, String, String, Option<String>);

fn row_from_tuple(
    (id, name, generation, handheld, created_at, updated_at, deleted_at): SystemTuple,
) -> SystemRow {
    SystemRow {
        id,
        name,
        generation,
        handheld,
        created_at,
        updated_at,
        deleted_at,
        custom_field_values: Vec::new(),
    }
}

/// List live systems matching compiled filters
pub async fn list_systems(
    pool: &SqlitePool,
    compiled: &CompiledQuery,
) -> Result<Vec<SystemRow>, SqliteError> {
    let sql = select_sql("systems", compiled);
    let rows = bind_operands(sqlx::query_as::<_, SystemTuple>(&sql), &compiled.operands)
        .fetch_all(pool)
        .await?;

    let mut systems: Vec<SystemRow> = rows.into_iter().map(row_from_tuple).collect();
    let ids: Vec<i64> = systems.iter().map(|s| s.id).collect();
    let mut values = custom_field_value::list_for_entities(pool, ENTITY_KEY, &ids).await?;
    for system in &mut systems {
        system.custom_field_values = values.remove(&system.id).unwrap_or_default();
    }
    Ok(systems)
}

pub async fn get_system(
    pool: &SqlitePool,
    id: i64,
    include_deleted: bool,
) -> Result<Option<SystemRow>, SqliteError> {
    let row = sqlx::query_as::<_, SystemTuple>(
        "SELECT id, name, generation, handheld, created_at, updated_at, deleted_at FROM systems WHERE id = ? AND (? OR deleted_at IS NULL)",
    )
    .bind(id)
    .bind(include_deleted)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut system = row_from_tuple(row);
    system.custom_field_values =
        custom_field_value::list_for_entity(pool, ENTITY_KEY, system.id).await?;
    Ok(Some(system))
}

/// Find a live system by name
pub async fn find_system_id(pool: &SqlitePool, name: &str) -> Result<Option<i64>, SqliteError> {
    let id = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM systems WHERE name = ? AND deleted_at IS NULL",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(id)
}

pub async fn create_system(pool: &SqlitePool, input: &NewSystem) -> Result<SystemRow, SqliteError> {
    let now = now_timestamp();
    let mut tx = pool.begin().await?;

    custom_field_value::validate_values(&mut tx, ENTITY_KEY, &input.custom_field_values).await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO systems (name, generation, handheld, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&input.name)
    .bind(input.generation)
    .bind(input.handheld)
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| SqliteError::unique_or(e, || format!("system '{}' already exists", input.name)))?;

    custom_field_value::replace_values(&mut tx, ENTITY_KEY, id, &input.custom_field_values)
        .await?;

    tx.commit().await?;
    tracing::debug!(id, name = %input.name, "System created");

    get_system(pool, id, false)
        .await?
        .ok_or_else(|| SqliteError::NotFound(format!("system {}", id)))
}

/// Update a live system and replace its custom field values
pub async fn update_system(
    pool: &SqlitePool,
    id: i64,
    input: &NewSystem,
) -> Result<Option<SystemRow>, SqliteError> {
    let mut tx = pool.begin().await?;

    custom_field_value::validate_values(&mut tx, ENTITY_KEY, &input.custom_field_values).await?;

    let result = sqlx::query(
        "UPDATE systems SET name = ?, generation = ?, handheld = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(&input.name)
    .bind(input.generation)
    .bind(input.handheld)
    .bind(now_timestamp())
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| SqliteError::unique_or(e, || format!("system '{}' already exists", input.name)))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    custom_field_value::replace_values(&mut tx, ENTITY_KEY, id, &input.custom_field_values)
        .await?;
    tx.commit().await?;

    get_system(pool, id, false).await
}

/// Soft delete a system
pub async fn delete_system(pool: &SqlitePool, id: i64) -> Result<bool, SqliteError> {
    let now = now_timestamp();
    let result = sqlx::query(
        "UPDATE systems SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(&now)
    .bind(&now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::SqliteService;
    use crate::data::sqlite::repositories::custom_field::create_custom_field;
    use crate::data::types::{CustomFieldType, FilterValue, NewCustomFieldValue};

    fn snes() -> NewSystem {
        NewSystem {
            name: "SNES".to_string(),
            generation: 4,
            handheld: false,
            custom_field_values: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_get_and_find() {
        let db = SqliteService::in_memory().await;
        let pool = db.pool();
        let region = create_custom_field(pool, "Region", CustomFieldType::Text, ENTITY_KEY)
            .await
            .unwrap();

        let mut input = snes();
        input.custom_field_values = vec![NewCustomFieldValue {
            custom_field_id: region.id,
            value: "PAL".to_string(),
        }];
        let created = create_system(pool, &input).await.unwrap();

        assert_eq!(created.name, "SNES");
        assert_eq!(created.generation, 4);
        assert!(!created.handheld);
        assert_eq!(created.custom_field_values.len(), 1);
        assert_eq!(created.custom_field_values[0].value, "PAL");
        assert_eq!(find_system_id(pool, "SNES").await.unwrap(), Some(created.id));
        assert_eq!(find_system_id(pool, "N64").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_live_name_is_conflict() {
        let db = SqliteService::in_memory().await;
        let pool = db.pool();
        create_system(pool, &snes()).await.unwrap();
        let err = create_system(pool, &snes()).await.unwrap_err();
        assert!(matches!(err, SqliteError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_but_keeps_row() {
        let db = SqliteService::in_memory().await;
        let pool = db.pool();
        let created = create_system(pool, &snes()).await.unwrap();

        assert!(delete_system(pool, created.id).await.unwrap());
        assert!(!delete_system(pool, created.id).await.unwrap());

        assert!(get_system(pool, created.id, false).await.unwrap().is_none());
        let deleted = get_system(pool, created.id, true).await.unwrap().unwrap();
        assert!(deleted.deleted_at.is_some());
        assert_eq!(find_system_id(pool, "SNES").await.unwrap(), None);

        // Name is free again once the old row is deleted
        create_system(pool, &snes()).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_rejects_foreign_custom_field() {
        let db = SqliteService::in_memory().await;
        let pool = db.pool();
        let toy_field = create_custom_field(pool, "Color", CustomFieldType::Text, "toy")
            .await
            .unwrap();
        let created = create_system(pool, &snes()).await.unwrap();

        let mut input = snes();
        input.generation = 5;
        input.custom_field_values = vec![NewCustomFieldValue {
            custom_field_id: toy_field.id,
            value: "red".to_string(),
        }];
        let err = update_system(pool, created.id, &input).await.unwrap_err();
        assert!(matches!(err, SqliteError::InvalidInput(_)));

        input.custom_field_values.clear();
        let updated = update_system(pool, created.id, &input).await.unwrap().unwrap();
        assert_eq!(updated.generation, 5);
        assert!(update_system(pool, 9999, &input).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_with_compiled_filters() {
        let db = SqliteService::in_memory().await;
        let pool = db.pool();
        for (name, generation, handheld) in [("NES", 3, false), ("Game Boy", 4, true), ("SNES", 4, false)] {
            create_system(
                pool,
                &NewSystem {
                    name: name.to_string(),
                    generation,
                    handheld,
                    custom_field_values: Vec::new(),
                },
            )
            .await
            .unwrap();
        }

        let compiled = CompiledQuery {
            fragments: vec![
                " AND e.generation = ?".to_string(),
                " AND e.handheld = ?".to_string(),
            ],
            operands: vec![FilterValue::Integer(4), FilterValue::Boolean(false)],
        };
        let rows = list_systems(pool, &compiled).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "SNES");

        let compiled = CompiledQuery {
            fragments: vec![" ORDER BY e.name DESC".to_string(), " LIMIT ?".to_string()],
            operands: vec![FilterValue::Integer(2)],
        };
        let names: Vec<_> = list_systems(pool, &compiled)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["SNES", "NES"]);
    }
}
