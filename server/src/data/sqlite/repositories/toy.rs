//! Toy repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{CompiledQuery, NewToy, ToyRow};
use crate::utils::time::now_timestamp;

use super::custom_field_value;
use super::query::{bind_operands, select_sql};

pub const ENTITY_KEY: &str = "toy";

type ToyTuple = (i64, String, String, String, String, Option<String>);

fn row_from_tuple((id, name, set, created_at, updated_at, deleted_at): ToyTuple) -> ToyRow {
    ToyRow {
        id,
        name,
        set,
        created_at,
        updated_at,
        deleted_at,
        custom_field_values: Vec::new(),
    }
}

fn conflict(input: &NewToy) -> String {
    format!("toy '{}' in set '{}' already exists", input.name, input.set)
}

pub async fn list_toys(
    pool: &SqlitePool,
    compiled: &CompiledQuery,
) -> Result<Vec<ToyRow>, SqliteError> {
    let sql = select_sql("toys", compiled);
    let rows = bind_operands(sqlx::query_as::<_, ToyTuple>(&sql), &compiled.operands)
        .fetch_all(pool)
        .await?;

    let mut toys: Vec<ToyRow> = rows.into_iter().map(row_from_tuple).collect();
    let ids: Vec<i64> = toys.iter().map(|t| t.id).collect();
    let mut values = custom_field_value::list_for_entities(pool, ENTITY_KEY, &ids).await?;
    for toy in &mut toys {
        toy.custom_field_values = values.remove(&toy.id).unwrap_or_default();
    }
    Ok(toys)
}

pub async fn get_toy(
    pool: &SqlitePool,
    id: i64,
    include_deleted: bool,
) -> Result<Option<ToyRow>, SqliteError> {
    let row = sqlx::query_as::<_, ToyTuple>(
        "SELECT id, name, set_name, created_at, updated_at, deleted_at FROM toys WHERE id = ? AND (? OR deleted_at IS NULL)",
    )
    .bind(id)
    .bind(include_deleted)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut toy = row_from_tuple(row);
    toy.custom_field_values = custom_field_value::list_for_entity(pool, ENTITY_KEY, toy.id).await?;
    Ok(Some(toy))
}

/// Find a live toy by (name, set)
pub async fn find_toy_id(
    pool: &SqlitePool,
    name: &str,
    set: &str,
) -> Result<Option<i64>, SqliteError> {
    let id = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM toys WHERE name = ? AND set_name = ? AND deleted_at IS NULL",
    )
    .bind(name)
    .bind(set)
    .fetch_optional(pool)
    .await?;
    Ok(id)
}

pub async fn create_toy(pool: &SqlitePool, input: &NewToy) -> Result<ToyRow, SqliteError> {
    let now = now_timestamp();
    let mut tx = pool.begin().await?;

    custom_field_value::validate_values(&mut tx, ENTITY_KEY, &input.custom_field_values).await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO toys (name, set_name, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(&input.name)
    .bind(&input.set)
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| SqliteError::unique_or(e, || conflict(input)))?;

    custom_field_value::replace_values(&mut tx, ENTITY_KEY, id, &input.custom_field_values)
        .await?;

    tx.commit().await?;
    tracing::debug!(id, name = %input.name, set = %input.set, "Toy created");

    get_toy(pool, id, false)
        .await?
        .ok_or_else(|| SqliteError::NotFound(format!("toy {}", id)))
}

pub async fn update_toy(
    pool: &SqlitePool,
    id: i64,
    input: &NewToy,
) -> Result<Option<ToyRow>, SqliteError> {
    let mut tx = pool.begin().await?;

    custom_field_value::validate_values(&mut tx, ENTITY_KEY, &input.custom_field_values).await?;

    let result = sqlx::query(
        "UPDATE toys SET name = ?, set_name = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(&input.name)
    .bind(&input.set)
    .bind(now_timestamp())
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| SqliteError::unique_or(e, || conflict(input)))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    custom_field_value::replace_values(&mut tx, ENTITY_KEY, id, &input.custom_field_values)
        .await?;
    tx.commit().await?;

    get_toy(pool, id, false).await
}

/// Soft delete a toy
pub async fn delete_toy(pool: &SqlitePool, id: i64) -> Result<bool, SqliteError> {
    let now = now_timestamp();
    let result = sqlx::query(
        "UPDATE toys SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
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

    fn toy(name: &str, set: &str) -> NewToy {
        NewToy {
            name: name.to_string(),
            set: set.to_string(),
            custom_field_values: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_natural_key_is_name_and_set() {
        let db = SqliteService::in_memory().await;
        let pool = db.pool();

        let woody = create_toy(pool, &toy("Woody", "Toy Story")).await.unwrap();
        create_toy(pool, &toy("Woody", "Toy Story 2")).await.unwrap();

        assert_eq!(
            find_toy_id(pool, "Woody", "Toy Story").await.unwrap(),
            Some(woody.id)
        );
        assert_eq!(find_toy_id(pool, "Woody", "Cars").await.unwrap(), None);

        let err = create_toy(pool, &toy("Woody", "Toy Story")).await.unwrap_err();
        assert!(matches!(err, SqliteError::Conflict(ref m) if m.contains("Toy Story")));
    }

    #[tokio::test]
    async fn test_custom_field_filter_by_value() {
        let db = SqliteService::in_memory().await;
        let pool = db.pool();
        let color = create_custom_field(pool, "Color", CustomFieldType::Text, ENTITY_KEY)
            .await
            .unwrap();

        for (name, shade) in [("Rex", "green"), ("Hamm", "pink"), ("Slinky", "brown")] {
            let mut input = toy(name, "Toy Story");
            input.custom_field_values = vec![NewCustomFieldValue {
                custom_field_id: color.id,
                value: shade.to_string(),
            }];
            create_toy(pool, &input).await.unwrap();
        }

        let compiled = CompiledQuery {
            fragments: vec![
                " AND e.id IN (SELECT cfv.entity_id FROM custom_field_values cfv JOIN custom_fields cf ON cf.id = cfv.custom_field_id WHERE cf.entity_key = 'toy' AND cf.name = ?".to_string(),
                " AND cfv.value LIKE ?)".to_string(),
            ],
            operands: vec![
                FilterValue::Text("Color".to_string()),
                FilterValue::Text("%in%".to_string()),
            ],
        };
        let rows = list_toys(pool, &compiled).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Hamm");
        assert_eq!(rows[0].custom_field_values[0].value, "pink");
    }

    #[tokio::test]
    async fn test_update_and_soft_delete() {
        let db = SqliteService::in_memory().await;
        let pool = db.pool();
        let created = create_toy(pool, &toy("Buzz", "Toy Story")).await.unwrap();

        let updated = update_toy(pool, created.id, &toy("Buzz Lightyear", "Toy Story"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Buzz Lightyear");

        assert!(delete_toy(pool, created.id).await.unwrap());
        assert!(update_toy(pool, created.id, &toy("X", "Y")).await.unwrap().is_none());
        assert!(list_toys(pool, &CompiledQuery::default()).await.unwrap().is_empty());
    }
}
