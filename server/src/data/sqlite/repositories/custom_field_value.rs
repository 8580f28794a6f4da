//! Custom field value storage shared by every entity kind
//!
//! Values are stored as text, one row per (field, entity). Writes run on a
//! caller-supplied connection so they join the entity's transaction.

use std::collections::{HashMap, HashSet};

use sqlx::{SqliteConnection, SqlitePool};

use crate::data::sqlite::SqliteError;
use crate::data::types::{CustomFieldType, CustomFieldValueRow, NewCustomFieldValue};

use super::query::{ID_BATCH, placeholders};

type ValueTuple = (i64, i64, String, String, String);

fn row_from_tuple(
    (_, custom_field_id, custom_field_name, field_type, value): ValueTuple,
) -> CustomFieldValueRow {
    CustomFieldValueRow {
        custom_field_id,
        custom_field_name,
        custom_field_type: CustomFieldType::parse(&field_type).unwrap_or(CustomFieldType::Text),
        value,
    }
}

/// Check every value against its definition: field exists, belongs to
/// `entity_key`, appears once, and the text parses for the field's type.
pub async fn validate_values(
    conn: &mut SqliteConnection,
    entity_key: &str,
    values: &[NewCustomFieldValue],
) -> Result<(), SqliteError> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value.custom_field_id) {
            return Err(SqliteError::InvalidInput(format!(
                "custom field {} supplied more than once",
                value.custom_field_id
            )));
        }

        let def = sqlx::query_as::<_, (String, String, String)>(
            "SELECT name, type, entity_key FROM custom_fields WHERE id = ?",
        )
        .bind(value.custom_field_id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some((name, field_type, field_key)) = def else {
            return Err(SqliteError::InvalidInput(format!(
                "custom field {} does not exist",
                value.custom_field_id
            )));
        };
        if field_key != entity_key {
            return Err(SqliteError::InvalidInput(format!(
                "custom field '{}' belongs to '{}', not '{}'",
                name, field_key, entity_key
            )));
        }
        let field_type = CustomFieldType::parse(&field_type).unwrap_or(CustomFieldType::Text);
        if !field_type.accepts(&value.value) {
            return Err(SqliteError::InvalidInput(format!(
                "value '{}' is not a valid {} for custom field '{}'",
                value.value, field_type, name
            )));
        }
    }
    Ok(())
}

/// Replace all values of one entity with `values`
pub async fn replace_values(
    conn: &mut SqliteConnection,
    entity_key: &str,
    entity_id: i64,
    values: &[NewCustomFieldValue],
) -> Result<(), SqliteError> {
    sqlx::query("DELETE FROM custom_field_values WHERE entity_key = ? AND entity_id = ?")
        .bind(entity_key)
        .bind(entity_id)
        .execute(&mut *conn)
        .await?;

    for value in values {
        sqlx::query(
            "INSERT INTO custom_field_values (custom_field_id, entity_id, entity_key, value) VALUES (?, ?, ?, ?)",
        )
        .bind(value.custom_field_id)
        .bind(entity_id)
        .bind(entity_key)
        .bind(&value.value)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn list_for_entity(
    pool: &SqlitePool,
    entity_key: &str,
    entity_id: i64,
) -> Result<Vec<CustomFieldValueRow>, SqliteError> {
    let mut by_entity = list_for_entities(pool, entity_key, &[entity_id]).await?;
    Ok(by_entity.remove(&entity_id).unwrap_or_default())
}

/// Values for many entities at once, grouped by entity id, ordered by field id
pub async fn list_for_entities(
    pool: &SqlitePool,
    entity_key: &str,
    entity_ids: &[i64],
) -> Result<HashMap<i64, Vec<CustomFieldValueRow>>, SqliteError> {
    let mut grouped: HashMap<i64, Vec<CustomFieldValueRow>> = HashMap::new();
    for batch in entity_ids.chunks(ID_BATCH) {
        let query = format!(
            r#"
            SELECT cfv.entity_id, cf.id, cf.name, cf.type, cfv.value
            FROM custom_field_values cfv
            JOIN custom_fields cf ON cf.id = cfv.custom_field_id
            WHERE cfv.entity_key = ? AND cfv.entity_id IN ({})
            ORDER BY cfv.entity_id, cf.id
            "#,
            placeholders(batch.len())
        );

        let mut query_builder = sqlx::query_as::<_, ValueTuple>(&query).bind(entity_key);
        for id in batch {
            query_builder = query_builder.bind(id);
        }
        for row in query_builder.fetch_all(pool).await? {
            let entity_id = row.0;
            grouped.entry(entity_id).or_default().push(row_from_tuple(row));
        }
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::SqliteService;
    use crate::data::sqlite::repositories::custom_field::create_custom_field;

    fn value(custom_field_id: i64, value: &str) -> NewCustomFieldValue {
        NewCustomFieldValue {
            custom_field_id,
            value: value.to_string(),
        }
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_values() {
        let db = SqliteService::in_memory().await;
        let pool = db.pool();
        let count = create_custom_field(pool, "Count", CustomFieldType::Number, "toy")
            .await
            .unwrap();
        let owned = create_custom_field(pool, "Owned", CustomFieldType::Boolean, "system")
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert!(validate_values(&mut conn, "toy", &[value(count.id, "3")]).await.is_ok());

        let cases = [
            vec![value(count.id, "three")],
            vec![value(owned.id, "true")],
            vec![value(9999, "1")],
            vec![value(count.id, "1"), value(count.id, "2")],
        ];
        for values in cases {
            let err = validate_values(&mut conn, "toy", &values).await.unwrap_err();
            assert!(matches!(err, SqliteError::InvalidInput(_)), "{:?}", values);
        }
    }

    #[tokio::test]
    async fn test_replace_and_list() {
        let db = SqliteService::in_memory().await;
        let pool = db.pool();
        let color = create_custom_field(pool, "Color", CustomFieldType::Text, "toy")
            .await
            .unwrap();
        let count = create_custom_field(pool, "Count", CustomFieldType::Number, "toy")
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        replace_values(&mut conn, "toy", 1, &[value(color.id, "red"), value(count.id, "2")])
            .await
            .unwrap();
        replace_values(&mut conn, "toy", 2, &[value(color.id, "blue")])
            .await
            .unwrap();
        replace_values(&mut conn, "toy", 1, &[value(count.id, "5")])
            .await
            .unwrap();
        drop(conn);

        let one = list_for_entity(pool, "toy", 1).await.unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].custom_field_name, "Count");
        assert_eq!(one[0].custom_field_type, CustomFieldType::Number);
        assert_eq!(one[0].value, "5");

        let grouped = list_for_entities(pool, "toy", &[1, 2, 3]).await.unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&2][0].value, "blue");
        assert!(list_for_entity(pool, "system", 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_spans_several_batches() {
        let db = SqliteService::in_memory().await;
        let pool = db.pool();
        let color = create_custom_field(pool, "Color", CustomFieldType::Text, "toy")
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        for id in [1, ID_BATCH as i64 + 1, 3 * ID_BATCH as i64] {
            replace_values(&mut conn, "toy", id, &[value(color.id, &id.to_string())])
                .await
                .unwrap();
        }
        drop(conn);

        let ids: Vec<i64> = (1..=3 * ID_BATCH as i64 + 10).collect();
        let grouped = list_for_entities(pool, "toy", &ids).await.unwrap();
        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[&(3 * ID_BATCH as i64)][0].value, (3 * ID_BATCH).to_string());
        assert_eq!(grouped[&(ID_BATCH as i64 + 1)][0].value, (ID_BATCH + 1).to_string());
    }
}
