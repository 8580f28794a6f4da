//! Video game repository for SQLite operations
//!
//! Games are created only as part of a box (see `video_game_box`); this
//! module exposes the in-transaction insert used there.

use sqlx::{SqliteConnection, SqlitePool};

use crate::data::sqlite::SqliteError;
use crate::data::types::{CompiledQuery, NewVideoGame, VideoGameRow};
use crate::utils::time::now_timestamp;

use super::custom_field_value;
use super::query::{bind_operands, select_sql};

pub const ENTITY_KEY: &str = "video_game";

type VideoGameTuple = (i64, String, i64, String, String, Option<String>);

fn row_from_tuple(
    (id, title, system_id, created_at, updated_at, deleted_at): VideoGameTuple,
) -> VideoGameRow {
    VideoGameRow {
        id,
        title,
        system_id,
        created_at,
        updated_at,
        deleted_at,
        custom_field_values: Vec::new(),
    }
}

/// Fail with `InvalidInput` unless `system_id` names a live system
pub(super) async fn ensure_live_system(
    conn: &mut SqliteConnection,
    system_id: i64,
) -> Result<(), SqliteError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT COUNT(*) > 0 FROM systems WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(system_id)
    .fetch_one(&mut *conn)
    .await?;

    if exists {
        Ok(())
    } else {
        Err(SqliteError::InvalidInput(format!(
            "system {} does not exist",
            system_id
        )))
    }
}

/// Insert one game with its custom values on an open transaction
pub(super) async fn insert_video_game(
    conn: &mut SqliteConnection,
    input: &NewVideoGame,
    now: &str,
) -> Result<i64, SqliteError> {
    ensure_live_system(conn, input.system_id).await?;
    custom_field_value::validate_values(conn, ENTITY_KEY, &input.custom_field_values).await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO video_games (title, system_id, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(&input.title)
    .bind(input.system_id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    custom_field_value::replace_values(conn, ENTITY_KEY, id, &input.custom_field_values).await?;
    Ok(id)
}

pub async fn list_video_games(
    pool: &SqlitePool,
    compiled: &CompiledQuery,
) -> Result<Vec<VideoGameRow>, SqliteError> {
    let sql = select_sql("video_games", compiled);
    let rows = bind_operands(sqlx::query_as::<_, VideoGameTuple>(&sql), &compiled.operands)
        .fetch_all(pool)
        .await?;

    let mut games: Vec<VideoGameRow> = rows.into_iter().map(row_from_tuple).collect();
    let ids: Vec<i64> = games.iter().map(|g| g.id).collect();
    let mut values = custom_field_value::list_for_entities(pool, ENTITY_KEY, &ids).await?;
    for game in &mut games {
        game.custom_field_values = values.remove(&game.id).unwrap_or_default();
    }
    Ok(games)
}

pub async fn get_video_game(
    pool: &SqlitePool,
    id: i64,
    include_deleted: bool,
) -> Result<Option<VideoGameRow>, SqliteError> {
    let row = sqlx::query_as::<_, VideoGameTuple>(
        "SELECT id, title, system_id, created_at, updated_at, deleted_at FROM video_games WHERE id = ? AND (? OR deleted_at IS NULL)",
    )
    .bind(id)
    .bind(include_deleted)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut game = row_from_tuple(row);
    game.custom_field_values =
        custom_field_value::list_for_entity(pool, ENTITY_KEY, game.id).await?;
    Ok(Some(game))
}

pub async fn update_video_game(
    pool: &SqlitePool,
    id: i64,
    input: &NewVideoGame,
) -> Result<Option<VideoGameRow>, SqliteError> {
    let mut tx = pool.begin().await?;

    ensure_live_system(&mut tx, input.system_id).await?;
    custom_field_value::validate_values(&mut tx, ENTITY_KEY, &input.custom_field_values).await?;

    let result = sqlx::query(
        "UPDATE video_games SET title = ?, system_id = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(&input.title)
    .bind(input.system_id)
    .bind(now_timestamp())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    custom_field_value::replace_values(&mut tx, ENTITY_KEY, id, &input.custom_field_values)
        .await?;
    tx.commit().await?;

    get_video_game(pool, id, false).await
}

/// Soft delete a video game. Box links stay; boxes list only live games.
pub async fn delete_video_game(pool: &SqlitePool, id: i64) -> Result<bool, SqliteError> {
    let now = now_timestamp();
    let result = sqlx::query(
        "UPDATE video_games SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
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
    use crate::data::sqlite::repositories::system::create_system;
    use crate::data::types::NewSystem;

    async fn seed_system(pool: &SqlitePool, name: &str) -> i64 {
        create_system(
            pool,
            &NewSystem {
                name: name.to_string(),
                generation: 4,
                handheld: false,
                custom_field_values: Vec::new(),
            },
        )
        .await
        .unwrap()
        .id
    }

    fn game(title: &str, system_id: i64) -> NewVideoGame {
        NewVideoGame {
            title: title.to_string(),
            system_id,
            custom_field_values: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_requires_live_system() {
        let db = SqliteService::in_memory().await;
        let pool = db.pool();
        let snes = seed_system(pool, "SNES").await;

        let mut conn = pool.acquire().await.unwrap();
        let id = insert_video_game(&mut conn, &game("Chrono Trigger", snes), "2024-01-01 00:00:00")
            .await
            .unwrap();
        assert!(id > 0);

        let err = insert_video_game(&mut conn, &game("Ghost", 9999), "2024-01-01 00:00:00")
            .await
            .unwrap_err();
        assert!(matches!(err, SqliteError::InvalidInput(_)));
        drop(conn);

        let stored = get_video_game(pool, id, false).await.unwrap().unwrap();
        assert_eq!(stored.title, "Chrono Trigger");
        assert_eq!(stored.created_at, "2024-01-01 00:00:00");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = SqliteService::in_memory().await;
        let pool = db.pool();
        let snes = seed_system(pool, "SNES").await;
        let n64 = seed_system(pool, "N64").await;

        let mut conn = pool.acquire().await.unwrap();
        let id = insert_video_game(&mut conn, &game("Mario", snes), "2024-01-01 00:00:00")
            .await
            .unwrap();
        drop(conn);

        let updated = update_video_game(pool, id, &game("Mario 64", n64))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.system_id, n64);

        assert!(delete_video_game(pool, id).await.unwrap());
        assert!(get_video_game(pool, id, false).await.unwrap().is_none());
        assert!(get_video_game(pool, id, true).await.unwrap().is_some());
        assert!(list_video_games(pool, &CompiledQuery::default()).await.unwrap().is_empty());
    }
}
