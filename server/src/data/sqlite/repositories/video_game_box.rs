//! Video game box repository for SQLite operations

use std::collections::{HashMap, HashSet};

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{
    CompiledQuery, CreatedVideoGameBox, NewVideoGameBox, VideoGameBoxRow, VideoGameRow,
};
use crate::utils::time::now_timestamp;

use super::custom_field_value;
use super::query::{ID_BATCH, bind_operands, placeholders, select_sql};
use super::video_game::{ensure_live_system, get_video_game, insert_video_game};

pub const ENTITY_KEY: &str = "video_game_box";

type BoxTuple = (i64, String, i64, bool, bool, String, String, Option<String>);

fn row_from_tuple(
    (id, title, system_id, is_physical, is_collection, created_at, updated_at, deleted_at): BoxTuple,
) -> VideoGameBoxRow {
    VideoGameBoxRow {
        id,
        title,
        system_id,
        is_physical,
        is_collection,
        created_at,
        updated_at,
        deleted_at,
        video_game_ids: Vec::new(),
        custom_field_values: Vec::new(),
    }
}

/// Live game ids per box, in insertion order
async fn list_game_ids_for_boxes(
    pool: &SqlitePool,
    box_ids: &[i64],
) -> Result<HashMap<i64, Vec<i64>>, SqliteError> {
    let mut grouped: HashMap<i64, Vec<i64>> = HashMap::new();
    for batch in box_ids.chunks(ID_BATCH) {
        let query = format!(
            r#"
            SELECT bg.video_game_box_id, bg.video_game_id
            FROM video_game_box_games bg
            JOIN video_games g ON g.id = bg.video_game_id
            WHERE g.deleted_at IS NULL AND bg.video_game_box_id IN ({})
            ORDER BY bg.video_game_box_id, bg.position
            "#,
            placeholders(batch.len())
        );

        let mut query_builder = sqlx::query_as::<_, (i64, i64)>(&query);
        for id in batch {
            query_builder = query_builder.bind(id);
        }
        for (box_id, game_id) in query_builder.fetch_all(pool).await? {
            grouped.entry(box_id).or_default().push(game_id);
        }
    }
    Ok(grouped)
}

async fn hydrate(pool: &SqlitePool, boxes: &mut [VideoGameBoxRow]) -> Result<(), SqliteError> {
    let ids: Vec<i64> = boxes.iter().map(|b| b.id).collect();
    let mut games = list_game_ids_for_boxes(pool, &ids).await?;
    let mut values = custom_field_value::list_for_entities(pool, ENTITY_KEY, &ids).await?;
    for b in boxes.iter_mut() {
        b.video_game_ids = games.remove(&b.id).unwrap_or_default();
        b.custom_field_values = values.remove(&b.id).unwrap_or_default();
    }
    Ok(())
}

pub async fn list_video_game_boxes(
    pool: &SqlitePool,
    compiled: &CompiledQuery,
) -> Result<Vec<VideoGameBoxRow>, SqliteError> {
    let sql = select_sql("video_game_boxes", compiled);
    let rows = bind_operands(sqlx::query_as::<_, BoxTuple>(&sql), &compiled.operands)
        .fetch_all(pool)
        .await?;

    let mut boxes: Vec<VideoGameBoxRow> = rows.into_iter().map(row_from_tuple).collect();
    hydrate(pool, &mut boxes).await?;
    Ok(boxes)
}

pub async fn get_video_game_box(
    pool: &SqlitePool,
    id: i64,
    include_deleted: bool,
) -> Result<Option<VideoGameBoxRow>, SqliteError> {
    let row = sqlx::query_as::<_, BoxTuple>(
        "SELECT id, title, system_id, is_physical, is_collection, created_at, updated_at, deleted_at FROM video_game_boxes WHERE id = ? AND (? OR deleted_at IS NULL)",
    )
    .bind(id)
    .bind(include_deleted)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut boxes = [row_from_tuple(row)];
    hydrate(pool, &mut boxes).await?;
    let [video_game_box] = boxes;
    Ok(Some(video_game_box))
}

/// Find a live box by (title, system)
pub async fn find_video_game_box_id(
    pool: &SqlitePool,
    title: &str,
    system_id: i64,
) -> Result<Option<i64>, SqliteError> {
    let id = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM video_game_boxes WHERE title = ? AND system_id = ? AND deleted_at IS NULL",
    )
    .bind(title)
    .bind(system_id)
    .fetch_optional(pool)
    .await?;
    Ok(id)
}

/// Create a box, its new games and all links in one transaction
///
/// Existing games are linked first, then new games in input order.
/// `created_video_games` mirrors `input.new_video_games` position by position.
pub async fn create_video_game_box(
    pool: &SqlitePool,
    input: &NewVideoGameBox,
) -> Result<CreatedVideoGameBox, SqliteError> {
    if input.existing_video_game_ids.is_empty() && input.new_video_games.is_empty() {
        return Err(SqliteError::InvalidInput(
            "a video game box must contain at least one video game".to_string(),
        ));
    }

    let now = now_timestamp();
    let mut tx = pool.begin().await?;

    ensure_live_system(&mut tx, input.system_id).await?;
    custom_field_value::validate_values(&mut tx, ENTITY_KEY, &input.custom_field_values).await?;

    for game_id in &input.existing_video_game_ids {
        let live: bool = sqlx::query_scalar(
            "SELECT COUNT(*) > 0 FROM video_games WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(game_id)
        .fetch_one(&mut *tx)
        .await?;
        if !live {
            return Err(SqliteError::InvalidInput(format!(
                "video game {} does not exist",
                game_id
            )));
        }
    }

    let mut new_game_ids = Vec::with_capacity(input.new_video_games.len());
    for game in &input.new_video_games {
        new_game_ids.push(insert_video_game(&mut tx, game, &now).await?);
    }

    let box_id: i64 = sqlx::query_scalar(
        "INSERT INTO video_game_boxes (title, system_id, is_physical, is_collection, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&input.title)
    .bind(input.system_id)
    .bind(input.is_physical)
    .bind(input.is_collection)
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        SqliteError::unique_or(e, || {
            format!(
                "video game box '{}' already exists for system {}",
                input.title, input.system_id
            )
        })
    })?;

    custom_field_value::replace_values(&mut tx, ENTITY_KEY, box_id, &input.custom_field_values)
        .await?;

    let mut linked = HashSet::new();
    let all_ids = input.existing_video_game_ids.iter().chain(new_game_ids.iter());
    for (position, game_id) in all_ids.filter(|id| linked.insert(**id)).enumerate() {
        sqlx::query(
            "INSERT INTO video_game_box_games (video_game_box_id, video_game_id, position) VALUES (?, ?, ?)",
        )
        .bind(box_id)
        .bind(game_id)
        .bind(position as i64)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::debug!(
        id = box_id,
        title = %input.title,
        linked = input.existing_video_game_ids.len(),
        created = new_game_ids.len(),
        "Video game box created"
    );

    let video_game_box = get_video_game_box(pool, box_id, false)
        .await?
        .ok_or_else(|| SqliteError::NotFound(format!("video game box {}", box_id)))?;

    let mut created_video_games: Vec<VideoGameRow> = Vec::with_capacity(new_game_ids.len());
    for id in new_game_ids {
        let game = get_video_game(pool, id, false)
            .await?
            .ok_or_else(|| SqliteError::NotFound(format!("video game {}", id)))?;
        created_video_games.push(game);
    }

    Ok(CreatedVideoGameBox {
        video_game_box,
        created_video_games,
    })
}

/// Soft delete a box. Its games stay.
pub async fn delete_video_game_box(pool: &SqlitePool, id: i64) -> Result<bool, SqliteError> {
    let now = now_timestamp();
    let result = sqlx::query(
        "UPDATE video_game_boxes SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(&now)
    .bind(&now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
