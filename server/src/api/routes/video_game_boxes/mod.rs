//! Video game box API endpoints

pub mod types;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use types::VideoGameBoxRequest;

use super::{CollectionApiState, ListQuery};
use crate::api::extractors::{IdPath, ValidatedJson, ValidatedQuery};
use crate::api::types::ApiError;
use crate::domain::filters::ResourceKey;
use crate::domain::records::{RecordAssembler, VideoGameBoxRecord};

/// Build video game box routes
pub fn routes(state: CollectionApiState) -> Router<()> {
    Router::new()
        .route("/", get(list_video_game_boxes).post(create_video_game_box))
        .route(
            "/{id}",
            get(get_video_game_box).delete(delete_video_game_box),
        )
        .with_state(state)
}

fn video_game_box_not_found(id: i64) -> ApiError {
    ApiError::not_found(
        "VIDEO_GAME_BOX_NOT_FOUND",
        format!("Video game box not found: {}", id),
    )
}

/// List video game boxes matching the given filters
#[utoipa::path(
    get,
    path = "/api/v1/video-game-boxes",
    tag = "video-game-boxes",
    params(ListQuery),
    responses(
        (status = 200, description = "Matching boxes with their games", body = Vec<VideoGameBoxRecord>),
        (status = 400, description = "Invalid filters")
    )
)]
pub async fn list_video_game_boxes(
    State(state): State<CollectionApiState>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> Result<Json<Vec<VideoGameBoxRecord>>, ApiError> {
    let compiled = state
        .compile_filters(ResourceKey::VideoGameBox, query.filters.as_deref())
        .await?;
    let repo = state.database.repository();
    let rows = repo
        .list_video_game_boxes(&compiled)
        .await
        .map_err(ApiError::from_data)?;
    let records = RecordAssembler::new(&*repo)
        .video_game_boxes(rows)
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(records))
}

/// Create a box, linking existing games and creating new ones
#[utoipa::path(
    post,
    path = "/api/v1/video-game-boxes",
    tag = "video-game-boxes",
    request_body = VideoGameBoxRequest,
    responses(
        (status = 201, description = "Box created", body = VideoGameBoxRecord),
        (status = 400, description = "Invalid request, unknown system or game"),
        (status = 409, description = "A box with this title already exists for the system")
    )
)]
pub async fn create_video_game_box(
    State(state): State<CollectionApiState>,
    ValidatedJson(body): ValidatedJson<VideoGameBoxRequest>,
) -> Result<(StatusCode, Json<VideoGameBoxRecord>), ApiError> {
    let repo = state.database.repository();
    let created = repo
        .create_video_game_box(&(&body).into())
        .await
        .map_err(ApiError::from_data)?;
    tracing::debug!(
        id = created.video_game_box.id,
        new_games = created.created_video_games.len(),
        "Video game box created"
    );
    let record = RecordAssembler::new(&*repo)
        .video_game_box(created.video_game_box)
        .await
        .map_err(ApiError::from_data)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Get a video game box by ID
#[utoipa::path(
    get,
    path = "/api/v1/video-game-boxes/{id}",
    tag = "video-game-boxes",
    params(("id" = i64, Path, description = "Video game box ID")),
    responses(
        (status = 200, description = "Box with its games", body = VideoGameBoxRecord),
        (status = 404, description = "Box not found")
    )
)]
pub async fn get_video_game_box(
    State(state): State<CollectionApiState>,
    IdPath(id): IdPath,
) -> Result<Json<VideoGameBoxRecord>, ApiError> {
    let repo = state.database.repository();
    let row = repo
        .get_video_game_box(id, false)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| video_game_box_not_found(id))?;
    let record = RecordAssembler::new(&*repo)
        .video_game_box(row)
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(record))
}

/// Soft delete a video game box. Its games are kept.
#[utoipa::path(
    delete,
    path = "/api/v1/video-game-boxes/{id}",
    tag = "video-game-boxes",
    params(("id" = i64, Path, description = "Video game box ID")),
    responses(
        (status = 204, description = "Box deleted"),
        (status = 404, description = "Box not found")
    )
)]
pub async fn delete_video_game_box(
    State(state): State<CollectionApiState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .database
        .repository()
        .delete_video_game_box(id)
        .await
        .map_err(ApiError::from_data)?;
    if !deleted {
        return Err(video_game_box_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
