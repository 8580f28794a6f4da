//! Video game API endpoints

pub mod types;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use types::VideoGameRequest;

use super::{CollectionApiState, ListQuery};
use crate::api::extractors::{IdPath, ValidatedJson, ValidatedQuery};
use crate::api::types::ApiError;
use crate::domain::filters::ResourceKey;
use crate::domain::records::{RecordAssembler, VideoGameRecord};

/// Build video game routes
pub fn routes(state: CollectionApiState) -> Router<()> {
    Router::new()
        .route("/", get(list_video_games))
        .route(
            "/{id}",
            get(get_video_game)
                .put(update_video_game)
                .delete(delete_video_game),
        )
        .with_state(state)
}

fn video_game_not_found(id: i64) -> ApiError {
    ApiError::not_found(
        "VIDEO_GAME_NOT_FOUND",
        format!("Video game not found: {}", id),
    )
}

/// List video games matching the given filters
#[utoipa::path(
    get,
    path = "/api/v1/video-games",
    tag = "video-games",
    params(ListQuery),
    responses(
        (status = 200, description = "Matching video games", body = Vec<VideoGameRecord>),
        (status = 400, description = "Invalid filters")
    )
)]
pub async fn list_video_games(
    State(state): State<CollectionApiState>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> Result<Json<Vec<VideoGameRecord>>, ApiError> {
    let compiled = state
        .compile_filters(ResourceKey::VideoGame, query.filters.as_deref())
        .await?;
    let repo = state.database.repository();
    let rows = repo
        .list_video_games(&compiled)
        .await
        .map_err(ApiError::from_data)?;
    let records = RecordAssembler::new(&*repo)
        .video_games(rows)
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(records))
}

/// Get a video game by ID
#[utoipa::path(
    get,
    path = "/api/v1/video-games/{id}",
    tag = "video-games",
    params(("id" = i64, Path, description = "Video game ID")),
    responses(
        (status = 200, description = "Video game details", body = VideoGameRecord),
        (status = 404, description = "Video game not found")
    )
)]
pub async fn get_video_game(
    State(state): State<CollectionApiState>,
    IdPath(id): IdPath,
) -> Result<Json<VideoGameRecord>, ApiError> {
    let repo = state.database.repository();
    let row = repo
        .get_video_game(id, false)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| video_game_not_found(id))?;
    let record = RecordAssembler::new(&*repo)
        .video_game(row)
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(record))
}

/// Replace a video game's fields and custom values
#[utoipa::path(
    put,
    path = "/api/v1/video-games/{id}",
    tag = "video-games",
    params(("id" = i64, Path, description = "Video game ID")),
    request_body = VideoGameRequest,
    responses(
        (status = 200, description = "Video game updated", body = VideoGameRecord),
        (status = 400, description = "Invalid request or unknown system"),
        (status = 404, description = "Video game not found")
    )
)]
pub async fn update_video_game(
    State(state): State<CollectionApiState>,
    IdPath(id): IdPath,
    ValidatedJson(body): ValidatedJson<VideoGameRequest>,
) -> Result<Json<VideoGameRecord>, ApiError> {
    let repo = state.database.repository();
    let row = repo
        .update_video_game(id, &(&body).into())
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| video_game_not_found(id))?;
    let record = RecordAssembler::new(&*repo)
        .video_game(row)
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(record))
}

/// Soft delete a video game
#[utoipa::path(
    delete,
    path = "/api/v1/video-games/{id}",
    tag = "video-games",
    params(("id" = i64, Path, description = "Video game ID")),
    responses(
        (status = 204, description = "Video game deleted"),
        (status = 404, description = "Video game not found")
    )
)]
pub async fn delete_video_game(
    State(state): State<CollectionApiState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .database
        .repository()
        .delete_video_game(id)
        .await
        .map_err(ApiError::from_data)?;
    if !deleted {
        return Err(video_game_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
