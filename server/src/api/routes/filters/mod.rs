//! Filter discovery endpoints
//!
//! Advertise, per resource, which fields can be filtered and with which operators.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::types::ApiError;
use crate::domain::filters::{FieldAdvertisement, FilterService, ResourceKey};

#[derive(Clone)]
pub struct FiltersApiState {
    pub filters: Arc<FilterService>,
}

/// Build filter discovery routes
pub fn routes(filters: Arc<FilterService>) -> Router<()> {
    let state = FiltersApiState { filters };
    Router::new()
        .route("/", get(list_advertisements))
        .route("/{resource}", get(get_advertisement))
        .with_state(state)
}

/// Filterable fields and operators of every resource
#[utoipa::path(
    get,
    path = "/api/v1/filters",
    tag = "filters",
    responses(
        (status = 200, description = "Advertisement per resource key", body = BTreeMap<String, FieldAdvertisement>)
    )
)]
pub async fn list_advertisements(
    State(state): State<FiltersApiState>,
) -> Result<Json<BTreeMap<ResourceKey, FieldAdvertisement>>, ApiError> {
    let all = state
        .filters
        .advertise_all()
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(all))
}

/// Filterable fields and operators of one resource
///
/// Unknown resources have nothing to filter and get an empty advertisement.
#[utoipa::path(
    get,
    path = "/api/v1/filters/{resource}",
    tag = "filters",
    params(("resource" = String, Path, description = "Resource key, e.g. video_game_box")),
    responses(
        (status = 200, description = "Advertisement of the resource", body = FieldAdvertisement)
    )
)]
pub async fn get_advertisement(
    State(state): State<FiltersApiState>,
    Path(resource): Path<String>,
) -> Result<Json<FieldAdvertisement>, ApiError> {
    let catalog = state
        .filters
        .field_catalog(&resource)
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(catalog.advertise()))
}
