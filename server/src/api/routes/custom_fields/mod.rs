//! Custom field API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use types::{CreateCustomFieldRequest, ListCustomFieldsQuery, RenameCustomFieldRequest};

use crate::api::extractors::{IdPath, ValidatedJson, ValidatedQuery};
use crate::api::types::ApiError;
use crate::data::TransactionalService;
use crate::domain::filters::{ResourceKey, is_reserved_field_name};
use crate::domain::records::CustomFieldRecord;

#[derive(Clone)]
pub struct CustomFieldsApiState {
    pub database: Arc<TransactionalService>,
}

/// Build custom field routes
pub fn routes(database: Arc<TransactionalService>) -> Router<()> {
    let state = CustomFieldsApiState { database };
    Router::new()
        .route("/", get(list_custom_fields).post(create_custom_field))
        .route(
            "/{id}",
            get(get_custom_field)
                .put(rename_custom_field)
                .delete(delete_custom_field),
        )
        .with_state(state)
}

fn custom_field_not_found(id: i64) -> ApiError {
    ApiError::not_found(
        "CUSTOM_FIELD_NOT_FOUND",
        format!("Custom field not found: {}", id),
    )
}

/// Reject names already taken by the resource's standard fields
fn ensure_name_available(entity_key: &str, name: &str) -> Result<(), ApiError> {
    match ResourceKey::parse(entity_key) {
        Some(resource) if is_reserved_field_name(resource, name) => Err(ApiError::bad_request(
            "RESERVED_FIELD_NAME",
            format!("'{}' is a standard field of '{}'", name, resource),
        )),
        _ => Ok(()),
    }
}

/// List custom field definitions
#[utoipa::path(
    get,
    path = "/api/v1/custom-fields",
    tag = "custom-fields",
    params(ListCustomFieldsQuery),
    responses(
        (status = 200, description = "Custom field definitions", body = Vec<CustomFieldRecord>),
        (status = 400, description = "Unknown resource key")
    )
)]
pub async fn list_custom_fields(
    State(state): State<CustomFieldsApiState>,
    ValidatedQuery(query): ValidatedQuery<ListCustomFieldsQuery>,
) -> Result<Json<Vec<CustomFieldRecord>>, ApiError> {
    let rows = state
        .database
        .repository()
        .list_custom_fields(query.key.as_deref())
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(rows.into_iter().map(CustomFieldRecord::from).collect()))
}

/// Define a custom field for a resource
#[utoipa::path(
    post,
    path = "/api/v1/custom-fields",
    tag = "custom-fields",
    request_body = CreateCustomFieldRequest,
    responses(
        (status = 201, description = "Custom field created", body = CustomFieldRecord),
        (status = 400, description = "Invalid request or reserved name"),
        (status = 409, description = "Name already used for this resource")
    )
)]
pub async fn create_custom_field(
    State(state): State<CustomFieldsApiState>,
    ValidatedJson(body): ValidatedJson<CreateCustomFieldRequest>,
) -> Result<(StatusCode, Json<CustomFieldRecord>), ApiError> {
    let name = body.name.trim();
    ensure_name_available(&body.entity_key, name)?;
    let row = state
        .database
        .repository()
        .create_custom_field(name, body.field_type, &body.entity_key)
        .await
        .map_err(ApiError::from_data)?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Get a custom field definition by ID
#[utoipa::path(
    get,
    path = "/api/v1/custom-fields/{id}",
    tag = "custom-fields",
    params(("id" = i64, Path, description = "Custom field ID")),
    responses(
        (status = 200, description = "Custom field definition", body = CustomFieldRecord),
        (status = 404, description = "Custom field not found")
    )
)]
pub async fn get_custom_field(
    State(state): State<CustomFieldsApiState>,
    IdPath(id): IdPath,
) -> Result<Json<CustomFieldRecord>, ApiError> {
    let row = state
        .database
        .repository()
        .get_custom_field(id)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| custom_field_not_found(id))?;
    Ok(Json(row.into()))
}

/// Rename a custom field. Type and resource cannot change.
#[utoipa::path(
    put,
    path = "/api/v1/custom-fields/{id}",
    tag = "custom-fields",
    params(("id" = i64, Path, description = "Custom field ID")),
    request_body = RenameCustomFieldRequest,
    responses(
        (status = 200, description = "Custom field renamed", body = CustomFieldRecord),
        (status = 400, description = "Invalid request or reserved name"),
        (status = 404, description = "Custom field not found"),
        (status = 409, description = "Name already used for this resource")
    )
)]
pub async fn rename_custom_field(
    State(state): State<CustomFieldsApiState>,
    IdPath(id): IdPath,
    ValidatedJson(body): ValidatedJson<RenameCustomFieldRequest>,
) -> Result<Json<CustomFieldRecord>, ApiError> {
    let repo = state.database.repository();
    let current = repo
        .get_custom_field(id)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| custom_field_not_found(id))?;
    let name = body.name.trim();
    ensure_name_available(&current.entity_key, name)?;

    let row = repo
        .rename_custom_field(id, name)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| custom_field_not_found(id))?;
    Ok(Json(row.into()))
}

/// Delete a custom field and every value stored for it
#[utoipa::path(
    delete,
    path = "/api/v1/custom-fields/{id}",
    tag = "custom-fields",
    params(("id" = i64, Path, description = "Custom field ID")),
    responses(
        (status = 204, description = "Custom field deleted"),
        (status = 404, description = "Custom field not found")
    )
)]
pub async fn delete_custom_field(
    State(state): State<CustomFieldsApiState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .database
        .repository()
        .delete_custom_field(id)
        .await
        .map_err(ApiError::from_data)?;
    if !deleted {
        return Err(custom_field_not_found(id));
    }
    tracing::info!(id, "Custom field deleted");
    Ok(StatusCode::NO_CONTENT)
}
