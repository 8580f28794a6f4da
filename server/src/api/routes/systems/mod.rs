//! System API endpoints

pub mod types;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use types::SystemRequest;

use super::{CollectionApiState, ListQuery};
use crate::api::extractors::{IdPath, ValidatedJson, ValidatedQuery};
use crate::api::types::ApiError;
use crate::domain::filters::ResourceKey;
use crate::domain::records::SystemRecord;

/// Build system routes
pub fn routes(state: CollectionApiState) -> Router<()> {
    Router::new()
        .route("/", get(list_systems).post(create_system))
        .route(
            "/{id}",
            get(get_system).put(update_system).delete(delete_system),
        )
        .with_state(state)
}

fn system_not_found(id: i64) -> ApiError {
    ApiError::not_found("SYSTEM_NOT_FOUND", format!("System not found: {}", id))
}

/// List systems matching the given filters
#[utoipa::path(
    get,
    path = "/api/v1/systems",
    tag = "systems",
    params(ListQuery),
    responses(
        (status = 200, description = "Matching systems", body = Vec<SystemRecord>),
        (status = 400, description = "Invalid filters")
    )
)]
pub async fn list_systems(
    State(state): State<CollectionApiState>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> Result<Json<Vec<SystemRecord>>, ApiError> {
    let compiled = state
        .compile_filters(ResourceKey::System, query.filters.as_deref())
        .await?;
    let rows = state
        .database
        .repository()
        .list_systems(&compiled)
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(rows.into_iter().map(SystemRecord::from).collect()))
}

/// Create a system
#[utoipa::path(
    post,
    path = "/api/v1/systems",
    tag = "systems",
    request_body = SystemRequest,
    responses(
        (status = 201, description = "System created", body = SystemRecord),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "A system with this name already exists")
    )
)]
pub async fn create_system(
    State(state): State<CollectionApiState>,
    ValidatedJson(body): ValidatedJson<SystemRequest>,
) -> Result<(StatusCode, Json<SystemRecord>), ApiError> {
    let row = state
        .database
        .repository()
        .create_system(&(&body).into())
        .await
        .map_err(ApiError::from_data)?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Get a system by ID
#[utoipa::path(
    get,
    path = "/api/v1/systems/{id}",
    tag = "systems",
    params(("id" = i64, Path, description = "System ID")),
    responses(
        (status = 200, description = "System details", body = SystemRecord),
        (status = 404, description = "System not found")
    )
)]
pub async fn get_system(
    State(state): State<CollectionApiState>,
    IdPath(id): IdPath,
) -> Result<Json<SystemRecord>, ApiError> {
    let row = state
        .database
        .repository()
        .get_system(id, false)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| system_not_found(id))?;
    Ok(Json(row.into()))
}

/// Replace a system's fields and custom values
#[utoipa::path(
    put,
    path = "/api/v1/systems/{id}",
    tag = "systems",
    params(("id" = i64, Path, description = "System ID")),
    request_body = SystemRequest,
    responses(
        (status = 200, description = "System updated", body = SystemRecord),
        (status = 404, description = "System not found")
    )
)]
pub async fn update_system(
    State(state): State<CollectionApiState>,
    IdPath(id): IdPath,
    ValidatedJson(body): ValidatedJson<SystemRequest>,
) -> Result<Json<SystemRecord>, ApiError> {
    let row = state
        .database
        .repository()
        .update_system(id, &(&body).into())
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| system_not_found(id))?;
    Ok(Json(row.into()))
}

/// Soft delete a system
#[utoipa::path(
    delete,
    path = "/api/v1/systems/{id}",
    tag = "systems",
    params(("id" = i64, Path, description = "System ID")),
    responses(
        (status = 204, description = "System deleted"),
        (status = 404, description = "System not found")
    )
)]
pub async fn delete_system(
    State(state): State<CollectionApiState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .database
        .repository()
        .delete_system(id)
        .await
        .map_err(ApiError::from_data)?;
    if !deleted {
        return Err(system_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::routes::test_support::{filters_query, router, send};

    #[tokio::test]
    async fn test_system_with_custom_field_values() {
        let app = router().await;
        let (status, field) = send(
            &app,
            "POST",
            "/api/v1/custom-fields",
            Some(json!({"name": "Region", "type": "text", "entityKey": "system"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let field_id = field["id"].as_i64().unwrap();

        let (status, created) = send(
            &app,
            "POST",
            "/api/v1/systems",
            Some(json!({
                "name": "SNES",
                "generation": 4,
                "customFieldValues": [{"customFieldId": field_id, "value": "PAL"}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["handheld"], false);
        let values = created["customFieldValues"].as_array().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["customFieldName"], "Region");
        assert_eq!(values[0]["customFieldType"], "text");

        let query = filters_query(json!([
            {"fieldType": "text", "field": "Region", "operator": "equals", "operand": "PAL", "customField": true}
        ]));
        let (status, body) = send(&app, "GET", &format!("/api/v1/systems?{}", query), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_value_for_wrong_entity_is_rejected() {
        let app = router().await;
        let (_, field) = send(
            &app,
            "POST",
            "/api/v1/custom-fields",
            Some(json!({"name": "Boxed", "type": "boolean", "entityKey": "toy"})),
        )
        .await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/systems",
            Some(json!({
                "name": "N64",
                "generation": 5,
                "customFieldValues": [{"customFieldId": field["id"], "value": "true"}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_update_and_delete_system() {
        let app = router().await;
        let (_, created) = send(
            &app,
            "POST",
            "/api/v1/systems",
            Some(json!({"name": "Game Boy", "generation": 4, "handheld": true})),
        )
        .await;
        let uri = format!("/api/v1/systems/{}", created["id"]);

        let (status, updated) = send(
            &app,
            "PUT",
            &uri,
            Some(json!({"name": "Game Boy", "generation": 4, "handheld": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["handheld"], false);

        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_system_is_not_found() {
        let app = router().await;
        let (status, body) = send(&app, "PUT", "/api/v1/systems/99", Some(json!({"name": "X", "generation": 1}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "SYSTEM_NOT_FOUND");
    }
}
