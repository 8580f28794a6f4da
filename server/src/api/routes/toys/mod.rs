//! Toy API endpoints

pub mod types;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use types::ToyRequest;

use super::{CollectionApiState, ListQuery};
use crate::api::extractors::{IdPath, ValidatedJson, ValidatedQuery};
use crate::api::types::ApiError;
use crate::domain::filters::ResourceKey;
use crate::domain::records::ToyRecord;

/// Build toy routes
pub fn routes(state: CollectionApiState) -> Router<()> {
    Router::new()
        .route("/", get(list_toys).post(create_toy))
        .route("/{id}", get(get_toy).put(update_toy).delete(delete_toy))
        .with_state(state)
}

fn toy_not_found(id: i64) -> ApiError {
    ApiError::not_found("TOY_NOT_FOUND", format!("Toy not found: {}", id))
}

/// List toys matching the given filters
#[utoipa::path(
    get,
    path = "/api/v1/toys",
    tag = "toys",
    params(ListQuery),
    responses(
        (status = 200, description = "Matching toys", body = Vec<ToyRecord>),
        (status = 400, description = "Invalid filters")
    )
)]
pub async fn list_toys(
    State(state): State<CollectionApiState>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> Result<Json<Vec<ToyRecord>>, ApiError> {
    let compiled = state
        .compile_filters(ResourceKey::Toy, query.filters.as_deref())
        .await?;
    let rows = state
        .database
        .repository()
        .list_toys(&compiled)
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(rows.into_iter().map(ToyRecord::from).collect()))
}

/// Create a toy
#[utoipa::path(
    post,
    path = "/api/v1/toys",
    tag = "toys",
    request_body = ToyRequest,
    responses(
        (status = 201, description = "Toy created", body = ToyRecord),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "A toy with this name and set already exists")
    )
)]
pub async fn create_toy(
    State(state): State<CollectionApiState>,
    ValidatedJson(body): ValidatedJson<ToyRequest>,
) -> Result<(StatusCode, Json<ToyRecord>), ApiError> {
    let row = state
        .database
        .repository()
        .create_toy(&(&body).into())
        .await
        .map_err(ApiError::from_data)?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Get a toy by ID
#[utoipa::path(
    get,
    path = "/api/v1/toys/{id}",
    tag = "toys",
    params(("id" = i64, Path, description = "Toy ID")),
    responses(
        (status = 200, description = "Toy details", body = ToyRecord),
        (status = 404, description = "Toy not found")
    )
)]
pub async fn get_toy(
    State(state): State<CollectionApiState>,
    IdPath(id): IdPath,
) -> Result<Json<ToyRecord>, ApiError> {
    let row = state
        .database
        .repository()
        .get_toy(id, false)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| toy_not_found(id))?;
    Ok(Json(row.into()))
}

/// Replace a toy's fields and custom values
#[utoipa::path(
    put,
    path = "/api/v1/toys/{id}",
    tag = "toys",
    params(("id" = i64, Path, description = "Toy ID")),
    request_body = ToyRequest,
    responses(
        (status = 200, description = "Toy updated", body = ToyRecord),
        (status = 404, description = "Toy not found")
    )
)]
pub async fn update_toy(
    State(state): State<CollectionApiState>,
    IdPath(id): IdPath,
    ValidatedJson(body): ValidatedJson<ToyRequest>,
) -> Result<Json<ToyRecord>, ApiError> {
    let row = state
        .database
        .repository()
        .update_toy(id, &(&body).into())
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| toy_not_found(id))?;
    Ok(Json(row.into()))
}

/// Soft delete a toy
#[utoipa::path(
    delete,
    path = "/api/v1/toys/{id}",
    tag = "toys",
    params(("id" = i64, Path, description = "Toy ID")),
    responses(
        (status = 204, description = "Toy deleted"),
        (status = 404, description = "Toy not found")
    )
)]
pub async fn delete_toy(
    State(state): State<CollectionApiState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .database
        .repository()
        .delete_toy(id)
        .await
        .map_err(ApiError::from_data)?;
    if !deleted {
        return Err(toy_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::routes::test_support::{filters_query, router, send};

    #[tokio::test]
    async fn test_toy_crud() {
        let app = router().await;

        let (status, created) = send(
            &app,
            "POST",
            "/api/v1/toys",
            Some(json!({"name": "Woody", "set": "Toy Story"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().unwrap();
        assert_eq!(created["set"], "Toy Story");

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/toys",
            Some(json!({"name": "Woody", "set": "Toy Story"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/api/v1/toys/{}", id),
            Some(json!({"name": "Sheriff Woody", "set": "Toy Story"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Sheriff Woody");

        let (status, _) = send(&app, "DELETE", &format!("/api/v1/toys/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = send(&app, "GET", &format!("/api/v1/toys/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "TOY_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_list_toys_with_filters() {
        let app = router().await;
        for (name, set) in [("Woody", "Toy Story"), ("Buzz", "Toy Story"), ("Rex", "Toy Story 2")] {
            send(&app, "POST", "/api/v1/toys", Some(json!({"name": name, "set": set}))).await;
        }

        let query = filters_query(json!([
            {"fieldType": "pagination", "field": "pagination_fields", "operator": "limit", "operand": "1"},
            {"fieldType": "text", "field": "set", "operator": "equals", "operand": "Toy Story"},
            {"fieldType": "text", "field": "name", "operator": "order_by", "operand": ""}
        ]));
        let (status, body) = send(&app, "GET", &format!("/api/v1/toys?{}", query), None).await;
        assert_eq!(status, StatusCode::OK);
        let toys = body.as_array().unwrap();
        assert_eq!(toys.len(), 1);
        assert_eq!(toys[0]["name"], "Buzz");
    }

    #[tokio::test]
    async fn test_invalid_filters_are_aggregated() {
        let app = router().await;
        let query = filters_query(json!([
            {"fieldType": "number", "field": "name", "operator": "equals", "operand": "1"},
            {"fieldType": "pagination", "field": "pagination_fields", "operator": "offset", "operand": "5"}
        ]));
        let (status, body) = send(&app, "GET", &format!("/api/v1/toys?{}", query), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_FILTERS");
        let errors = body["errors"].as_array().unwrap();
        assert!(errors.len() >= 2);
        assert!(
            errors
                .iter()
                .any(|e| e.as_str().unwrap().contains("offset filter is not allowed"))
        );
    }

    #[tokio::test]
    async fn test_malformed_filters_json() {
        let app = router().await;
        let (status, body) = send(&app, "GET", "/api/v1/toys?filters=nope", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_FILTER_JSON");
    }

    #[tokio::test]
    async fn test_non_positive_id_rejected() {
        let app = router().await;
        let (status, body) = send(&app, "GET", "/api/v1/toys/0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ID");
    }
}
