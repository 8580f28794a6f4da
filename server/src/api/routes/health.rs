//! Health check endpoint

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use utoipa::ToSchema;

use crate::data::TransactionalService;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether the collection store answered a trivial query
    pub database: bool,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health(State(database): State<Arc<TransactionalService>>) -> impl IntoResponse {
    let reachable = match sqlx::query("SELECT 1").execute(database.pool()).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check query failed");
            false
        }
    };
    let (status, label) = if reachable {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (
        status,
        Json(HealthResponse {
            status: label,
            version: env!("CARGO_PKG_VERSION"),
            database: reachable,
        }),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::api::routes::test_support::{router, send};

    #[tokio::test]
    async fn test_health_reports_database() {
        let app = router().await;
        let (status, body) = send(&app, "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = router().await;
        let (status, body) = send(&app, "GET", "/api/v1/board-games", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "ROUTE_NOT_FOUND");
    }
}
