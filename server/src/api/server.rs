//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::response::Redirect;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{
    CollectionApiState, backup, custom_fields, filters, health, systems, toys, video_game_boxes,
    video_games,
};
use crate::core::CoreApp;
use crate::core::config::{FiltersConfig, ImportConfig};
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::data::TransactionalService;
use crate::domain::FilterService;

/// All API routes, without the transport layers added by `ApiServer`
pub fn api_router(
    database: Arc<TransactionalService>,
    filters_config: &FiltersConfig,
    import_config: &ImportConfig,
) -> Router {
    let filter_service = Arc::new(FilterService::new(Arc::clone(&database)));
    let collection = CollectionApiState {
        database: Arc::clone(&database),
        filters: Arc::clone(&filter_service),
        max_filters: filters_config.max_filters,
    };

    Router::new()
        .route("/", get(|| async { Redirect::temporary("/api/docs") }))
        .route(
            "/api/v1/health",
            get(health::health).with_state(Arc::clone(&database)),
        )
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .route("/api/docs/", get(swagger_ui_html))
        .nest(
            "/api/v1/custom-fields",
            custom_fields::routes(Arc::clone(&database)),
        )
        .nest("/api/v1/toys", toys::routes(collection.clone()))
        .nest("/api/v1/systems", systems::routes(collection.clone()))
        .nest("/api/v1/video-games", video_games::routes(collection.clone()))
        .nest(
            "/api/v1/video-game-boxes",
            video_game_boxes::routes(collection),
        )
        .nest("/api/v1/filters", filters::routes(filter_service))
        .nest("/api/v1/backup", backup::routes(database, import_config))
        .fallback(middleware::handle_404)
}

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);

        let router = api_router(
            Arc::clone(&app.database),
            &app.config.filters,
            &app.config.import,
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(middleware::cors(&allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT));

        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(%addr, "API server listening");
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}
