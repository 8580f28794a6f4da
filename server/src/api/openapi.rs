//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{
    backup, custom_fields, filters, health, systems, toys, video_game_boxes, video_games,
};
use crate::data::CustomFieldType;
use crate::domain::backup::{
    BackupSnapshot, EntityCounts, ImportErrors, ImportOutcome, ImportReport, VideoGameCounts,
};
use crate::domain::filters::{FieldAdvertisement, FieldType, FilterOperator, ResourceKey};
use crate::domain::records::{
    CustomFieldRecord, CustomFieldValueRecord, SystemRecord, ToyRecord, VideoGameBoxRecord,
    VideoGameRecord,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hoard API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Personal collection catalog"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "custom-fields", description = "User-defined fields per resource"),
        (name = "toys", description = "Toys"),
        (name = "systems", description = "Game systems"),
        (name = "video-games", description = "Video games"),
        (name = "video-game-boxes", description = "Video game boxes and their games"),
        (name = "filters", description = "Filterable fields and operators"),
        (name = "backup", description = "Snapshot export and import")
    ),
    paths(
        health::health,
        custom_fields::list_custom_fields,
        custom_fields::create_custom_field,
        custom_fields::get_custom_field,
        custom_fields::rename_custom_field,
        custom_fields::delete_custom_field,
        toys::list_toys,
        toys::create_toy,
        toys::get_toy,
        toys::update_toy,
        toys::delete_toy,
        systems::list_systems,
        systems::create_system,
        systems::get_system,
        systems::update_system,
        systems::delete_system,
        video_games::list_video_games,
        video_games::get_video_game,
        video_games::update_video_game,
        video_games::delete_video_game,
        video_game_boxes::list_video_game_boxes,
        video_game_boxes::create_video_game_box,
        video_game_boxes::get_video_game_box,
        video_game_boxes::delete_video_game_box,
        filters::list_advertisements,
        filters::get_advertisement,
        backup::export_backup,
        backup::import_backup,
    ),
    components(schemas(
        health::HealthResponse,
        // Shared request parts
        crate::api::routes::CustomFieldValueInput,
        // Custom fields
        CustomFieldType,
        CustomFieldRecord,
        CustomFieldValueRecord,
        custom_fields::types::CreateCustomFieldRequest,
        custom_fields::types::RenameCustomFieldRequest,
        // Entities
        ToyRecord,
        toys::types::ToyRequest,
        SystemRecord,
        systems::types::SystemRequest,
        VideoGameRecord,
        video_games::types::VideoGameRequest,
        VideoGameBoxRecord,
        video_game_boxes::types::VideoGameBoxRequest,
        video_game_boxes::types::NewVideoGameRequest,
        // Filters
        ResourceKey,
        FieldType,
        FilterOperator,
        FieldAdvertisement,
        // Backup
        BackupSnapshot,
        ImportOutcome,
        EntityCounts,
        VideoGameCounts,
        ImportErrors,
        ImportReport,
        backup::types::ImportResponse,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Hoard API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true,
                showExtensions: true,
                showCommonExtensions: true
            });
        };
    </script>
</body>
</html>"#;
