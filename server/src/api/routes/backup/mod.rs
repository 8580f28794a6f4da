//! Backup export and import endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::routing::get;
use axum::{Json, Router};

use types::ImportResponse;

use crate::api::types::ApiError;
use crate::core::config::ImportConfig;
use crate::data::TransactionalService;
use crate::domain::backup::{BackupExportService, BackupImportService, BackupSnapshot};

#[derive(Clone)]
pub struct BackupApiState {
    pub export: Arc<BackupExportService>,
    pub import: Arc<BackupImportService>,
}

/// Build backup routes
///
/// Snapshots can be much larger than regular request bodies, so the import
/// route carries its own body limit.
pub fn routes(database: Arc<TransactionalService>, config: &ImportConfig) -> Router<()> {
    let state = BackupApiState {
        export: Arc::new(BackupExportService::new(Arc::clone(&database))),
        import: Arc::new(BackupImportService::new(database)),
    };
    Router::new()
        .route("/", get(export_backup).post(import_backup))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .with_state(state)
}

/// Export the live collection as a snapshot
#[utoipa::path(
    get,
    path = "/api/v1/backup",
    tag = "backup",
    responses(
        (status = 200, description = "Snapshot of all non-deleted data", body = BackupSnapshot)
    )
)]
pub async fn export_backup(
    State(state): State<BackupApiState>,
) -> Result<Json<BackupSnapshot>, ApiError> {
    let snapshot = state
        .export
        .export_backup_data()
        .await
        .map_err(ApiError::from_data)?;
    Ok(Json(snapshot))
}

/// Import a snapshot, merging it into the current collection
///
/// Always answers 200 once the snapshot parses; per-row problems and an
/// aborted custom field stage are described in the report.
#[utoipa::path(
    post,
    path = "/api/v1/backup",
    tag = "backup",
    request_body = BackupSnapshot,
    responses(
        (status = 200, description = "Import report", body = ImportResponse),
        (status = 413, description = "Snapshot exceeds the import body limit")
    )
)]
pub async fn import_backup(
    State(state): State<BackupApiState>,
    Json(snapshot): Json<BackupSnapshot>,
) -> Json<ImportResponse> {
    let report = state.import.import_backup_data(&snapshot).await;
    tracing::info!(
        outcome = ?report.outcome,
        errors = report.error_count(),
        "Backup import finished"
    );
    Json(report.into())
}
