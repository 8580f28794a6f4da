//! Backup export: the live (non-deleted) collection in snapshot shape

use std::sync::Arc;

use crate::data::{CompiledQuery, DataError, TransactionalService};
use crate::domain::records::RecordAssembler;

use super::types::BackupSnapshot;

pub struct BackupExportService {
    database: Arc<TransactionalService>,
}

impl BackupExportService {
    pub fn new(database: Arc<TransactionalService>) -> Self {
        Self { database }
    }

    pub async fn export_backup_data(&self) -> Result<BackupSnapshot, DataError> {
        let repo = self.database.repository();
        let all = CompiledQuery::default();

        let custom_fields = repo.list_custom_fields(None).await?;
        let toys = repo.list_toys(&all).await?;
        let systems = repo.list_systems(&all).await?;
        let boxes = repo.list_video_game_boxes(&all).await?;

        let mut assembler = RecordAssembler::new(&*repo);
        let video_game_boxes = assembler.video_game_boxes(boxes).await?;

        let snapshot = BackupSnapshot {
            custom_fields: custom_fields.into_iter().map(Into::into).collect(),
            toys: toys.into_iter().map(Into::into).collect(),
            systems: systems.into_iter().map(Into::into).collect(),
            video_game_boxes,
        };
        tracing::debug!(
            custom_fields = snapshot.custom_fields.len(),
            toys = snapshot.toys.len(),
            systems = snapshot.systems.len(),
            video_game_boxes = snapshot.video_game_boxes.len(),
            "Exported backup"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backup::{BackupImportService, ImportOutcome};

    const SNAPSHOT: &str = r#"{
        "customFields": [
            {"id": 1, "name": "Color", "type": "text", "entityKey": "toy"},
            {"id": 2, "name": "Rating", "type": "number", "entityKey": "video_game"}
        ],
        "toys": [{"id": 3, "name": "Woody", "set": "Toy Story",
                  "customFieldValues": [{"customFieldId": 1, "value": "brown"}]}],
        "systems": [{"id": 2, "name": "SNES", "generation": 4, "handheld": false}],
        "videoGameBoxes": [
            {"id": 9, "title": "Chrono Trigger", "system": {"id": 2}, "isPhysical": true,
             "videoGames": [{"id": 5, "title": "Chrono Trigger", "system": {"id": 2},
                             "customFieldValues": [{"customFieldId": 2, "value": "10"}]}]}
        ]
    }"#;

    #[tokio::test]
    async fn test_export_then_import_into_fresh_store() {
        let source = TransactionalService::in_memory().await;
        let snapshot: BackupSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        let report = BackupImportService::new(source.clone())
            .import_backup_data(&snapshot)
            .await;
        assert_eq!(report.outcome, ImportOutcome::Complete);

        let exported = BackupExportService::new(source)
            .export_backup_data()
            .await
            .unwrap();
        assert_eq!(exported.custom_fields.len(), 2);
        assert_eq!(exported.toys[0].custom_field_values[0].custom_field_name, "Color");
        let game = &exported.video_game_boxes[0].video_games[0];
        assert_eq!(game.system.name, "SNES");
        assert_eq!(game.custom_field_values[0].value, "10");

        let target = TransactionalService::in_memory().await;
        let report = BackupImportService::new(target)
            .import_backup_data(&exported)
            .await;
        assert_eq!(report.outcome, ImportOutcome::Complete);
        assert_eq!(report.custom_fields.created, 2);
        assert_eq!(report.toys.created, 1);
        assert_eq!(report.systems.created, 1);
        assert_eq!(report.video_game_boxes.created, 1);
        assert_eq!(report.video_games.created, 1);
    }

    #[tokio::test]
    async fn test_export_skips_deleted_rows() {
        let db = TransactionalService::in_memory().await;
        let snapshot: BackupSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        let (_, maps) = BackupImportService::new(db.clone())
            .reconcile(&snapshot)
            .await;
        let toy_id = maps.toys.get(3).unwrap();
        assert!(db.repository().delete_toy(toy_id).await.unwrap());

        let exported = BackupExportService::new(db).export_backup_data().await.unwrap();
        assert!(exported.toys.is_empty());
        assert_eq!(exported.systems.len(), 1);
    }
}
