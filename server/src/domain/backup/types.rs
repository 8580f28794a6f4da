use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::records::{CustomFieldRecord, SystemRecord, ToyRecord, VideoGameBoxRecord};

/// Exported dataset, keyed by origin IDs
///
/// Video games are not listed on their own: each is carried inside the
/// boxes that contain it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackupSnapshot {
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldRecord>,
    #[serde(default)]
    pub toys: Vec<ToyRecord>,
    #[serde(default)]
    pub systems: Vec<SystemRecord>,
    #[serde(default)]
    pub video_game_boxes: Vec<VideoGameBoxRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_sections_default_to_empty() {
        let snapshot: BackupSnapshot =
            serde_json::from_str(r#"{"toys": [{"id": 1, "name": "Rex", "set": "Toy Story"}]}"#)
                .unwrap();
        assert_eq!(snapshot.toys.len(), 1);
        assert!(snapshot.custom_fields.is_empty());
        assert!(snapshot.video_game_boxes.is_empty());
    }

    #[test]
    fn test_snapshot_ignores_timestamps() {
        let json = r#"{
            "systems": [{"id": 2, "name": "SNES", "generation": 4, "handheld": false,
                         "createdAt": "2024-01-01 00:00:00", "updatedAt": "2024-01-02 00:00:00",
                         "customFieldValues": []}]
        }"#;
        let snapshot: BackupSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.systems[0].name, "SNES");
    }
}
