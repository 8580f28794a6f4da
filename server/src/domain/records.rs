//! Response-shaped entity records
//!
//! These are the JSON shapes served by the entity endpoints and written to
//! backup snapshots. Relationships are embedded (a game carries its system,
//! a box carries its system and games), so a snapshot can be re-imported
//! using origin IDs only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::types::{
    CustomFieldRow, CustomFieldType, CustomFieldValueRow, SystemRow, ToyRow, VideoGameBoxRow,
    VideoGameRow,
};
use crate::data::{CollectionRepository, DataError};

fn default_field_type() -> CustomFieldType {
    CustomFieldType::Text
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldRecord {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: CustomFieldType,
    pub entity_key: String,
}

impl From<CustomFieldRow> for CustomFieldRecord {
    fn from(row: CustomFieldRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            field_type: row.field_type,
            entity_key: row.entity_key,
        }
    }
}

/// Custom field value as attached to an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldValueRecord {
    pub custom_field_id: i64,
    #[serde(default)]
    pub custom_field_name: String,
    #[serde(default = "default_field_type")]
    pub custom_field_type: CustomFieldType,
    pub value: String,
}

impl From<CustomFieldValueRow> for CustomFieldValueRecord {
    fn from(row: CustomFieldValueRow) -> Self {
        Self {
            custom_field_id: row.custom_field_id,
            custom_field_name: row.custom_field_name,
            custom_field_type: row.custom_field_type,
            value: row.value,
        }
    }
}

fn value_records(rows: Vec<CustomFieldValueRow>) -> Vec<CustomFieldValueRecord> {
    rows.into_iter().map(Into::into).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToyRecord {
    pub id: i64,
    pub name: String,
    pub set: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
    #[serde(default)]
    pub custom_field_values: Vec<CustomFieldValueRecord>,
}

impl From<ToyRow> for ToyRecord {
    fn from(row: ToyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            set: row.set,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
            deleted_at: row.deleted_at,
            custom_field_values: value_records(row.custom_field_values),
        }
    }
}

/// System record; when embedded in a game or box only `id` is required
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub generation: i64,
    #[serde(default)]
    pub handheld: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
    #[serde(default)]
    pub custom_field_values: Vec<CustomFieldValueRecord>,
}

impl From<SystemRow> for SystemRecord {
    fn from(row: SystemRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            generation: row.generation,
            handheld: row.handheld,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
            deleted_at: row.deleted_at,
            custom_field_values: value_records(row.custom_field_values),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoGameRecord {
    pub id: i64,
    pub title: String,
    pub system: SystemRecord,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
    #[serde(default)]
    pub custom_field_values: Vec<CustomFieldValueRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoGameBoxRecord {
    pub id: i64,
    pub title: String,
    pub system: SystemRecord,
    #[serde(default)]
    pub is_physical: bool,
    #[serde(default)]
    pub is_collection: bool,
    #[serde(default)]
    pub video_games: Vec<VideoGameRecord>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
    #[serde(default)]
    pub custom_field_values: Vec<CustomFieldValueRecord>,
}

/// Builds records that embed related rows, caching systems per instance
pub struct RecordAssembler<'a> {
    repo: &'a dyn CollectionRepository,
    systems: HashMap<i64, SystemRecord>,
}

impl<'a> RecordAssembler<'a> {
    pub fn new(repo: &'a dyn CollectionRepository) -> Self {
        Self {
            repo,
            systems: HashMap::new(),
        }
    }

    /// Embedded systems may be soft-deleted; the reference still resolves
    async fn system(&mut self, id: i64) -> Result<SystemRecord, DataError> {
        if let Some(system) = self.systems.get(&id) {
            return Ok(system.clone());
        }
        let record: SystemRecord = self
            .repo
            .get_system(id, true)
            .await?
            .ok_or_else(|| DataError::NotFound(format!("system {}", id)))?
            .into();
        self.systems.insert(id, record.clone());
        Ok(record)
    }

    pub async fn video_game(&mut self, row: VideoGameRow) -> Result<VideoGameRecord, DataError> {
        let system = self.system(row.system_id).await?;
        Ok(VideoGameRecord {
            id: row.id,
            title: row.title,
            system,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
            deleted_at: row.deleted_at,
            custom_field_values: value_records(row.custom_field_values),
        })
    }

    pub async fn video_games(
        &mut self,
        rows: Vec<VideoGameRow>,
    ) -> Result<Vec<VideoGameRecord>, DataError> {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(self.video_game(row).await?);
        }
        Ok(records)
    }

    /// Linked games are loaded live; ids whose game has since vanished are dropped
    pub async fn video_game_box(
        &mut self,
        row: VideoGameBoxRow,
    ) -> Result<VideoGameBoxRecord, DataError> {
        let system = self.system(row.system_id).await?;
        let mut video_games = Vec::with_capacity(row.video_game_ids.len());
        for game_id in &row.video_game_ids {
            if let Some(game) = self.repo.get_video_game(*game_id, false).await? {
                video_games.push(self.video_game(game).await?);
            }
        }
        Ok(VideoGameBoxRecord {
            id: row.id,
            title: row.title,
            system,
            is_physical: row.is_physical,
            is_collection: row.is_collection,
            video_games,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
            deleted_at: row.deleted_at,
            custom_field_values: value_records(row.custom_field_values),
        })
    }

    pub async fn video_game_boxes(
        &mut self,
        rows: Vec<VideoGameBoxRow>,
    ) -> Result<Vec<VideoGameBoxRecord>, DataError> {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(self.video_game_box(row).await?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TransactionalService;
    use crate::data::types::{NewSystem, NewVideoGame, NewVideoGameBox};

    #[test]
    fn test_embedded_system_needs_only_id() {
        let json = r#"{"id": 5, "title": "Chrono Trigger", "system": {"id": 2}}"#;
        let game: VideoGameRecord = serde_json::from_str(json).unwrap();
        assert_eq!(game.system.id, 2);
        assert!(game.system.name.is_empty());
        assert!(game.custom_field_values.is_empty());
        assert!(game.created_at.is_none());
    }

    #[test]
    fn test_custom_field_record_uses_type_key() {
        let record = CustomFieldRecord {
            id: 1,
            name: "Color".into(),
            field_type: CustomFieldType::Text,
            entity_key: "toy".into(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["entityKey"], "toy");
    }

    #[test]
    fn test_live_records_omit_deleted_at() {
        let record = ToyRecord {
            id: 1,
            name: "Woody".into(),
            set: "Toy Story".into(),
            created_at: Some("2024-01-01 00:00:00".into()),
            updated_at: Some("2024-01-01 00:00:00".into()),
            deleted_at: None,
            custom_field_values: vec![],
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("deletedAt").is_none());
        assert_eq!(value["createdAt"], "2024-01-01 00:00:00");
    }

    #[tokio::test]
    async fn test_assembler_embeds_system_and_games() {
        let db = TransactionalService::in_memory().await;
        let repo = db.repository();
        let system = repo
            .create_system(&NewSystem {
                name: "SNES".into(),
                generation: 4,
                handheld: false,
                custom_field_values: vec![],
            })
            .await
            .unwrap();
        let created = repo
            .create_video_game_box(&NewVideoGameBox {
                title: "Chrono Trigger".into(),
                system_id: system.id,
                is_physical: true,
                is_collection: false,
                existing_video_game_ids: vec![],
                new_video_games: vec![NewVideoGame {
                    title: "Chrono Trigger".into(),
                    system_id: system.id,
                    custom_field_values: vec![],
                }],
                custom_field_values: vec![],
            })
            .await
            .unwrap();

        let mut assembler = RecordAssembler::new(&*repo);
        let record = assembler
            .video_game_box(created.video_game_box)
            .await
            .unwrap();
        assert_eq!(record.system.name, "SNES");
        assert_eq!(record.video_games.len(), 1);
        assert_eq!(record.video_games[0].system.id, system.id);
    }
}
