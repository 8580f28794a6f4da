//! Repository trait for the collection store
//!
//! Domain services depend on this trait, never on a concrete backend.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::types::{
    CompiledQuery, CreatedVideoGameBox, CustomFieldRow, CustomFieldType, NewSystem, NewToy,
    NewVideoGame, NewVideoGameBox, SystemRow, ToyRow, VideoGameBoxRow, VideoGameRow,
};

/// Repository trait for collection operations (custom fields and entities)
///
/// Implemented by the SQLite backend.
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    // ==================== Custom Field Operations ====================

    /// List custom field definitions, optionally for one entity key
    async fn list_custom_fields(
        &self,
        entity_key: Option<&str>,
    ) -> Result<Vec<CustomFieldRow>, DataError>;

    async fn get_custom_field(&self, id: i64) -> Result<Option<CustomFieldRow>, DataError>;

    /// Look up a definition by its natural key
    async fn get_custom_field_by_name_and_key(
        &self,
        name: &str,
        entity_key: &str,
    ) -> Result<Option<CustomFieldRow>, DataError>;

    async fn create_custom_field(
        &self,
        name: &str,
        field_type: CustomFieldType,
        entity_key: &str,
    ) -> Result<CustomFieldRow, DataError>;

    async fn rename_custom_field(
        &self,
        id: i64,
        name: &str,
    ) -> Result<Option<CustomFieldRow>, DataError>;

    /// Delete a definition and all of its values
    async fn delete_custom_field(&self, id: i64) -> Result<bool, DataError>;

    // ==================== Toy Operations ====================

    async fn list_toys(&self, compiled: &CompiledQuery) -> Result<Vec<ToyRow>, DataError>;

    async fn get_toy(&self, id: i64, include_deleted: bool) -> Result<Option<ToyRow>, DataError>;

    /// Find a live toy by (name, set)
    async fn find_toy_id(&self, name: &str, set: &str) -> Result<Option<i64>, DataError>;

    async fn create_toy(&self, input: &NewToy) -> Result<ToyRow, DataError>;

    async fn update_toy(&self, id: i64, input: &NewToy) -> Result<Option<ToyRow>, DataError>;

    async fn delete_toy(&self, id: i64) -> Result<bool, DataError>;

    // ==================== System Operations ====================

    async fn list_systems(&self, compiled: &CompiledQuery) -> Result<Vec<SystemRow>, DataError>;

    async fn get_system(
        &self,
        id: i64,
        include_deleted: bool,
    ) -> Result<Option<SystemRow>, DataError>;

    /// Find a live system by name
    async fn find_system_id(&self, name: &str) -> Result<Option<i64>, DataError>;

    async fn create_system(&self, input: &NewSystem) -> Result<SystemRow, DataError>;

    async fn update_system(
        &self,
        id: i64,
        input: &NewSystem,
    ) -> Result<Option<SystemRow>, DataError>;

    async fn delete_system(&self, id: i64) -> Result<bool, DataError>;

    // ==================== Video Game Operations ====================

    async fn list_video_games(
        &self,
        compiled: &CompiledQuery,
    ) -> Result<Vec<VideoGameRow>, DataError>;

    async fn get_video_game(
        &self,
        id: i64,
        include_deleted: bool,
    ) -> Result<Option<VideoGameRow>, DataError>;

    async fn update_video_game(
        &self,
        id: i64,
        input: &NewVideoGame,
    ) -> Result<Option<VideoGameRow>, DataError>;

    async fn delete_video_game(&self, id: i64) -> Result<bool, DataError>;

    // ==================== Video Game Box Operations ====================

    async fn list_video_game_boxes(
        &self,
        compiled: &CompiledQuery,
    ) -> Result<Vec<VideoGameBoxRow>, DataError>;

    async fn get_video_game_box(
        &self,
        id: i64,
        include_deleted: bool,
    ) -> Result<Option<VideoGameBoxRow>, DataError>;

    /// Find a live box by (title, system)
    async fn find_video_game_box_id(
        &self,
        title: &str,
        system_id: i64,
    ) -> Result<Option<i64>, DataError>;

    /// Create a box together with its new games, atomically
    async fn create_video_game_box(
        &self,
        input: &NewVideoGameBox,
    ) -> Result<CreatedVideoGameBox, DataError>;

    async fn delete_video_game_box(&self, id: i64) -> Result<bool, DataError>;
}
