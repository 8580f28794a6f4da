//! CollectionRepository trait implementation for SQLite

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::traits::CollectionRepository;
use crate::data::types::{
    CompiledQuery, CreatedVideoGameBox, CustomFieldRow, CustomFieldType, NewSystem, NewToy,
    NewVideoGame, NewVideoGameBox, SystemRow, ToyRow, VideoGameBoxRow, VideoGameRow,
};

use super::SqliteService;
use super::repositories::{custom_field, system, toy, video_game, video_game_box};

#[async_trait]
impl CollectionRepository for Arc<SqliteService> {
    // ==================== Custom Field Operations ====================

    async fn list_custom_fields(
        &self,
        entity_key: Option<&str>,
    ) -> Result<Vec<CustomFieldRow>, DataError> {
        custom_field::list_custom_fields(self.pool(), entity_key)
            .await
            .map_err(Into::into)
    }

    async fn get_custom_field(&self, id: i64) -> Result<Option<CustomFieldRow>, DataError> {
        custom_field::get_custom_field(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn get_custom_field_by_name_and_key(
        &self,
        name: &str,
        entity_key: &str,
    ) -> Result<Option<CustomFieldRow>, DataError> {
        custom_field::get_by_name_and_key(self.pool(), name, entity_key)
            .await
            .map_err(Into::into)
    }

    async fn create_custom_field(
        &self,
        name: &str,
        field_type: CustomFieldType,
        entity_key: &str,
    ) -> Result<CustomFieldRow, DataError> {
        custom_field::create_custom_field(self.pool(), name, field_type, entity_key)
            .await
            .map_err(Into::into)
    }

    async fn rename_custom_field(
        &self,
        id: i64,
        name: &str,
    ) -> Result<Option<CustomFieldRow>, DataError> {
        custom_field::rename_custom_field(self.pool(), id, name)
            .await
            .map_err(Into::into)
    }

    async fn delete_custom_field(&self, id: i64) -> Result<bool, DataError> {
        custom_field::delete_custom_field(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    // ==================== Toy Operations ====================

    async fn list_toys(&self, compiled: &CompiledQuery) -> Result<Vec<ToyRow>, DataError> {
        toy::list_toys(self.pool(), compiled)
            .await
            .map_err(Into::into)
    }

    async fn get_toy(&self, id: i64, include_deleted: bool) -> Result<Option<ToyRow>, DataError> {
        toy::get_toy(self.pool(), id, include_deleted)
            .await
            .map_err(Into::into)
    }

    async fn find_toy_id(&self, name: &str, set: &str) -> Result<Option<i64>, DataError> {
        toy::find_toy_id(self.pool(), name, set)
            .await
            .map_err(Into::into)
    }

    async fn create_toy(&self, input: &NewToy) -> Result<ToyRow, DataError> {
        toy::create_toy(self.pool(), input)
            .await
            .map_err(Into::into)
    }

    async fn update_toy(&self, id: i64, input: &NewToy) -> Result<Option<ToyRow>, DataError> {
        toy::update_toy(self.pool(), id, input)
            .await
            .map_err(Into::into)
    }

    async fn delete_toy(&self, id: i64) -> Result<bool, DataError> {
        toy::delete_toy(self.pool(), id).await.map_err(Into::into)
    }

    // ==================== System Operations ====================

    async fn list_systems(&self, compiled: &CompiledQuery) -> Result<Vec<SystemRow>, DataError> {
        system::list_systems(self.pool(), compiled)
            .await
            .map_err(Into::into)
    }

    async fn get_system(
        &self,
        id: i64,
        include_deleted: bool,
    ) -> Result<Option<SystemRow>, DataError> {
        system::get_system(self.pool(), id, include_deleted)
            .await
            .map_err(Into::into)
    }

    async fn find_system_id(&self, name: &str) -> Result<Option<i64>, DataError> {
        system::find_system_id(self.pool(), name)
            .await
            .map_err(Into::into)
    }

    async fn create_system(&self, input: &NewSystem) -> Result<SystemRow, DataError> {
        system::create_system(self.pool(), input)
            .await
            .map_err(Into::into)
    }

    async fn update_system(
        &self,
        id: i64,
        input: &NewSystem,
    ) -> Result<Option<SystemRow>, DataError> {
        system::update_system(self.pool(), id, input)
            .await
            .map_err(Into::into)
    }

    async fn delete_system(&self, id: i64) -> Result<bool, DataError> {
        system::delete_system(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    // ==================== Video Game Operations ====================

    async fn list_video_games(
        &self,
        compiled: &CompiledQuery,
    ) -> Result<Vec<VideoGameRow>, DataError> {
        video_game::list_video_games(self.pool(), compiled)
            .await
            .map_err(Into::into)
    }

    async fn get_video_game(
        &self,
        id: i64,
        include_deleted: bool,
    ) -> Result<Option<VideoGameRow>, DataError> {
        video_game::get_video_game(self.pool(), id, include_deleted)
            .await
            .map_err(Into::into)
    }

    async fn update_video_game(
        &self,
        id: i64,
        input: &NewVideoGame,
    ) -> Result<Option<VideoGameRow>, DataError> {
        video_game::update_video_game(self.pool(), id, input)
            .await
            .map_err(Into::into)
    }

    async fn delete_video_game(&self, id: i64) -> Result<bool, DataError> {
        video_game::delete_video_game(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    // ==================== Video Game Box Operations ====================

    async fn list_video_game_boxes(
        &self,
        compiled: &CompiledQuery,
    ) -> Result<Vec<VideoGameBoxRow>, DataError> {
        video_game_box::list_video_game_boxes(self.pool(), compiled)
            .await
            .map_err(Into::into)
    }

    async fn get_video_game_box(
        &self,
        id: i64,
        include_deleted: bool,
    ) -> Result<Option<VideoGameBoxRow>, DataError> {
        video_game_box::get_video_game_box(self.pool(), id, include_deleted)
            .await
            .map_err(Into::into)
    }

    async fn find_video_game_box_id(
        &self,
        title: &str,
        system_id: i64,
    ) -> Result<Option<i64>, DataError> {
        video_game_box::find_video_game_box_id(self.pool(), title, system_id)
            .await
            .map_err(Into::into)
    }

    async fn create_video_game_box(
        &self,
        input: &NewVideoGameBox,
    ) -> Result<CreatedVideoGameBox, DataError> {
        video_game_box::create_video_game_box(self.pool(), input)
            .await
            .map_err(Into::into)
    }

    async fn delete_video_game_box(&self, id: i64) -> Result<bool, DataError> {
        video_game_box::delete_video_game_box(self.pool(), id)
            .await
            .map_err(Into::into)
    }
}
