//! Video game box API types

use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::api::routes::{CustomFieldValueInput, custom_values};
use crate::data::types::{NewVideoGame, NewVideoGameBox};

/// A game created together with its box
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewVideoGameRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Defaults to the box's system
    #[validate(range(min = 1, message = "systemId must be positive"))]
    pub system_id: Option<i64>,

    #[validate(nested)]
    #[serde(default)]
    pub custom_field_values: Vec<CustomFieldValueInput>,
}

/// Request body for creating a video game box
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_has_games"))]
pub struct VideoGameBoxRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(range(min = 1, message = "systemId must be positive"))]
    pub system_id: i64,

    #[serde(default)]
    pub is_physical: bool,

    #[serde(default)]
    pub is_collection: bool,

    /// Games already in the collection to link to this box
    #[serde(default)]
    pub existing_video_game_ids: Vec<i64>,

    #[validate(nested)]
    #[serde(default)]
    pub new_video_games: Vec<NewVideoGameRequest>,

    #[validate(nested)]
    #[serde(default)]
    pub custom_field_values: Vec<CustomFieldValueInput>,
}

fn validate_has_games(body: &VideoGameBoxRequest) -> Result<(), ValidationError> {
    if body.existing_video_game_ids.is_empty() && body.new_video_games.is_empty() {
        return Err(ValidationError::new("no_video_games")
            .with_message("A video game box must contain at least one video game".into()));
    }
    if body.existing_video_game_ids.iter().any(|id| *id <= 0) {
        return Err(ValidationError::new("invalid_video_game_id")
            .with_message("existingVideoGameIds must be positive".into()));
    }
    Ok(())
}

impl From<&VideoGameBoxRequest> for NewVideoGameBox {
    fn from(body: &VideoGameBoxRequest) -> Self {
        Self {
            title: body.title.clone(),
            system_id: body.system_id,
            is_physical: body.is_physical,
            is_collection: body.is_collection,
            existing_video_game_ids: body.existing_video_game_ids.clone(),
            new_video_games: body
                .new_video_games
                .iter()
                .map(|game| NewVideoGame {
                    title: game.title.clone(),
                    system_id: game.system_id.unwrap_or(body.system_id),
                    custom_field_values: custom_values(&game.custom_field_values),
                })
                .collect(),
            custom_field_values: custom_values(&body.custom_field_values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> VideoGameBoxRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_box_without_games_fails_validation() {
        let body = request(serde_json::json!({"title": "Empty", "systemId": 1}));
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_new_games_default_to_box_system() {
        let body = request(serde_json::json!({
            "title": "Collection",
            "systemId": 3,
            "isCollection": true,
            "existingVideoGameIds": [7],
            "newVideoGames": [{"title": "A"}, {"title": "B", "systemId": 4}]
        }));
        assert!(body.validate().is_ok());

        let input = NewVideoGameBox::from(&body);
        assert_eq!(input.existing_video_game_ids, vec![7]);
        assert_eq!(input.new_video_games[0].system_id, 3);
        assert_eq!(input.new_video_games[1].system_id, 4);
    }
}
