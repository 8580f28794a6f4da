//! Video game API types

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::routes::{CustomFieldValueInput, custom_values};
use crate::data::types::NewVideoGame;

/// Request body for replacing a video game
///
/// Games are created through their box; see `VideoGameBoxRequest`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoGameRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(range(min = 1, message = "systemId must be positive"))]
    pub system_id: i64,

    #[validate(nested)]
    #[serde(default)]
    pub custom_field_values: Vec<CustomFieldValueInput>,
}

impl From<&VideoGameRequest> for NewVideoGame {
    fn from(body: &VideoGameRequest) -> Self {
        Self {
            title: body.title.clone(),
            system_id: body.system_id,
            custom_field_values: custom_values(&body.custom_field_values),
        }
    }
}
