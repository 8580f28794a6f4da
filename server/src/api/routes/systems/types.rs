//! System API types

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::routes::{CustomFieldValueInput, custom_values};
use crate::data::types::NewSystem;

/// Request body for creating or replacing a system
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(range(min = 0, max = 100, message = "Generation must be between 0 and 100"))]
    pub generation: i64,

    #[serde(default)]
    pub handheld: bool,

    #[validate(nested)]
    #[serde(default)]
    pub custom_field_values: Vec<CustomFieldValueInput>,
}

impl From<&SystemRequest> for NewSystem {
    fn from(body: &SystemRequest) -> Self {
        Self {
            name: body.name.clone(),
            generation: body.generation,
            handheld: body.handheld,
            custom_field_values: custom_values(&body.custom_field_values),
        }
    }
}
