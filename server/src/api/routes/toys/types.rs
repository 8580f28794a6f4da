//! Toy API types

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::routes::{CustomFieldValueInput, custom_values};
use crate::data::types::NewToy;

/// Request body for creating or replacing a toy
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToyRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(max = 200, message = "Set must be at most 200 characters"))]
    #[serde(default)]
    pub set: String,

    #[validate(nested)]
    #[serde(default)]
    pub custom_field_values: Vec<CustomFieldValueInput>,
}

impl From<&ToyRequest> for NewToy {
    fn from(body: &ToyRequest) -> Self {
        Self {
            name: body.name.clone(),
            set: body.set.clone(),
            custom_field_values: custom_values(&body.custom_field_values),
        }
    }
}
