//! Custom field API types

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::types::validate_resource_key;
use crate::data::CustomFieldType;

/// Query params for listing custom fields
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCustomFieldsQuery {
    /// Only return definitions for this resource
    #[validate(custom(function = "validate_resource_key"))]
    pub key: Option<String>,
}

/// Request body for creating a custom field
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomFieldRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: CustomFieldType,

    #[validate(custom(function = "validate_resource_key"))]
    pub entity_key: String,
}

/// Request body for renaming a custom field
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenameCustomFieldRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}
