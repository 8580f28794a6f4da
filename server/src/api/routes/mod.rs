//! API route handlers

pub mod backup;
pub mod custom_fields;
pub mod filters;
pub mod health;
pub mod systems;
pub mod toys;
pub mod video_game_boxes;
pub mod video_games;

use std::sync::Arc;

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::types::ApiError;
use crate::data::types::NewCustomFieldValue;
use crate::data::{CompiledQuery, TransactionalService};
use crate::domain::filters::{FilterService, ResourceKey, parse_filters};

/// Shared state for entity endpoints
#[derive(Clone)]
pub struct CollectionApiState {
    pub database: Arc<TransactionalService>,
    pub filters: Arc<FilterService>,
    pub max_filters: usize,
}

impl CollectionApiState {
    /// Parse, validate and compile the `filters` query parameter of a list request
    pub async fn compile_filters(
        &self,
        resource: ResourceKey,
        raw: Option<&str>,
    ) -> Result<CompiledQuery, ApiError> {
        let requests = match raw {
            Some(json) if !json.trim().is_empty() => parse_filters(json, self.max_filters)?,
            _ => Vec::new(),
        };
        self.filters
            .compile_for(resource, &requests)
            .await
            .map_err(ApiError::from_filter)
    }
}

/// Query params for entity list endpoints
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// JSON array of filters, e.g. `[{"fieldType":"text","field":"name","operator":"contains","operand":"Mario"}]`
    pub filters: Option<String>,
}

/// Custom field value attached to a create or update request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldValueInput {
    #[validate(range(min = 1, message = "customFieldId must be positive"))]
    pub custom_field_id: i64,
    #[validate(length(max = 1000, message = "Custom field value must be at most 1000 characters"))]
    pub value: String,
}

impl From<&CustomFieldValueInput> for NewCustomFieldValue {
    fn from(input: &CustomFieldValueInput) -> Self {
        Self {
            custom_field_id: input.custom_field_id,
            value: input.value.clone(),
        }
    }
}

pub(crate) fn custom_values(inputs: &[CustomFieldValueInput]) -> Vec<NewCustomFieldValue> {
    inputs.iter().map(Into::into).collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::api::server::api_router;
    use crate::core::config::{FiltersConfig, ImportConfig};
    use crate::data::TransactionalService;

    pub async fn router() -> Router {
        let db = TransactionalService::in_memory().await;
        api_router(db, &FiltersConfig::default(), &ImportConfig::default())
    }

    pub async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Percent-encode a filters array for a query string
    pub fn filters_query(filters: serde_json::Value) -> String {
        let raw = filters.to_string();
        let mut out = String::with_capacity(raw.len() * 3);
        for b in raw.bytes() {
            if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
                out.push(b as char);
            } else {
                out.push_str(&format!("%{:02X}", b));
            }
        }
        format!("filters={}", out)
    }
}
