//! Shared API types
//!
//! Error responses and common validators used across endpoints.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use validator::ValidationError;

use crate::data::DataError;
use crate::domain::filters::{FilterError, ResourceKey};

/// Validator for resource key query parameters
pub fn validate_resource_key(key: &str) -> Result<(), ValidationError> {
    if ResourceKey::parse(key).is_none() {
        return Err(ValidationError::new("resource_key").with_message(
            format!(
                "key must be one of: {}",
                ResourceKey::ALL.map(|r| r.as_str()).join(", ")
            )
            .into(),
        ));
    }
    Ok(())
}

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    /// Aggregated filter validation failure
    InvalidFilters { errors: Vec<String> },
    NotFound { code: String, message: String },
    Conflict { code: String, message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::BadRequest { code, .. } | Self::NotFound { code, .. } | Self::Conflict { code, .. } => {
                code
            }
            Self::InvalidFilters { .. } => "INVALID_FILTERS",
            Self::Internal { .. } => "INTERNAL",
        }
    }

    pub fn from_data(e: DataError) -> Self {
        match e {
            DataError::NotFound(message) => Self::not_found("NOT_FOUND", message),
            DataError::Conflict(message) => Self::conflict("CONFLICT", message),
            DataError::InvalidInput(message) => Self::bad_request("INVALID_INPUT", message),
            e => {
                tracing::error!(error = %e, "Data error");
                Self::Internal {
                    message: "Database operation failed".to_string(),
                }
            }
        }
    }

    pub fn from_filter(e: FilterError) -> Self {
        match e {
            FilterError::Invalid(errors) => Self::InvalidFilters { errors },
            FilterError::Compile(e) => {
                tracing::error!(error = %e, "Filter compilation failed");
                Self::internal("Filter compilation failed")
            }
            FilterError::Data(e) => Self::from_data(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message, errors) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message, None)
            }
            Self::InvalidFilters { errors } => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                "INVALID_FILTERS".to_string(),
                format!("{} invalid filter(s)", errors.len()),
                Some(errors),
            ),
            Self::NotFound { code, message } => {
                (StatusCode::NOT_FOUND, "not_found", code, message, None)
            }
            Self::Conflict { code, message } => {
                (StatusCode::CONFLICT, "conflict", code, message, None)
            }
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
                None,
            ),
        };
        let mut body = serde_json::json!({
            "error": error_type,
            "code": code,
            "message": message
        });
        if let Some(errors) = errors {
            body["errors"] = serde_json::json!(errors);
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filters::CompileError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_validate_resource_key() {
        assert!(validate_resource_key("video_game_box").is_ok());
        assert!(validate_resource_key("board_game").is_err());
    }

    #[test]
    fn test_data_errors_map_to_status() {
        assert_eq!(
            ApiError::from_data(DataError::Conflict("dup".into())).code(),
            "CONFLICT"
        );
        assert_eq!(
            ApiError::from_data(DataError::InvalidInput("bad".into())).code(),
            "INVALID_INPUT"
        );
        assert_eq!(
            ApiError::from_data(DataError::Sqlite(sqlx::Error::PoolClosed)).code(),
            "INTERNAL"
        );
    }

    #[test]
    fn test_compile_error_is_internal() {
        let err = ApiError::from_filter(FilterError::Compile(CompileError {
            field: "generation".into(),
            operand: "four".into(),
        }));
        assert_eq!(err.code(), "INTERNAL");
    }

    #[tokio::test]
    async fn test_invalid_filters_body_lists_errors() {
        let response = ApiError::from_filter(FilterError::Invalid(vec![
            "first".into(),
            "second".into(),
        ]))
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "INVALID_FILTERS");
        assert_eq!(body["errors"], serde_json::json!(["first", "second"]));
    }

    #[tokio::test]
    async fn test_not_found_body_shape() {
        let response = ApiError::not_found("TOY_NOT_FOUND", "Toy not found: 3").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "Toy not found: 3");
        assert!(body.get("errors").is_none());
    }
}
