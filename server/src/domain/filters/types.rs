//! Filter type definitions
//!
//! `FilterRequest` is what clients send (all strings, untrusted).
//! `FilterCriterion` is the typed result of validating one request.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::data::{CustomFieldType, DataError};

use super::catalog::ResourceKey;

/// Declared type of a filterable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Boolean,
    Time,
    Sort,
    Pagination,
}

impl FieldType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Time => "time",
            Self::Sort => "sort",
            Self::Pagination => "pagination",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "time" => Some(Self::Time),
            "sort" => Some(Self::Sort),
            "pagination" => Some(Self::Pagination),
            _ => None,
        }
    }
}

impl From<CustomFieldType> for FieldType {
    fn from(t: CustomFieldType) -> Self {
        match t {
            CustomFieldType::Text => Self::Text,
            CustomFieldType::Number => Self::Number,
            CustomFieldType::Boolean => Self::Boolean,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterThanEqualTo,
    LessThan,
    LessThanEqualTo,
    Since,
    Before,
    OrderBy,
    OrderByDesc,
    Limit,
    Offset,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 15] = [
        Self::Equals,
        Self::NotEquals,
        Self::Contains,
        Self::StartsWith,
        Self::EndsWith,
        Self::GreaterThan,
        Self::GreaterThanEqualTo,
        Self::LessThan,
        Self::LessThanEqualTo,
        Self::Since,
        Self::Before,
        Self::OrderBy,
        Self::OrderByDesc,
        Self::Limit,
        Self::Offset,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::GreaterThan => "greater_than",
            Self::GreaterThanEqualTo => "greater_than_equal_to",
            Self::LessThan => "less_than",
            Self::LessThanEqualTo => "less_than_equal_to",
            Self::Since => "since",
            Self::Before => "before",
            Self::OrderBy => "order_by",
            Self::OrderByDesc => "order_by_desc",
            Self::Limit => "limit",
            Self::Offset => "offset",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }

    /// order_by / order_by_desc: bind no operand, skip syntax checks
    pub const fn is_order(&self) -> bool {
        matches!(self, Self::OrderBy | Self::OrderByDesc)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter as sent by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    /// Resource key (`toy`, `system`, `video_game`, `video_game_box`); empty means the listed resource
    #[serde(default)]
    pub key: String,
    /// Declared field type
    pub field_type: String,
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub operand: String,
    #[serde(default)]
    pub custom_field: bool,
}

/// Validated filter condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriterion {
    pub resource: ResourceKey,
    pub field_type: FieldType,
    pub field: String,
    /// Table column for standard fields; `None` for custom fields and pagination
    pub column: Option<&'static str>,
    pub operator: FilterOperator,
    pub operand: String,
    pub is_custom: bool,
}

/// Operand cast failure after validation; indicates a call-order bug
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("filters not validated before casting ({field}: '{operand}')")]
pub struct CompileError {
    pub field: String,
    pub operand: String,
}

#[derive(Error, Debug)]
pub enum FilterError {
    /// Aggregated validation failures for a batch
    #[error("invalid filters: {}", .0.join("; "))]
    Invalid(Vec<String>),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Data(#[from] DataError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parse_round_trip() {
        for op in FilterOperator::ALL {
            assert_eq!(FilterOperator::parse(op.as_str()), Some(op));
        }
        assert_eq!(FilterOperator::parse("="), None);
        assert_eq!(FilterOperator::parse("Equals"), None);
    }

    #[test]
    fn test_field_type_from_custom() {
        assert_eq!(FieldType::from(CustomFieldType::Boolean), FieldType::Boolean);
        assert_eq!(FieldType::parse("pagination"), Some(FieldType::Pagination));
        assert_eq!(FieldType::parse("date"), None);
    }

    #[test]
    fn test_filter_request_deserialize_defaults() {
        let req: FilterRequest = serde_json::from_str(
            r#"{"fieldType": "sort", "field": "name", "operator": "order_by"}"#,
        )
        .unwrap();
        assert_eq!(req.key, "");
        assert_eq!(req.operand, "");
        assert!(!req.custom_field);
    }

    #[test]
    fn test_invalid_display_joins_messages() {
        let err = FilterError::Invalid(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "invalid filters: a; b");
    }
}
