//! Row and input types shared by the repository trait and its backends

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Custom Fields
// ============================================================================

/// Value type of a user-defined custom field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CustomFieldType {
    Text,
    Number,
    Boolean,
}

impl CustomFieldType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }

    /// Check that a stored text value is well formed for this type
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::Text => true,
            Self::Number => value.parse::<i64>().is_ok(),
            Self::Boolean => value == "true" || value == "false",
        }
    }
}

impl fmt::Display for CustomFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Custom field definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFieldRow {
    pub id: i64,
    pub name: String,
    pub field_type: CustomFieldType,
    pub entity_key: String,
}

/// Custom field value joined with its definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFieldValueRow {
    pub custom_field_id: i64,
    pub custom_field_name: String,
    pub custom_field_type: CustomFieldType,
    pub value: String,
}

/// Custom field value to attach to a new or updated entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomFieldValue {
    pub custom_field_id: i64,
    pub value: String,
}

// ============================================================================
// Compiled filters
// ============================================================================

/// Typed operand bound to a `?` placeholder of a compiled filter fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
}

/// SQL fragments and their operands, in matching placeholder order
///
/// Fragments are appended verbatim to `SELECT e.* FROM <table> e WHERE 1=1 AND e.deleted_at IS NULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledQuery {
    pub fragments: Vec<String>,
    pub operands: Vec<FilterValue>,
}

// ============================================================================
// Entities
// ============================================================================

#[derive(Debug, Clone)]
pub struct ToyRow {
    pub id: i64,
    pub name: String,
    pub set: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
    pub custom_field_values: Vec<CustomFieldValueRow>,
}

#[derive(Debug, Clone)]
pub struct NewToy {
    pub name: String,
    pub set: String,
    pub custom_field_values: Vec<NewCustomFieldValue>,
}

#[derive(Debug, Clone)]
pub struct SystemRow {
    pub id: i64,
    pub name: String,
    pub generation: i64,
    pub handheld: bool,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
    pub custom_field_values: Vec<CustomFieldValueRow>,
}

#[derive(Debug, Clone)]
pub struct NewSystem {
    pub name: String,
    pub generation: i64,
    pub handheld: bool,
    pub custom_field_values: Vec<NewCustomFieldValue>,
}

#[derive(Debug, Clone)]
pub struct VideoGameRow {
    pub id: i64,
    pub title: String,
    pub system_id: i64,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
    pub custom_field_values: Vec<CustomFieldValueRow>,
}

#[derive(Debug, Clone)]
pub struct NewVideoGame {
    pub title: String,
    pub system_id: i64,
    pub custom_field_values: Vec<NewCustomFieldValue>,
}

#[derive(Debug, Clone)]
pub struct VideoGameBoxRow {
    pub id: i64,
    pub title: String,
    pub system_id: i64,
    pub is_physical: bool,
    pub is_collection: bool,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
    pub video_game_ids: Vec<i64>,
    pub custom_field_values: Vec<CustomFieldValueRow>,
}

/// Box creation input: links existing games and creates new ones in one transaction
#[derive(Debug, Clone)]
pub struct NewVideoGameBox {
    pub title: String,
    pub system_id: i64,
    pub is_physical: bool,
    pub is_collection: bool,
    pub existing_video_game_ids: Vec<i64>,
    pub new_video_games: Vec<NewVideoGame>,
    pub custom_field_values: Vec<NewCustomFieldValue>,
}

/// Result of box creation
///
/// `created_video_games` is in the same order as `NewVideoGameBox::new_video_games`.
#[derive(Debug, Clone)]
pub struct CreatedVideoGameBox {
    pub video_game_box: VideoGameBoxRow,
    pub created_video_games: Vec<VideoGameRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_field_type_parse_round_trip() {
        for t in [
            CustomFieldType::Text,
            CustomFieldType::Number,
            CustomFieldType::Boolean,
        ] {
            assert_eq!(CustomFieldType::parse(t.as_str()), Some(t));
        }
        assert_eq!(CustomFieldType::parse("Text"), None);
        assert_eq!(CustomFieldType::parse("time"), None);
    }

    #[test]
    fn test_custom_field_type_accepts() {
        assert!(CustomFieldType::Text.accepts("anything at all"));
        assert!(CustomFieldType::Number.accepts("-42"));
        assert!(!CustomFieldType::Number.accepts("4.2"));
        assert!(CustomFieldType::Boolean.accepts("false"));
        assert!(!CustomFieldType::Boolean.accepts("TRUE"));
    }

    #[test]
    fn test_custom_field_type_serde() {
        let t: CustomFieldType = serde_json::from_str(r#""boolean""#).unwrap();
        assert_eq!(t, CustomFieldType::Boolean);
        assert_eq!(serde_json::to_string(&CustomFieldType::Number).unwrap(), r#""number""#);
    }
}
