//! Per-resource field catalogs
//!
//! A catalog is the static field table of a resource merged with the custom
//! fields currently defined for it. Catalogs are rebuilt on every request.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::types::CustomFieldRow;
use crate::data::{CollectionRepository, DataError};

use super::operators::allowed_operators;
use super::types::{FieldType, FilterOperator};

/// Advertisement bucket holding the sort operators
pub const ALL_FIELDS: &str = "all_fields";
/// Pseudo-field carrying limit/offset criteria
pub const PAGINATION_FIELDS: &str = "pagination_fields";

/// Entity kind a filter or custom field applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKey {
    Toy,
    System,
    VideoGame,
    VideoGameBox,
}

impl ResourceKey {
    pub const ALL: [ResourceKey; 4] = [Self::Toy, Self::System, Self::VideoGame, Self::VideoGameBox];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Toy => "toy",
            Self::System => "system",
            Self::VideoGame => "video_game",
            Self::VideoGameBox => "video_game_box",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    pub const fn table(&self) -> &'static str {
        match self {
            Self::Toy => "toys",
            Self::System => "systems",
            Self::VideoGame => "video_games",
            Self::VideoGameBox => "video_game_boxes",
        }
    }

    fn static_fields(&self) -> &'static [StaticField] {
        match self {
            Self::Toy => TOY_FIELDS,
            Self::System => SYSTEM_FIELDS,
            Self::VideoGame => VIDEO_GAME_FIELDS,
            Self::VideoGameBox => VIDEO_GAME_BOX_FIELDS,
        }
    }
}

/// True when `name` is taken by a standard field of `resource` or by one of
/// the advertisement buckets. Custom fields may not use these names.
pub fn is_reserved_field_name(resource: ResourceKey, name: &str) -> bool {
    name == ALL_FIELDS
        || name == PAGINATION_FIELDS
        || resource
            .static_fields()
            .iter()
            .chain(COMMON_FIELDS)
            .any(|f| f.name == name)
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct StaticField {
    name: &'static str,
    column: &'static str,
    field_type: FieldType,
}

const fn field(name: &'static str, column: &'static str, field_type: FieldType) -> StaticField {
    StaticField {
        name,
        column,
        field_type,
    }
}

const TOY_FIELDS: &[StaticField] = &[
    field("name", "name", FieldType::Text),
    field("set", "set_name", FieldType::Text),
];

const SYSTEM_FIELDS: &[StaticField] = &[
    field("name", "name", FieldType::Text),
    field("generation", "generation", FieldType::Number),
    field("handheld", "handheld", FieldType::Boolean),
];

const VIDEO_GAME_FIELDS: &[StaticField] = &[
    field("title", "title", FieldType::Text),
    field("system_id", "system_id", FieldType::Number),
];

const VIDEO_GAME_BOX_FIELDS: &[StaticField] = &[
    field("title", "title", FieldType::Text),
    field("system_id", "system_id", FieldType::Number),
    field("is_physical", "is_physical", FieldType::Boolean),
    field("is_collection", "is_collection", FieldType::Boolean),
];

const COMMON_FIELDS: &[StaticField] = &[
    field("created_at", "created_at", FieldType::Time),
    field("updated_at", "updated_at", FieldType::Time),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogField {
    pub name: String,
    pub field_type: FieldType,
    /// Backing column; `None` for custom fields and the pseudo-fields
    pub column: Option<&'static str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldCatalog {
    resource: Option<ResourceKey>,
    standard: Vec<CatalogField>,
    custom: Vec<CatalogField>,
}

impl FieldCatalog {
    /// Catalog of an unknown resource: nothing is filterable
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge the static table of `resource` with its custom field definitions.
    /// Definitions for other resources are ignored.
    pub fn build(resource: ResourceKey, custom_fields: &[CustomFieldRow]) -> Self {
        let standard = resource
            .static_fields()
            .iter()
            .chain(COMMON_FIELDS)
            .map(|f| CatalogField {
                name: f.name.to_string(),
                field_type: f.field_type,
                column: Some(f.column),
            })
            .chain([
                CatalogField {
                    name: ALL_FIELDS.to_string(),
                    field_type: FieldType::Sort,
                    column: None,
                },
                CatalogField {
                    name: PAGINATION_FIELDS.to_string(),
                    field_type: FieldType::Pagination,
                    column: None,
                },
            ])
            .collect();

        let custom = custom_fields
            .iter()
            .filter(|cf| cf.entity_key == resource.as_str())
            .map(|cf| CatalogField {
                name: cf.name.clone(),
                field_type: cf.field_type.into(),
                column: None,
            })
            .collect();

        Self {
            resource: Some(resource),
            standard,
            custom,
        }
    }

    pub fn resource(&self) -> Option<ResourceKey> {
        self.resource
    }

    /// Find a field a criterion may name. `all_fields` is an advertisement
    /// bucket only and never matches.
    pub fn lookup(&self, name: &str, is_custom: bool) -> Option<&CatalogField> {
        if is_custom {
            self.custom.iter().find(|f| f.name == name)
        } else {
            self.standard
                .iter()
                .find(|f| f.name == name && f.name != ALL_FIELDS)
        }
    }

    pub fn standard_fields(&self) -> &[CatalogField] {
        &self.standard
    }

    pub fn custom_fields(&self) -> &[CatalogField] {
        &self.custom
    }

    pub fn is_empty(&self) -> bool {
        self.standard.is_empty() && self.custom.is_empty()
    }

    /// Field types and advertised operators for API clients
    ///
    /// Sort operators appear only under `all_fields`.
    pub fn advertise(&self) -> FieldAdvertisement {
        let mut advertisement = FieldAdvertisement::default();
        for field in self.standard.iter().chain(&self.custom) {
            advertisement
                .fields
                .insert(field.name.clone(), field.field_type);
            advertisement.filters.insert(
                field.name.clone(),
                allowed_operators(field.field_type, false),
            );
        }
        advertisement
    }
}

/// Filter discovery document of one resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldAdvertisement {
    /// Field name to declared type
    pub fields: BTreeMap<String, FieldType>,
    /// Field name to operators, in fixed order
    pub filters: BTreeMap<String, Vec<FilterOperator>>,
}

/// Static fields of `resource_key` plus its stored custom fields.
/// Unknown keys give an empty catalog.
pub async fn resolve_field_catalog(
    repo: &dyn CollectionRepository,
    resource_key: &str,
) -> Result<FieldCatalog, DataError> {
    let Some(resource) = ResourceKey::parse(resource_key) else {
        return Ok(FieldCatalog::empty());
    };
    let custom = repo.list_custom_fields(Some(resource.as_str())).await?;
    Ok(FieldCatalog::build(resource, &custom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TransactionalService;
    use crate::data::types::CustomFieldType;

    fn custom(name: &str, field_type: CustomFieldType, key: &str) -> CustomFieldRow {
        CustomFieldRow {
            id: 1,
            name: name.to_string(),
            field_type,
            entity_key: key.to_string(),
        }
    }

    #[test]
    fn test_resource_key_parse() {
        for key in ResourceKey::ALL {
            assert_eq!(ResourceKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(ResourceKey::parse("board_game"), None);
        assert_eq!(ResourceKey::VideoGameBox.table(), "video_game_boxes");
    }

    #[test]
    fn test_static_catalog_contents() {
        let catalog = FieldCatalog::build(ResourceKey::System, &[]);
        let names: Vec<_> = catalog
            .standard_fields()
            .iter()
            .map(|f| (f.name.as_str(), f.field_type))
            .collect();
        assert_eq!(
            names,
            vec![
                ("name", FieldType::Text),
                ("generation", FieldType::Number),
                ("handheld", FieldType::Boolean),
                ("created_at", FieldType::Time),
                ("updated_at", FieldType::Time),
                (ALL_FIELDS, FieldType::Sort),
                (PAGINATION_FIELDS, FieldType::Pagination),
            ]
        );
    }

    #[test]
    fn test_reserved_field_names() {
        assert!(is_reserved_field_name(ResourceKey::Toy, "name"));
        assert!(is_reserved_field_name(ResourceKey::Toy, "created_at"));
        assert!(is_reserved_field_name(ResourceKey::System, ALL_FIELDS));
        assert!(is_reserved_field_name(ResourceKey::VideoGame, PAGINATION_FIELDS));
        assert!(is_reserved_field_name(ResourceKey::VideoGameBox, "is_collection"));
        assert!(!is_reserved_field_name(ResourceKey::Toy, "handheld"));
        assert!(!is_reserved_field_name(ResourceKey::Toy, "Name"));
        assert!(!is_reserved_field_name(ResourceKey::System, "Color"));
    }

    #[test]
    fn test_toy_set_maps_to_set_name_column() {
        let catalog = FieldCatalog::build(ResourceKey::Toy, &[]);
        assert_eq!(catalog.lookup("set", false).unwrap().column, Some("set_name"));
    }

    #[test]
    fn test_lookup_respects_custom_flag_and_all_fields() {
        let catalog = FieldCatalog::build(
            ResourceKey::Toy,
            &[
                custom("Color", CustomFieldType::Text, "toy"),
                custom("Wheels", CustomFieldType::Number, "system"),
            ],
        );

        assert!(catalog.lookup("Color", true).is_some());
        assert!(catalog.lookup("Color", false).is_none());
        assert!(catalog.lookup("name", true).is_none());
        assert!(catalog.lookup("Wheels", true).is_none());
        assert!(catalog.lookup(ALL_FIELDS, false).is_none());
        assert_eq!(
            catalog.lookup(PAGINATION_FIELDS, false).unwrap().field_type,
            FieldType::Pagination
        );
    }

    #[test]
    fn test_advertise_segregates_sort_operators() {
        let catalog = FieldCatalog::build(
            ResourceKey::Toy,
            &[custom("Boxed", CustomFieldType::Boolean, "toy")],
        );
        let ad = catalog.advertise();

        assert_eq!(ad.fields["set"], FieldType::Text);
        assert_eq!(ad.fields["Boxed"], FieldType::Boolean);
        assert_eq!(ad.fields[ALL_FIELDS], FieldType::Sort);
        assert_eq!(
            ad.filters["name"],
            vec![
                FilterOperator::Equals,
                FilterOperator::NotEquals,
                FilterOperator::Contains,
                FilterOperator::StartsWith,
                FilterOperator::EndsWith,
            ]
        );
        assert_eq!(
            ad.filters[ALL_FIELDS],
            vec![FilterOperator::OrderBy, FilterOperator::OrderByDesc]
        );
        assert_eq!(
            ad.filters[PAGINATION_FIELDS],
            vec![FilterOperator::Limit, FilterOperator::Offset]
        );
        assert_eq!(ad.filters["Boxed"], vec![FilterOperator::Equals]);

        let json = serde_json::to_value(&ad).unwrap();
        assert_eq!(json["filters"]["created_at"], serde_json::json!(["since", "before"]));
    }

    #[test]
    fn test_empty_catalog_advertises_nothing() {
        let ad = FieldCatalog::empty().advertise();
        assert!(ad.fields.is_empty());
        assert!(ad.filters.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_merges_stored_custom_fields() {
        let db = TransactionalService::in_memory().await;
        let repo = db.repository();
        repo.create_custom_field("Rating", CustomFieldType::Number, "video_game")
            .await
            .unwrap();
        repo.create_custom_field("Color", CustomFieldType::Text, "toy")
            .await
            .unwrap();

        let catalog = resolve_field_catalog(&*repo, "video_game").await.unwrap();
        assert_eq!(catalog.resource(), Some(ResourceKey::VideoGame));
        assert_eq!(catalog.custom_fields().len(), 1);
        assert_eq!(
            catalog.lookup("Rating", true).unwrap().field_type,
            FieldType::Number
        );

        let unknown = resolve_field_catalog(&*repo, "board_game").await.unwrap();
        assert!(unknown.is_empty());
    }
}
