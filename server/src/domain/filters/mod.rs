//! Dynamic filter system for entity list endpoints
//!
//! Clients send filters as a JSON array of `FilterRequest`s. A batch is
//! validated against the field catalog of the listed resource, ordered
//! (where clauses, order, limit, offset) and compiled into SQL fragments
//! plus typed operands for the repository.
//!
//! ```text
//! parse_filters  ->  validate_and_order  ->  compile_where_fragments
//!                                        ->  compile_operands
//! ```

mod catalog;
mod compile;
mod operators;
mod parser;
mod types;
mod validate;

pub use catalog::{
    ALL_FIELDS, CatalogField, FieldAdvertisement, FieldCatalog, PAGINATION_FIELDS, ResourceKey,
    is_reserved_field_name, resolve_field_catalog,
};
pub use compile::{compile, compile_operands, compile_where_fragments};
pub use operators::{BLACKLIST, allowed_operators};
pub use parser::parse_filters;
pub use types::{
    CompileError, FieldType, FilterCriterion, FilterError, FilterOperator, FilterRequest,
};
pub use validate::{OFFSET_WITHOUT_LIMIT, validate_and_order};

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::data::{CompiledQuery, DataError, TransactionalService};

/// Catalog lookup, advertisement and compilation against the live store
pub struct FilterService {
    database: Arc<TransactionalService>,
}

impl FilterService {
    pub fn new(database: Arc<TransactionalService>) -> Self {
        Self { database }
    }

    /// Current catalog of a resource key (empty for unknown keys)
    pub async fn field_catalog(&self, resource_key: &str) -> Result<FieldCatalog, DataError> {
        let repo = self.database.repository();
        resolve_field_catalog(&*repo, resource_key).await
    }

    pub async fn advertise(&self, resource: ResourceKey) -> Result<FieldAdvertisement, DataError> {
        Ok(self.field_catalog(resource.as_str()).await?.advertise())
    }

    pub async fn advertise_all(
        &self,
    ) -> Result<BTreeMap<ResourceKey, FieldAdvertisement>, DataError> {
        let mut all = BTreeMap::new();
        for resource in ResourceKey::ALL {
            all.insert(resource, self.advertise(resource).await?);
        }
        Ok(all)
    }

    /// Validate and compile a batch for a list of `resource`
    ///
    /// Requests with an empty key apply to `resource`; any other key is an error.
    pub async fn compile_for(
        &self,
        resource: ResourceKey,
        requests: &[FilterRequest],
    ) -> Result<CompiledQuery, FilterError> {
        if requests.is_empty() {
            return Ok(CompiledQuery::default());
        }

        let mut key_errors = Vec::new();
        let mut scoped = Vec::with_capacity(requests.len());
        for request in requests {
            if request.key.is_empty() {
                scoped.push(FilterRequest {
                    key: resource.as_str().to_string(),
                    ..request.clone()
                });
            } else if request.key == resource.as_str() {
                scoped.push(request.clone());
            } else {
                key_errors.push(format!(
                    "filter key '{}' does not match resource '{}'",
                    request.key, resource
                ));
            }
        }

        let catalog = self.field_catalog(resource.as_str()).await?;
        let catalogs = HashMap::from([(resource, catalog)]);

        let ordered = match validate_and_order(&scoped, &catalogs) {
            Ok(ordered) if key_errors.is_empty() => ordered,
            Ok(_) => return Err(FilterError::Invalid(key_errors)),
            Err(FilterError::Invalid(errors)) => {
                key_errors.extend(errors);
                return Err(FilterError::Invalid(key_errors));
            }
            Err(e) => return Err(e),
        };

        let compiled = compile(&ordered)?;
        tracing::debug!(
            resource = %resource,
            criteria = ordered.len(),
            fragments = compiled.fragments.len(),
            "Filters compiled"
        );
        Ok(compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FilterValue;
    use crate::data::types::CustomFieldType;

    fn req(key: &str, field_type: &str, field: &str, operator: &str, operand: &str) -> FilterRequest {
        FilterRequest {
            key: key.to_string(),
            field_type: field_type.to_string(),
            field: field.to_string(),
            operator: operator.to_string(),
            operand: operand.to_string(),
            custom_field: false,
        }
    }

    #[tokio::test]
    async fn test_compile_for_uses_live_custom_fields() {
        let db = TransactionalService::in_memory().await;
        let service = FilterService::new(db.clone());

        let mut custom = req("toy", "number", "Count", "greater_than", "1");
        custom.custom_field = true;

        // Not defined yet
        assert!(matches!(
            service.compile_for(ResourceKey::Toy, std::slice::from_ref(&custom)).await,
            Err(FilterError::Invalid(_))
        ));

        db.repository()
            .create_custom_field("Count", CustomFieldType::Number, "toy")
            .await
            .unwrap();
        let compiled = service
            .compile_for(ResourceKey::Toy, &[custom])
            .await
            .unwrap();
        assert_eq!(compiled.fragments.len(), 2);
        assert_eq!(
            compiled.operands,
            vec![FilterValue::Text("Count".into()), FilterValue::Integer(1)]
        );
    }

    #[tokio::test]
    async fn test_compile_for_scopes_keys() {
        let db = TransactionalService::in_memory().await;
        let service = FilterService::new(db);

        let compiled = service
            .compile_for(ResourceKey::Toy, &[req("", "text", "name", "equals", "Rex")])
            .await
            .unwrap();
        assert_eq!(compiled.fragments, vec![" AND e.name = ?"]);

        let err = service
            .compile_for(
                ResourceKey::Toy,
                &[
                    req("system", "text", "name", "equals", "SNES"),
                    req("toy", "text", "name", "equals", "a=b"),
                ],
            )
            .await
            .unwrap_err();
        match err {
            FilterError::Invalid(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].contains("does not match resource 'toy'"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_batch_compiles_to_nothing() {
        let db = TransactionalService::in_memory().await;
        let service = FilterService::new(db);
        let compiled = service.compile_for(ResourceKey::System, &[]).await.unwrap();
        assert_eq!(compiled, CompiledQuery::default());
    }

    #[tokio::test]
    async fn test_advertise_all_covers_every_resource() {
        let db = TransactionalService::in_memory().await;
        let service = FilterService::new(db);
        let all = service.advertise_all().await.unwrap();
        assert_eq!(all.len(), ResourceKey::ALL.len());
        assert!(all[&ResourceKey::VideoGameBox].fields.contains_key("is_collection"));
    }
}
