//! Batch validation and ordering
//!
//! Every request is checked independently and all problems are collected;
//! the batch fails as a whole with one aggregated error.

use std::collections::HashMap;

use crate::utils::time::is_valid_timestamp;

use super::catalog::{CatalogField, FieldCatalog, ResourceKey};
use super::operators::{allowed_operators, blacklisted_substrings};
use super::types::{FieldType, FilterCriterion, FilterError, FilterOperator, FilterRequest};

pub const OFFSET_WITHOUT_LIMIT: &str =
    "offset filter is not allowed without also including one limit filter";

fn duplicate_message(slot: &str) -> String {
    format!("no more than one '{}' filter allowed", slot)
}

fn lookup_field<'a>(
    catalogs: &'a HashMap<ResourceKey, FieldCatalog>,
    resource: Option<ResourceKey>,
    request: &FilterRequest,
) -> Option<&'a CatalogField> {
    resource
        .and_then(|r| catalogs.get(&r))
        .and_then(|c| c.lookup(&request.field, request.custom_field))
}

fn check_operand_syntax(field_type: FieldType, request: &FilterRequest) -> Option<String> {
    let operand = &request.operand;
    match field_type {
        FieldType::Number | FieldType::Pagination if operand.parse::<i64>().is_err() => Some(
            format!("operand '{}' for field '{}' must be an integer", operand, request.field),
        ),
        FieldType::Boolean if operand != "true" && operand != "false" => Some(format!(
            "operand '{}' for field '{}' must be 'true' or 'false'",
            operand, request.field
        )),
        FieldType::Time if !is_valid_timestamp(operand) => Some(format!(
            "operand '{}' for field '{}' must be a timestamp formatted as YYYY-MM-DD HH:MM:SS",
            operand, request.field
        )),
        _ => None,
    }
}

/// Check one request; push every problem into `errors`
fn resolve_criterion(
    request: &FilterRequest,
    catalogs: &HashMap<ResourceKey, FieldCatalog>,
    errors: &mut Vec<String>,
) -> Option<FilterCriterion> {
    let before = errors.len();

    let declared = FieldType::parse(&request.field_type);
    if declared.is_none() {
        errors.push(format!(
            "unknown filter type '{}' for field '{}'",
            request.field_type, request.field
        ));
    }

    let operator = FilterOperator::parse(&request.operator);
    if operator.is_none() {
        errors.push(format!(
            "unknown operator '{}' for field '{}'",
            request.operator, request.field
        ));
    }

    for substring in blacklisted_substrings(&request.operand) {
        errors.push(format!(
            "operand for field '{}' contains disallowed text '{}'",
            request.field, substring
        ));
    }

    let resource = ResourceKey::parse(&request.key);
    let field = lookup_field(catalogs, resource, request);
    if field.is_none() {
        let kind = if request.custom_field { "custom field" } else { "field" };
        errors.push(format!(
            "{} '{}' is not filterable for resource '{}'",
            kind, request.field, request.key
        ));
    }

    if let (Some(declared), Some(field)) = (declared, field)
        && declared != field.field_type
    {
        errors.push(format!(
            "filter type '{}' does not match field '{}' of type '{}'",
            declared, field.name, field.field_type
        ));
    }

    if let (Some(op), Some(field)) = (operator, field)
        && !allowed_operators(field.field_type, true).contains(&op)
    {
        errors.push(format!(
            "operator '{}' is not allowed for {} field '{}'",
            op, field.field_type, field.name
        ));
    }

    let effective_type = field.map(|f| f.field_type).or(declared);
    if let (Some(op), Some(field_type)) = (operator, effective_type)
        && !op.is_order()
        && let Some(message) = check_operand_syntax(field_type, request)
    {
        errors.push(message);
    }

    if errors.len() > before {
        return None;
    }

    match (resource, declared, operator, field) {
        (Some(resource), Some(field_type), Some(operator), Some(field)) => Some(FilterCriterion {
            resource,
            field_type,
            field: field.name.clone(),
            column: field.column,
            operator,
            operand: request.operand.clone(),
            is_custom: request.custom_field,
        }),
        _ => None,
    }
}

/// Validate a batch and order it as `[where…, order?, limit?, offset?]`
///
/// `catalogs` holds the field catalog of every resource the batch may name;
/// a resource missing from the map has no filterable fields.
pub fn validate_and_order(
    requests: &[FilterRequest],
    catalogs: &HashMap<ResourceKey, FieldCatalog>,
) -> Result<Vec<FilterCriterion>, FilterError> {
    let mut errors = Vec::new();
    let resolved: Vec<FilterCriterion> = requests
        .iter()
        .filter_map(|r| resolve_criterion(r, catalogs, &mut errors))
        .collect();

    let mut where_criteria = Vec::with_capacity(resolved.len());
    let mut order: Option<FilterCriterion> = None;
    let mut limit: Option<FilterCriterion> = None;
    let mut offset: Option<FilterCriterion> = None;

    for criterion in resolved {
        let (slot, name) = match criterion.operator {
            FilterOperator::OrderBy | FilterOperator::OrderByDesc => (&mut order, "order_by"),
            FilterOperator::Limit => (&mut limit, "limit"),
            FilterOperator::Offset => (&mut offset, "offset"),
            _ => {
                where_criteria.push(criterion);
                continue;
            }
        };
        if slot.is_some() {
            errors.push(duplicate_message(name));
        } else {
            *slot = Some(criterion);
        }
    }

    if offset.is_some() && limit.is_none() {
        errors.push(OFFSET_WITHOUT_LIMIT.to_string());
    }

    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "Filter batch rejected");
        return Err(FilterError::Invalid(errors));
    }

    where_criteria.extend(order);
    where_criteria.extend(limit);
    where_criteria.extend(offset);
    Ok(where_criteria)
}
