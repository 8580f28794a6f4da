//! SQL generation for validated filter batches
//!
//! Fragments start with a space and are appended to
//! `... WHERE 1=1 AND e.deleted_at IS NULL`. Standard columns are qualified
//! with alias `e`; custom fields are matched through correlated sub-selects
//! on `custom_field_values`. Operands are listed in placeholder order.

use crate::data::{CompiledQuery, FilterValue};

use super::types::{CompileError, FieldType, FilterCriterion, FilterOperator};

fn comparison(operator: FilterOperator) -> &'static str {
    match operator {
        FilterOperator::Equals => "= ?",
        FilterOperator::NotEquals => "<> ?",
        FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
            "LIKE ?"
        }
        FilterOperator::GreaterThan => "> ?",
        FilterOperator::GreaterThanEqualTo => ">= ?",
        FilterOperator::LessThan => "< ?",
        FilterOperator::LessThanEqualTo => "<= ?",
        FilterOperator::Since => ">= datetime(?)",
        FilterOperator::Before => "< datetime(?)",
        FilterOperator::OrderBy
        | FilterOperator::OrderByDesc
        | FilterOperator::Limit
        | FilterOperator::Offset => "",
    }
}

fn direction(operator: FilterOperator) -> &'static str {
    if operator == FilterOperator::OrderByDesc {
        "DESC"
    } else {
        "ASC"
    }
}

/// Custom values are text; number comparisons and sorts need an integer cast
fn custom_value_expr(field_type: FieldType) -> &'static str {
    if field_type == FieldType::Number {
        "CAST(cfv.value AS INTEGER)"
    } else {
        "cfv.value"
    }
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn custom_value_source(criterion: &FilterCriterion) -> String {
    format!(
        "FROM custom_field_values cfv JOIN custom_fields cf ON cf.id = cfv.custom_field_id WHERE cf.entity_key = {}",
        quote_literal(criterion.resource.as_str())
    )
}

fn push_standard(criterion: &FilterCriterion, fragments: &mut Vec<String>) {
    let column = criterion.column.unwrap_or("id");
    let fragment = match criterion.operator {
        FilterOperator::OrderBy | FilterOperator::OrderByDesc => {
            format!(" ORDER BY e.{} {}", column, direction(criterion.operator))
        }
        FilterOperator::Limit => " LIMIT ?".to_string(),
        FilterOperator::Offset => " OFFSET ?".to_string(),
        op => format!(" AND e.{} {}", column, comparison(op)),
    };
    fragments.push(fragment);
}

/// Custom criteria emit a field-name fragment, then the value fragment
fn push_custom(criterion: &FilterCriterion, fragments: &mut Vec<String>) {
    let value = custom_value_expr(criterion.field_type);
    match criterion.operator {
        FilterOperator::OrderBy | FilterOperator::OrderByDesc => {
            fragments.push(format!(
                " ORDER BY (SELECT {} {} AND cfv.entity_id = e.id AND cf.name = {}",
                value,
                custom_value_source(criterion),
                quote_literal(&criterion.field)
            ));
            fragments.push(format!(") {}", direction(criterion.operator)));
        }
        op => {
            fragments.push(format!(
                " AND e.id IN (SELECT cfv.entity_id {} AND cf.name = ?",
                custom_value_source(criterion)
            ));
            fragments.push(format!(" AND {} {})", value, comparison(op)));
        }
    }
}

/// One fragment per criterion (two for custom fields), in criterion order
pub fn compile_where_fragments(ordered: &[FilterCriterion]) -> Vec<String> {
    let mut fragments = Vec::with_capacity(ordered.len());
    for criterion in ordered {
        if criterion.is_custom {
            push_custom(criterion, &mut fragments);
        } else {
            push_standard(criterion, &mut fragments);
        }
    }
    fragments
}

fn cast_operand(criterion: &FilterCriterion) -> Result<FilterValue, CompileError> {
    let not_validated = || CompileError {
        field: criterion.field.clone(),
        operand: criterion.operand.clone(),
    };
    let operand = &criterion.operand;

    match criterion.field_type {
        FieldType::Number | FieldType::Pagination => operand
            .parse::<i64>()
            .map(FilterValue::Integer)
            .map_err(|_| not_validated()),
        FieldType::Boolean if criterion.is_custom => Ok(FilterValue::Text(operand.clone())),
        FieldType::Boolean => match operand.as_str() {
            "true" => Ok(FilterValue::Boolean(true)),
            "false" => Ok(FilterValue::Boolean(false)),
            _ => Err(not_validated()),
        },
        FieldType::Text | FieldType::Time | FieldType::Sort => {
            Ok(FilterValue::Text(operand.clone()))
        }
    }
}

/// Operand values for the `?` placeholders of `compile_where_fragments`
///
/// Sort criteria bind nothing. Custom criteria bind the field name first.
pub fn compile_operands(ordered: &[FilterCriterion]) -> Result<Vec<FilterValue>, CompileError> {
    let mut operands = Vec::with_capacity(ordered.len());
    for criterion in ordered {
        if criterion.operator.is_order() {
            continue;
        }
        if criterion.is_custom {
            operands.push(FilterValue::Text(criterion.field.clone()));
        }
        let value = match criterion.operator {
            FilterOperator::Contains => FilterValue::Text(format!("%{}%", criterion.operand)),
            FilterOperator::StartsWith => FilterValue::Text(format!("{}%", criterion.operand)),
            FilterOperator::EndsWith => FilterValue::Text(format!("%{}", criterion.operand)),
            _ => cast_operand(criterion)?,
        };
        operands.push(value);
    }
    Ok(operands)
}

/// Fragments and operands together
pub fn compile(ordered: &[FilterCriterion]) -> Result<CompiledQuery, CompileError> {
    Ok(CompiledQuery {
        fragments: compile_where_fragments(ordered),
        operands: compile_operands(ordered)?,
    })
}
