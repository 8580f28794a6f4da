//! Operator tables and the operand denylist

use super::types::{FieldType, FilterOperator};

const TEXT_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Equals,
    FilterOperator::NotEquals,
    FilterOperator::Contains,
    FilterOperator::StartsWith,
    FilterOperator::EndsWith,
];

const NUMBER_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Equals,
    FilterOperator::NotEquals,
    FilterOperator::GreaterThan,
    FilterOperator::GreaterThanEqualTo,
    FilterOperator::LessThan,
    FilterOperator::LessThanEqualTo,
];

const BOOLEAN_OPERATORS: &[FilterOperator] = &[FilterOperator::Equals];

const TIME_OPERATORS: &[FilterOperator] = &[FilterOperator::Since, FilterOperator::Before];

const SORT_OPERATORS: &[FilterOperator] = &[FilterOperator::OrderBy, FilterOperator::OrderByDesc];

const PAGINATION_OPERATORS: &[FilterOperator] = &[FilterOperator::Limit, FilterOperator::Offset];

/// Substrings rejected anywhere in an operand (case-sensitive)
pub const BLACKLIST: [&str; 7] = [";", "=", "sleep(", " or ", " union ", " delete ", " select "];

/// Operators allowed for a field type, in advertised order
///
/// With `include_sort_operators`, order_by/order_by_desc are appended to the
/// text, number, boolean and time lists: any such field can be sorted on.
pub fn allowed_operators(
    field_type: FieldType,
    include_sort_operators: bool,
) -> Vec<FilterOperator> {
    let base = match field_type {
        FieldType::Text => TEXT_OPERATORS,
        FieldType::Number => NUMBER_OPERATORS,
        FieldType::Boolean => BOOLEAN_OPERATORS,
        FieldType::Time => TIME_OPERATORS,
        FieldType::Sort => return SORT_OPERATORS.to_vec(),
        FieldType::Pagination => return PAGINATION_OPERATORS.to_vec(),
    };

    let mut ops = base.to_vec();
    if include_sort_operators {
        ops.extend_from_slice(SORT_OPERATORS);
    }
    ops
}

/// Blacklisted substrings contained in `operand`, in table order
pub fn blacklisted_substrings(operand: &str) -> impl Iterator<Item = &'static str> + '_ {
    BLACKLIST.into_iter().filter(move |s| operand.contains(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ops: Vec<FilterOperator>) -> Vec<&'static str> {
        ops.iter().map(|o| o.as_str()).collect()
    }

    #[test]
    fn test_advertised_order_is_fixed() {
        assert_eq!(
            names(allowed_operators(FieldType::Text, false)),
            vec!["equals", "not_equals", "contains", "starts_with", "ends_with"]
        );
        assert_eq!(
            names(allowed_operators(FieldType::Number, false)),
            vec![
                "equals",
                "not_equals",
                "greater_than",
                "greater_than_equal_to",
                "less_than",
                "less_than_equal_to"
            ]
        );
        assert_eq!(names(allowed_operators(FieldType::Boolean, false)), vec!["equals"]);
        assert_eq!(names(allowed_operators(FieldType::Time, false)), vec!["since", "before"]);
        assert_eq!(
            names(allowed_operators(FieldType::Sort, false)),
            vec!["order_by", "order_by_desc"]
        );
        assert_eq!(
            names(allowed_operators(FieldType::Pagination, false)),
            vec!["limit", "offset"]
        );
    }

    #[test]
    fn test_include_sort_appends_order_operators() {
        assert_eq!(
            names(allowed_operators(FieldType::Boolean, true)),
            vec!["equals", "order_by", "order_by_desc"]
        );
        let time = allowed_operators(FieldType::Time, true);
        assert_eq!(time.len(), 4);
        assert_eq!(allowed_operators(FieldType::Pagination, true).len(), 2);
        assert_eq!(allowed_operators(FieldType::Sort, true).len(), 2);
    }

    #[test]
    fn test_blacklisted_substrings() {
        assert_eq!(blacklisted_substrings("Mario").count(), 0);
        assert_eq!(blacklisted_substrings("a=b;").collect::<Vec<_>>(), vec![";", "="]);
        assert_eq!(blacklisted_substrings(&BLACKLIST.concat()).count(), 7);
        // Case-sensitive
        assert_eq!(blacklisted_substrings("x OR y").count(), 0);
    }
}
