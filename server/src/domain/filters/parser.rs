//! Filter parsing
//!
//! Parses the `filters` query parameter (a JSON array) into filter requests.

use crate::api::types::ApiError;
use crate::core::constants::MAX_FILTER_JSON_SIZE;

use super::types::FilterRequest;

/// Parse filters from the JSON query param
///
/// Enforces the JSON size limit and the per-request filter count. Field and
/// operator checks happen later in `validate_and_order`.
pub fn parse_filters(json_str: &str, max_filters: usize) -> Result<Vec<FilterRequest>, ApiError> {
    if json_str.len() > MAX_FILTER_JSON_SIZE {
        return Err(ApiError::bad_request(
            "FILTER_JSON_TOO_LARGE",
            format!(
                "Filter JSON exceeds maximum size of {} bytes",
                MAX_FILTER_JSON_SIZE
            ),
        ));
    }

    let filters: Vec<FilterRequest> = serde_json::from_str(json_str)
        .map_err(|e| ApiError::bad_request("INVALID_FILTER_JSON", e.to_string()))?;

    if filters.len() > max_filters {
        return Err(ApiError::bad_request(
            "TOO_MANY_FILTERS",
            format!("Maximum {} filters allowed", max_filters),
        ));
    }

    Ok(filters)
}
