//! The tool catalogue and argument handling for `search_onet_codes`.

use serde_json::{json, Value};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::mcp::protocol::Tool;
use crate::occupations::search::OccupationSearch;
use crate::occupations::{SearchOutcome, SearchQuery, DEFAULT_N_RESULTS};

pub const SEARCH_ONET_CODES: &str = "search_onet_codes";

pub fn get_tools() -> Vec<Tool> {
    vec![Tool {
        name: SEARCH_ONET_CODES.into(),
        description: "Search for O*NET occupation codes based on a keyword. \
                      Tries CareerOneStop first, then falls back to the O*NET API \
                      if it has no results. Returns a list of {code, title} objects, \
                      or {error, keyword} when nothing matches."
            .into(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "keyword": {
                    "type": "string",
                    "description": "Job title or occupation keyword to search for"
                },
                "n_results": {
                    "type": "integer",
                    "description": "Number of matching occupations to return",
                    "default": DEFAULT_N_RESULTS,
                    "minimum": 1
                }
            },
            "required": ["keyword"]
        }),
    }]
}

/// Runs a tool by name. Only argument problems and unknown names are errors;
/// a search that finds nothing is a normal `SearchOutcome::NotFound`.
pub async fn call_tool(
    search: &OccupationSearch,
    name: &str,
    arguments: Value,
) -> Result<SearchOutcome, AppError> {
    if name != SEARCH_ONET_CODES {
        return Err(AppError::UnknownTool(name.to_string()));
    }

    let query: SearchQuery = serde_json::from_value(arguments)
        .map_err(|e| AppError::Validation(format!("Invalid arguments for {name}: {e}")))?;
    validate_query(&query)?;

    let span = info_span!(
        "search_onet_codes",
        request_id = %Uuid::new_v4(),
        keyword = %query.keyword
    );
    Ok(search.search_onet_codes(&query).instrument(span).await)
}

fn validate_query(query: &SearchQuery) -> Result<(), AppError> {
    if query.keyword.trim().is_empty() {
        return Err(AppError::Validation("keyword must not be empty".to_string()));
    }
    // "." and ".." collapse when placed in a URL path.
    if query.keyword == "." || query.keyword == ".." {
        return Err(AppError::Validation(format!(
            "keyword '{}' is not a searchable term",
            query.keyword
        )));
    }
    if query.n_results == 0 {
        return Err(AppError::Validation(
            "n_results must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
