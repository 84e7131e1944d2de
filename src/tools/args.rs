//! Typed argument models published as the functions' input schemas.
//!
//! Calls still carry their overrides as a raw [`SearchArgs`](super::SearchArgs)
//! map so keys merge flat onto the defaults. These models describe what an
//! agent may send for each function.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Arguments shared by every query-based search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BaseSearchArgs {
    /// The main subject area or category for the search (e.g., 'technology', 'science', 'general')
    pub topic: Option<String>,
    /// Level of search depth - 'basic' for faster, surface-level results or 'advanced' for more comprehensive search
    pub search_depth: Option<String>,
    /// Number of days back to search from current date
    pub days: Option<u32>,
    /// Maximum number of search results to return
    pub max_results: Option<u32>,
    /// List of specific website domains to include in the search results
    pub include_domains: Option<Vec<String>>,
    /// List of website domains to exclude from search results
    pub exclude_domains: Option<Vec<String>>,
    /// Maximum time in seconds to wait for search completion
    pub timeout: Option<f64>,
}

/// Arguments accepted by `search`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FullSearchArgs {
    #[serde(flatten)]
    pub base: BaseSearchArgs,
    /// Specific time period for search results (e.g., 'day', 'week', 'month', 'year')
    pub time_range: Option<String>,
    /// Whether to include an AI-generated summary answer in the search results
    pub include_answer: Option<bool>,
    /// Whether to include the full unprocessed content of search results
    pub include_raw_content: Option<bool>,
    /// Whether to include image results alongside text results
    pub include_images: Option<bool>,
}

/// Arguments accepted by `get_search_context`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchContextArgs {
    #[serde(flatten)]
    pub base: BaseSearchArgs,
    /// Maximum number of text tokens to include in the returned search context
    pub max_tokens: Option<u32>,
}

/// Arguments accepted by `extract`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractArgs {
    /// Level of detail for content extraction - 'basic' for essential information or 'advanced' for comprehensive extraction
    pub extract_depth: Option<String>,
    /// Whether to include images found on the extracted pages
    pub include_images: Option<bool>,
    /// Maximum time in seconds to wait for extraction
    pub timeout: Option<f64>,
}

/// Input schema of `search`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FullSearchInput {
    /// Identifier of the calling endpoint
    pub endpoint_id: String,
    /// The search query text used to find relevant information
    pub query: String,
    /// Configuration parameters controlling the full search behavior
    pub search_args: Option<FullSearchArgs>,
}

/// Input schema of `get_search_context`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchContextInput {
    /// Identifier of the calling endpoint
    pub endpoint_id: String,
    /// The search query text used to find relevant contextual information
    pub query: String,
    /// Configuration parameters for retrieving search context
    pub search_args: Option<SearchContextArgs>,
}

/// Input schema of `qna_search`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QnaSearchInput {
    /// Identifier of the calling endpoint
    pub endpoint_id: String,
    /// The question to be answered through the search system
    pub query: String,
    /// Configuration parameters for the question-answering search process
    pub search_args: Option<BaseSearchArgs>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flattened_args_read_base_keys() {
        let args: FullSearchArgs = serde_json::from_value(json!({
            "topic": "news",
            "max_results": 3,
            "timeout": 12.5,
            "include_answer": true
        }))
        .unwrap();

        assert_eq!(args.base.topic.as_deref(), Some("news"));
        assert_eq!(args.base.max_results, Some(3));
        assert_eq!(args.base.timeout, Some(12.5));
        assert_eq!(args.include_answer, Some(true));
        assert_eq!(args.time_range, None);
    }

    #[test]
    fn test_context_args_carry_max_tokens() {
        let args: SearchContextArgs =
            serde_json::from_value(json!({"days": 2, "max_tokens": 500})).unwrap();
        assert_eq!(args.base.days, Some(2));
        assert_eq!(args.max_tokens, Some(500));
    }
}
