use crate::adapters::TavilyHttpAdapter;
use crate::config::{HttpConfig, SearchSettings};
use crate::ports::SearchServicePort;
use crate::tools::args::{ExtractArgs, FullSearchInput, QnaSearchInput, SearchContextInput};
use crate::tools::profiles::{merge_args, DefaultProfiles, SearchArgs};
use crate::{Error, Result};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Input for the query-based functions (`search`, `get_search_context`, `qna_search`).
///
/// Each function publishes its own typed schema (see [`SearchFunction::input_schema`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchInput {
    /// Identifier of the calling endpoint
    pub endpoint_id: String,
    /// The search query or question
    pub query: String,
    /// Per-call overrides for the default search arguments
    #[serde(default)]
    pub search_args: SearchArgs,
}

/// Input for the `extract` function
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractInput {
    /// Identifier of the calling endpoint
    pub endpoint_id: String,
    /// Pages to extract content from
    pub urls: Vec<String>,
    /// Configuration parameters controlling the content extraction process
    #[serde(default, alias = "search_args")]
    #[schemars(with = "Option<ExtractArgs>")]
    pub extract_args: SearchArgs,
}

/// The functions exposed to the agent framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchFunction {
    Search,
    GetSearchContext,
    QnaSearch,
    Extract,
}

impl SearchFunction {
    pub const ALL: [Self; 4] = [
        Self::Search,
        Self::GetSearchContext,
        Self::QnaSearch,
        Self::Extract,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::GetSearchContext => "get_search_context",
            Self::QnaSearch => "qna_search",
            Self::Extract => "extract",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Search => "Search the web and return ranked results, optionally with a generated answer, raw page content and images",
            Self::GetSearchContext => "Search the web and return a token-bounded JSON context of source URLs and content",
            Self::QnaSearch => "Answer a question using web search results",
            Self::Extract => "Extract page content from one or more URLs",
        }
    }

    /// JSON Schema of the function's input, including its typed argument model
    pub fn input_schema(self) -> Value {
        let schema = match self {
            Self::Search => schemars::schema_for!(FullSearchInput),
            Self::GetSearchContext => schemars::schema_for!(SearchContextInput),
            Self::QnaSearch => schemars::schema_for!(QnaSearchInput),
            Self::Extract => schemars::schema_for!(ExtractInput),
        };
        serde_json::to_value(schema).unwrap_or_default()
    }
}

impl std::fmt::Display for SearchFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|function| function.name() == s)
            .ok_or_else(|| Error::InvalidInput {
                field: "function".to_string(),
                reason: format!("Unknown function: {s}"),
            })
    }
}

/// Web search tool: merges per-call overrides onto the configured defaults
/// and forwards the result to the search service.
#[derive(Clone)]
pub struct WebSearchTool {
    service: Arc<dyn SearchServicePort>,
    profiles: Arc<DefaultProfiles>,
}

impl std::fmt::Debug for WebSearchTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSearchTool")
            .field("service", &self.service)
            .field("profiles", &"DefaultProfiles")
            .finish()
    }
}

impl WebSearchTool {
    /// Create a tool backed by the Tavily HTTP API
    pub fn new(settings: &SearchSettings, http: &HttpConfig) -> Result<Self> {
        let built = settings
            .api_key()
            .and_then(|api_key| TavilyHttpAdapter::new(api_key, http));

        match built {
            Ok(adapter) => Self::with_service(settings, Arc::new(adapter)),
            Err(e) => {
                error!("Failed to initialize web search tool: {:?}", e);
                Err(e)
            }
        }
    }

    /// Create a tool backed by an arbitrary search service
    pub fn with_service(
        settings: &SearchSettings,
        service: Arc<dyn SearchServicePort>,
    ) -> Result<Self> {
        if let Err(e) = settings.api_key() {
            error!("Failed to initialize web search tool: {:?}", e);
            return Err(e);
        }

        info!("Initializing web search tool");
        Ok(Self {
            service,
            profiles: Arc::new(DefaultProfiles::from_settings(settings)),
        })
    }

    /// Default argument profiles in effect for this tool
    pub fn profiles(&self) -> &DefaultProfiles {
        &self.profiles
    }

    /// Run `function` with a raw argument mapping
    #[instrument(skip(self, function, arguments), fields(function = %function))]
    pub async fn invoke(
        &self,
        function: SearchFunction,
        arguments: serde_json::Map<String, Value>,
    ) -> Result<Value> {
        info!("Arguments: {}", serde_json::Value::Object(arguments.clone()));

        match function {
            SearchFunction::Search => self.search(parse_input(arguments)?).await,
            SearchFunction::GetSearchContext => {
                self.get_search_context(parse_input(arguments)?).await
            }
            SearchFunction::QnaSearch => self.qna_search(parse_input(arguments)?).await,
            SearchFunction::Extract => self.extract(parse_input(arguments)?).await,
        }
    }

    /// Full web search against the full-search defaults
    #[instrument(skip(self, input), fields(endpoint_id = %input.endpoint_id))]
    pub async fn search(&self, input: SearchInput) -> Result<Value> {
        log_query_input("search", &input);
        let args = merge_args(&self.profiles.full_search, &input.search_args);
        let result = self.service.search(&input.query, args).await;
        log_failure("search", result)
    }

    /// Search context against the context defaults
    #[instrument(skip(self, input), fields(endpoint_id = %input.endpoint_id))]
    pub async fn get_search_context(&self, input: SearchInput) -> Result<Value> {
        log_query_input("get_search_context", &input);
        let args = merge_args(&self.profiles.context, &input.search_args);
        let result = self.service.get_search_context(&input.query, args).await;
        log_failure("get_search_context", result)
    }

    /// Question answering against the base defaults
    #[instrument(skip(self, input), fields(endpoint_id = %input.endpoint_id))]
    pub async fn qna_search(&self, input: SearchInput) -> Result<Value> {
        log_query_input("qna_search", &input);
        let args = merge_args(&self.profiles.base, &input.search_args);
        let result = self.service.qna_search(&input.query, args).await;
        log_failure("qna_search", result)
    }

    /// Content extraction against the extract defaults
    #[instrument(skip(self, input), fields(endpoint_id = %input.endpoint_id))]
    pub async fn extract(&self, input: ExtractInput) -> Result<Value> {
        info!("Arguments: {:?}", input);
        info!("Endpoint ID: {}", input.endpoint_id);
        info!("URLs: {:?}", input.urls);
        let args = merge_args(&self.profiles.extract, &input.extract_args);
        let result = self.service.extract(&input.urls, args).await;
        log_failure("extract", result)
    }
}

fn log_query_input(function: &str, input: &SearchInput) {
    info!("{} arguments: {:?}", function, input);
    info!("Endpoint ID: {}", input.endpoint_id);
    info!("Query: {}", input.query);
}

fn log_failure(function: &str, result: Result<Value>) -> Result<Value> {
    if let Err(e) = &result {
        error!("{} failed: {} ({:?})", function, e, e);
    }
    result
}

/// Deserialize a raw argument mapping, reporting missing keys as input errors
fn parse_input<T: DeserializeOwned>(arguments: serde_json::Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(arguments)).map_err(|e| {
        let err = Error::InvalidInput {
            field: "arguments".to_string(),
            reason: e.to_string(),
        };
        error!("Invalid arguments: {:?}", err);
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        operation: &'static str,
        payload: Value,
        args: SearchArgs,
    }

    #[derive(Debug, Default)]
    struct RecordingService {
        calls: Mutex<Vec<Call>>,
        fail_with: Option<(u16, String)>,
    }

    impl RecordingService {
        fn failing(status: u16, message: &str) -> Self {
            Self {
                calls: Mutex::default(),
                fail_with: Some((status, message.to_string())),
            }
        }

        async fn record(&self, operation: &'static str, payload: Value, args: SearchArgs) -> Result<Value> {
            self.calls.lock().await.push(Call {
                operation,
                payload,
                args,
            });
            match &self.fail_with {
                Some((status, message)) => Err(Error::Tavily {
                    status: *status,
                    message: message.clone(),
                }),
                None => Ok(json!({"operation": operation})),
            }
        }

        async fn last_call(&self) -> Call {
            self.calls.lock().await.last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl SearchServicePort for RecordingService {
        async fn search(&self, query: &str, args: SearchArgs) -> Result<Value> {
            self.record("search", json!(query), args).await
        }

        async fn get_search_context(&self, query: &str, args: SearchArgs) -> Result<Value> {
            self.record("get_search_context", json!(query), args).await
        }

        async fn qna_search(&self, query: &str, args: SearchArgs) -> Result<Value> {
            self.record("qna_search", json!(query), args).await
        }

        async fn extract(&self, urls: &[String], args: SearchArgs) -> Result<Value> {
            self.record("extract", json!(urls), args).await
        }
    }

    fn create_test_tool(service: Arc<RecordingService>) -> WebSearchTool {
        WebSearchTool::with_service(&SearchSettings::with_api_key("k"), service).unwrap()
    }

    fn search_input(query: &str, overrides: Value) -> SearchInput {
        SearchInput {
            endpoint_id: "endpoint-1".to_string(),
            query: query.to_string(),
            search_args: overrides.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_missing_credential_fails_construction() {
        let service = Arc::new(RecordingService::default());
        let err = WebSearchTool::with_service(&SearchSettings::default(), service).unwrap_err();
        assert!(err.is_configuration_error());

        let err = WebSearchTool::new(&SearchSettings::default(), &HttpConfig::default()).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_function_names_round_trip() {
        for function in SearchFunction::ALL {
            assert_eq!(function.name().parse::<SearchFunction>().unwrap(), function);
        }
        assert!("summarize".parse::<SearchFunction>().unwrap_err().is_argument_error());
    }

    #[test]
    fn test_input_schemas_name_payload() {
        let schema = SearchFunction::Search.input_schema();
        assert!(schema["properties"]["query"].is_object());
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("endpoint_id")));
        assert!(!required.contains(&json!("search_args")));

        let schema = SearchFunction::Extract.input_schema();
        assert!(schema["properties"]["urls"].is_object());
        assert!(schema.to_string().contains("extract_depth"));
    }

    #[test]
    fn test_input_schemas_are_typed_per_function() {
        let has = |function: SearchFunction, key: &str| {
            function
                .input_schema()
                .to_string()
                .contains(&format!("\"{key}\""))
        };

        assert!(has(SearchFunction::GetSearchContext, "max_tokens"));
        assert!(!has(SearchFunction::Search, "max_tokens"));
        assert!(!has(SearchFunction::QnaSearch, "max_tokens"));

        assert!(has(SearchFunction::Search, "time_range"));
        assert!(!has(SearchFunction::GetSearchContext, "time_range"));
        assert!(!has(SearchFunction::QnaSearch, "time_range"));

        let tool = create_test_tool(Arc::new(RecordingService::default()));
        let profiles = tool.profiles();
        for (function, profile) in [
            (SearchFunction::Search, &profiles.full_search),
            (SearchFunction::GetSearchContext, &profiles.context),
            (SearchFunction::QnaSearch, &profiles.base),
            (SearchFunction::Extract, &profiles.extract),
        ] {
            for key in profile.keys() {
                assert!(has(function, key), "{function} schema lacks {key}");
            }
        }
    }

    #[tokio::test]
    async fn test_search_override_wins() {
        let service = Arc::new(RecordingService::default());
        let tool = create_test_tool(service.clone());

        let result = tool
            .search(search_input("x", json!({"max_results": 10})))
            .await
            .unwrap();
        assert_eq!(result, json!({"operation": "search"}));

        let call = service.last_call().await;
        let mut expected = tool.profiles().full_search.clone();
        expected.insert("max_results".to_string(), json!(10));
        assert_eq!(call.operation, "search");
        assert_eq!(call.payload, json!("x"));
        assert_eq!(call.args, expected);
    }

    #[tokio::test]
    async fn test_extract_forwards_profile_unchanged() {
        let service = Arc::new(RecordingService::default());
        let tool = create_test_tool(service.clone());

        tool.extract(ExtractInput {
            endpoint_id: "endpoint-1".to_string(),
            urls: vec!["https://a.com".to_string()],
            extract_args: SearchArgs::new(),
        })
        .await
        .unwrap();

        let call = service.last_call().await;
        assert_eq!(call.operation, "extract");
        assert_eq!(call.payload, json!(["https://a.com"]));
        assert_eq!(call.args, tool.profiles().extract);
    }

    #[tokio::test]
    async fn test_context_and_qna_use_their_profiles() {
        let service = Arc::new(RecordingService::default());
        let tool = create_test_tool(service.clone());

        tool.get_search_context(search_input("ctx", json!({"max_tokens": 100})))
            .await
            .unwrap();
        let call = service.last_call().await;
        assert_eq!(call.operation, "get_search_context");
        assert_eq!(call.args["max_tokens"], json!(100));
        assert_eq!(call.args.len(), tool.profiles().context.len());

        tool.qna_search(search_input("q?", json!({}))).await.unwrap();
        let call = service.last_call().await;
        assert_eq!(call.operation, "qna_search");
        assert_eq!(call.args, tool.profiles().base);
    }

    #[tokio::test]
    async fn test_list_override_replaces_default() {
        let service = Arc::new(RecordingService::default());
        let settings = SearchSettings {
            include_domains: Some(vec!["a.com".to_string(), "b.com".to_string()]),
            ..SearchSettings::with_api_key("k")
        };
        let tool = WebSearchTool::with_service(&settings, service.clone()).unwrap();

        tool.search(search_input("x", json!({"include_domains": ["c.com"]})))
            .await
            .unwrap();
        assert_eq!(
            service.last_call().await.args["include_domains"],
            json!(["c.com"])
        );
    }

    #[tokio::test]
    async fn test_service_error_is_returned_unchanged() {
        let service = Arc::new(RecordingService::failing(432, "plan limit exceeded"));
        let tool = create_test_tool(service.clone());

        let err = tool.search(search_input("x", json!({}))).await.unwrap_err();
        match err {
            Error::Tavily { status, message } => {
                assert_eq!(status, 432);
                assert_eq!(message, "plan limit exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(service.calls.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_invoke_dispatches_raw_arguments() {
        let service = Arc::new(RecordingService::default());
        let tool = create_test_tool(service.clone());

        let arguments = json!({
            "endpoint_id": "e",
            "urls": ["https://a.com", "https://b.com"],
            "search_args": {"extract_depth": "advanced"}
        });
        let result = tool
            .invoke(
                SearchFunction::Extract,
                arguments.as_object().cloned().unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(result, json!({"operation": "extract"}));

        let call = service.last_call().await;
        assert_eq!(call.payload, json!(["https://a.com", "https://b.com"]));
        assert_eq!(call.args["extract_depth"], json!("advanced"));
    }

    #[tokio::test]
    async fn test_invoke_missing_payload_is_argument_error() {
        let service = Arc::new(RecordingService::default());
        let tool = create_test_tool(service.clone());

        for (function, arguments) in [
            (SearchFunction::Search, json!({"endpoint_id": "e"})),
            (SearchFunction::QnaSearch, json!({"query": "q"})),
            (SearchFunction::Extract, json!({"endpoint_id": "e", "query": "q"})),
        ] {
            let err = tool
                .invoke(function, arguments.as_object().cloned().unwrap())
                .await
                .unwrap_err();
            assert!(err.is_argument_error(), "{function}: {err}");
        }
        assert!(service.calls.lock().await.is_empty());
    }
}
