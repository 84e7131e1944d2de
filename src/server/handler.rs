use crate::tools::{SearchFunction, WebSearchTool};
use crate::{Config, Error, Result};
use rmcp::{
    model::*,
    service::{RequestContext, RoleServer},
    ErrorData, ServerHandler,
};
use serde_json::Value;
use std::{future::Future, sync::Arc};
use tracing::{info, instrument};

const INSTRUCTIONS: &str = "MCP server exposing Tavily web search. Tools: search, get_search_context, qna_search and extract. Every call takes an endpoint_id plus a query (or urls for extract) and optional argument overrides.";

/// Main MCP server handler implementing rmcp
#[derive(Debug, Clone)]
pub struct TavilyServerHandler {
    web_search: WebSearchTool,
}

impl TavilyServerHandler {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        info!("Initializing Tavily MCP server handler");
        let web_search = WebSearchTool::new(&config.tavily, &config.http)?;
        Ok(Self { web_search })
    }

    /// Tool descriptors published to MCP clients
    pub fn tools() -> Vec<Tool> {
        SearchFunction::ALL
            .into_iter()
            .map(|function| {
                let schema = match function.input_schema() {
                    Value::Object(map) => map,
                    _ => JsonObject::new(),
                };
                Tool::new(function.name(), function.description(), schema)
            })
            .collect()
    }

    /// Execute a tool call by name
    #[instrument(skip(self, arguments))]
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        let function: SearchFunction = name
            .parse()
            .map_err(|e: Error| ErrorData::invalid_request(e.to_string(), None))?;

        let result = self
            .web_search
            .invoke(function, arguments.unwrap_or_default())
            .await
            .map_err(|e| {
                if e.is_argument_error() {
                    ErrorData::invalid_params(format!("Invalid {function} input: {e}"), None)
                } else {
                    ErrorData::internal_error(format!("{function} failed: {e}"), None)
                }
            })?;

        let text = match result {
            Value::String(text) => text,
            other => serde_json::to_string_pretty(&other).map_err(|e| {
                ErrorData::internal_error(format!("Serialization failed: {e}"), None)
            })?,
        };

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

impl ServerHandler for TavilyServerHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }

    #[instrument(skip(self, _request, _context))]
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = std::result::Result<ListToolsResult, ErrorData>> + Send + '_ {
        info!("Listing available tools");

        async move {
            Ok(ListToolsResult {
                tools: Self::tools(),
                next_cursor: None,
            })
        }
    }

    #[instrument(skip(self, request, _context))]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = std::result::Result<CallToolResult, ErrorData>> + Send + '_ {
        info!("Tool called: {}", request.name);

        async move { self.dispatch(&request.name, request.arguments).await }
    }
}
