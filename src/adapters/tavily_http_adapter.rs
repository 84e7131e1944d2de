//! # Tavily HTTP Adapter
//!
//! Concrete implementation of the [`SearchServicePort`] backed by the Tavily
//! REST API. Question answering and search context are served from the
//! `/search` endpoint the same way the official client libraries do it.

use crate::config::{HttpConfig, DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT_SECS};
use crate::ports::SearchServicePort;
use crate::tools::profiles::SearchArgs;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tiktoken_rs::CoreBPE;
use tracing::{debug, instrument};

/// Upper bound on the per-request timeout accepted by the service
const MAX_REQUEST_TIMEOUT_SECS: f64 = 120.0;

/// HTTP adapter for the Tavily API
#[derive(Clone)]
pub struct TavilyHttpAdapter {
    client: Client,
    api_key: String,
    base_url: String,
    /// cl100k_base tokenizer used to budget search context
    tokenizer: Arc<CoreBPE>,
}

impl std::fmt::Debug for TavilyHttpAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyHttpAdapter")
            .field("client", &"reqwest::Client")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("tokenizer", &"cl100k_base")
            .finish()
    }
}

impl TavilyHttpAdapter {
    /// Create a new adapter authenticated with `api_key`
    pub fn new(api_key: &str, http: &HttpConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::missing_credential());
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
            .user_agent(&http.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| Error::InvalidConfig {
                field: "http".to_string(),
                reason: format!("Failed to create HTTP client: {e}"),
            })?;

        let tokenizer = tiktoken_rs::cl100k_base().map_err(|e| Error::InvalidConfig {
            field: "tokenizer".to_string(),
            reason: format!("Failed to load cl100k_base tokenizer: {e}"),
        })?;

        debug!("Tavily HTTP adapter targeting {}", http.base_url);

        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
            base_url: http.base_url.trim_end_matches('/').to_string(),
            tokenizer: Arc::new(tokenizer),
        })
    }

    /// POST `body` to `endpoint` and return the decoded JSON reply.
    ///
    /// `timeout` is consumed as the request timeout and null values are dropped
    /// from the body.
    #[allow(clippy::cast_precision_loss)]
    async fn post(&self, endpoint: &str, body: SearchArgs) -> Result<Value> {
        let timeout = numeric_arg(&body, "timeout")?
            .unwrap_or(DEFAULT_TIMEOUT_SECS as f64)
            .min(MAX_REQUEST_TIMEOUT_SECS);

        let body: SearchArgs = body
            .into_iter()
            .filter(|(key, value)| key != "timeout" && !value.is_null())
            .collect();

        let url = format!("{}/{endpoint}", self.base_url);
        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs_f64(timeout))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        debug!(
            "Tavily /{} responded {} in {}ms",
            endpoint,
            status,
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Tavily {
                status: status.as_u16(),
                message: error_message(&text, status.canonical_reason()),
            });
        }

        response.json::<Value>().await.map_err(|e| Error::Parse {
            context: format!("tavily /{endpoint} response"),
            message: e.to_string(),
        })
    }

    /// Keep leading items while their cl100k token total stays within `max_tokens`
    #[allow(clippy::cast_precision_loss)]
    fn take_within_token_budget(&self, items: Vec<Value>, max_tokens: f64) -> Vec<Value> {
        let mut kept = Vec::new();
        let mut used = 0usize;
        for item in items {
            let cost = self.count_tokens(&item.to_string());
            if (used + cost) as f64 > max_tokens {
                break;
            }
            used += cost;
            kept.push(item);
        }
        kept
    }

    fn count_tokens(&self, text: &str) -> usize {
        self.tokenizer.encode_ordinary(text).len()
    }
}

#[async_trait]
impl SearchServicePort for TavilyHttpAdapter {
    #[instrument(skip(self, args))]
    async fn search(&self, query: &str, args: SearchArgs) -> Result<Value> {
        let mut body = SearchArgs::new();
        body.insert("query".to_string(), json!(query));
        body.extend(args);
        self.post("search", body).await
    }

    #[instrument(skip(self, args))]
    async fn get_search_context(&self, query: &str, mut args: SearchArgs) -> Result<Value> {
        let max_tokens = numeric_arg(&args, "max_tokens")?.unwrap_or(f64::from(DEFAULT_MAX_TOKENS));
        args.remove("max_tokens");

        args.insert("include_answer".to_string(), json!(false));
        args.insert("include_raw_content".to_string(), json!(false));
        args.insert("include_images".to_string(), json!(false));

        let response = self.search(query, args).await?;
        let sources: Vec<Value> = response
            .get("results")
            .and_then(Value::as_array)
            .map(|results| {
                results
                    .iter()
                    .map(|r| json!({ "url": r.get("url"), "content": r.get("content") }))
                    .collect()
            })
            .unwrap_or_default();

        let context = self.take_within_token_budget(sources, max_tokens);
        Ok(Value::String(serde_json::to_string(&context)?))
    }

    #[instrument(skip(self, args))]
    async fn qna_search(&self, query: &str, mut args: SearchArgs) -> Result<Value> {
        args.insert("include_answer".to_string(), json!(true));
        args.insert("include_raw_content".to_string(), json!(false));
        args.insert("include_images".to_string(), json!(false));

        let response = self.search(query, args).await?;
        Ok(response.get("answer").cloned().unwrap_or_else(|| json!("")))
    }

    #[instrument(skip(self, args))]
    async fn extract(&self, urls: &[String], args: SearchArgs) -> Result<Value> {
        let mut body = SearchArgs::new();
        body.insert("urls".to_string(), json!(urls));
        body.extend(args);
        self.post("extract", body).await
    }
}

/// Read a non-negative number from `args`. Absent or null means unset
fn numeric_arg(args: &SearchArgs, key: &str) -> Result<Option<f64>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .filter(|n| *n >= 0.0)
            .map(Some)
            .ok_or_else(|| Error::InvalidInput {
                field: key.to_string(),
                reason: format!("expected a non-negative number, got {value}"),
            }),
    }
}

/// Pull a readable message out of an error body
fn error_message(body: &str, reason: Option<&str>) -> String {
    let detail = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        v.pointer("/detail/error")
            .or_else(|| v.get("detail"))
            .and_then(Value::as_str)
            .map(ToString::to_string)
    });

    match detail {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => reason.unwrap_or("Unknown error").to_string(),
    }
}
