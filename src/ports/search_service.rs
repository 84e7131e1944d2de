//! # Search Service Port
//!
//! Defines the port interface for the external web search service.
//! The search tool depends only on this trait, so the HTTP adapter can be
//! swapped for any other implementation (including test doubles that record
//! the arguments they receive).

use crate::tools::profiles::SearchArgs;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

/// Port interface for the external search service
///
/// Every operation receives the fully merged argument set and returns the
/// service's response untouched. Implementations must not retry or substitute
/// fallback values; failures are returned to the caller as-is.
#[async_trait]
pub trait SearchServicePort: Send + Sync + Debug {
    /// Run a web search for `query`
    async fn search(&self, query: &str, args: SearchArgs) -> Result<Value>;

    /// Retrieve condensed search context for `query`, bounded by `max_tokens`
    async fn get_search_context(&self, query: &str, args: SearchArgs) -> Result<Value>;

    /// Answer `query` as a question
    async fn qna_search(&self, query: &str, args: SearchArgs) -> Result<Value>;

    /// Extract page content from `urls`
    async fn extract(&self, urls: &[String], args: SearchArgs) -> Result<Value>;
}
