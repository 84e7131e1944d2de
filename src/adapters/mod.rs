//! # Adapters Module
//!
//! Concrete implementations of the port interfaces defined in [`crate::ports`].
//! Adapters handle the actual interaction with external services while
//! conforming to the port contracts.

pub mod tavily_http_adapter;

pub use tavily_http_adapter::TavilyHttpAdapter;
