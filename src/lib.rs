pub mod adapters;
pub mod config;
pub mod error;
pub mod ports;
pub mod server;
pub mod tools;

pub use adapters::TavilyHttpAdapter;
pub use crate::config::{Config, ConfigOverrides, HttpConfig, SearchSettings};
pub use error::{Error, Result};
pub use ports::SearchServicePort;
pub use server::Server;
pub use tools::{ExtractInput, SearchFunction, SearchInput, WebSearchTool};
