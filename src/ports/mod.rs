//! # Ports Module
//!
//! Port interfaces between the search tool and the outside world.
//! Ports say what the tool needs from an external service; adapters in
//! [`crate::adapters`] say how it is reached.

pub mod search_service;

pub use search_service::SearchServicePort;
