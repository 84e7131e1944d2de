use thiserror::Error;

/// Error type shared by configuration, argument handling and the outbound search service
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (raised at construction)
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },

    // Argument errors (raised per call)
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    // External service errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Tavily service error: {status} - {message}")]
    Tavily { status: u16, message: String },

    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    // MCP plumbing
    #[error("Service error: {0}")]
    Service(String),
}

impl Error {
    /// Error raised while building the adapter from its settings
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::InvalidConfig { .. })
    }

    /// Error caused by a malformed or incomplete call payload
    pub const fn is_argument_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    /// Failure surfaced by the external search service
    pub const fn is_external_error(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Tavily { .. } | Self::Parse { .. }
        )
    }

    pub(crate) fn missing_credential() -> Self {
        Self::InvalidConfig {
            field: "tvly_api_key".to_string(),
            reason: "API credential is required".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
