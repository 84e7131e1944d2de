//! # Configuration
//!
//! Layered configuration for the Tavily MCP server. Sources are applied in order
//! of increasing precedence: built-in defaults, an optional TOML file, `TAVILY_MCP__*`
//! environment variables, the conventional `TVLY_API_KEY` variable and finally
//! command-line overrides.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_SEARCH_DEPTH: &str = "basic";
pub const DEFAULT_TOPIC: &str = "general";
pub const DEFAULT_DAYS: u32 = 7;
pub const DEFAULT_MAX_RESULTS: u32 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_EXTRACT_DEPTH: &str = "basic";

const ENV_PREFIX: &str = "TAVILY_MCP";
const CONFIG_DIR_NAME: &str = "rust-tavily-mcp";

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub tavily: SearchSettings,
}

/// MCP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Maximum time to wait for in-flight work on shutdown
    pub graceful_shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            graceful_shutdown_timeout_secs: 5,
        }
    }
}

/// HTTP client settings for the outbound Tavily API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Base URL of the Tavily REST API
    pub base_url: String,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.tavily.com".to_string(),
            connect_timeout_secs: 10,
            user_agent: format!("rust-tavily-mcp/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Search defaults captured when the adapter is built.
///
/// Every field is optional; the accessor of the same name returns the documented
/// default when the field is unset. Field names match the keys a host framework
/// passes in its settings mapping; other keys in that mapping are ignored.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Tavily API credential (required)
    pub tvly_api_key: Option<String>,
    /// `"basic"` or `"advanced"` (default: `"basic"`)
    pub search_depth: Option<String>,
    /// Search category such as `"general"` or `"news"` (default: `"general"`)
    pub topic: Option<String>,
    /// Lookback window in days (default: 7)
    pub days: Option<u32>,
    /// Maximum number of results (default: 5)
    pub max_results: Option<u32>,
    /// Domains to restrict results to (default: none)
    pub include_domains: Option<Vec<String>>,
    /// Domains to exclude from results (default: none)
    pub exclude_domains: Option<Vec<String>>,
    /// Request timeout in seconds (default: 60)
    pub timeout: Option<u64>,
    /// Token budget for search context (default: 4000)
    pub max_tokens: Option<u32>,
    /// Time range such as `"week"` or `"month"` (default: unset)
    pub time_range: Option<String>,
    /// Ask the service for a generated answer (default: false)
    pub include_answer: Option<bool>,
    /// Include raw page content (default: false)
    pub include_raw_content: Option<bool>,
    /// Include image results (default: false)
    pub include_images: Option<bool>,
    /// `"basic"` or `"advanced"` extraction (default: `"basic"`)
    pub extract_depth: Option<String>,
}

impl std::fmt::Debug for SearchSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSettings")
            .field(
                "tvly_api_key",
                &self.tvly_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("search_depth", &self.search_depth)
            .field("topic", &self.topic)
            .field("days", &self.days)
            .field("max_results", &self.max_results)
            .field("include_domains", &self.include_domains)
            .field("exclude_domains", &self.exclude_domains)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("time_range", &self.time_range)
            .field("include_answer", &self.include_answer)
            .field("include_raw_content", &self.include_raw_content)
            .field("include_images", &self.include_images)
            .field("extract_depth", &self.extract_depth)
            .finish()
    }
}

impl SearchSettings {
    /// Settings with only the credential set
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            tvly_api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Build settings from a dynamic keyword mapping
    pub fn from_map(settings: serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        serde_json::from_value(serde_json::Value::Object(settings)).map_err(|e| {
            Error::InvalidConfig {
                field: "settings".to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// The credential, if present and non-blank
    pub fn api_key(&self) -> Result<&str> {
        match self.tvly_api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(Error::missing_credential()),
        }
    }

    pub fn search_depth(&self) -> &str {
        self.search_depth.as_deref().unwrap_or(DEFAULT_SEARCH_DEPTH)
    }

    pub fn topic(&self) -> &str {
        self.topic.as_deref().unwrap_or(DEFAULT_TOPIC)
    }

    pub fn days(&self) -> u32 {
        self.days.unwrap_or(DEFAULT_DAYS)
    }

    pub fn max_results(&self) -> u32 {
        self.max_results.unwrap_or(DEFAULT_MAX_RESULTS)
    }

    pub fn include_domains(&self) -> &[String] {
        self.include_domains.as_deref().unwrap_or_default()
    }

    pub fn exclude_domains(&self) -> &[String] {
        self.exclude_domains.as_deref().unwrap_or_default()
    }

    pub fn timeout(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn time_range(&self) -> Option<&str> {
        self.time_range.as_deref()
    }

    pub fn include_answer(&self) -> bool {
        self.include_answer.unwrap_or(false)
    }

    pub fn include_raw_content(&self) -> bool {
        self.include_raw_content.unwrap_or(false)
    }

    pub fn include_images(&self) -> bool {
        self.include_images.unwrap_or(false)
    }

    pub fn extract_depth(&self) -> &str {
        self.extract_depth.as_deref().unwrap_or(DEFAULT_EXTRACT_DEPTH)
    }
}

/// Command-line overrides applied on top of every other source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub search_depth: Option<String>,
    pub max_results: Option<u32>,
    pub timeout: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CredentialEnv {
    tvly_api_key: Option<String>,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// An explicit `path` must exist. Without one, the per-user file under the
    /// platform config directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                builder = builder.add_source(::config::File::from(path).required(true));
            }
            None => {
                if let Some(default_path) = Self::default_path().filter(|p| p.exists()) {
                    info!("Loading configuration from {}", default_path.display());
                    builder = builder.add_source(::config::File::from(default_path));
                }
            }
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("tavily.include_domains")
                .with_list_parse_key("tavily.exclude_domains"),
        );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_credential_env()?;

        Ok(config)
    }

    /// `TVLY_API_KEY` beats the file and `TAVILY_MCP__*` values
    fn apply_credential_env(&mut self) -> Result<()> {
        let env: CredentialEnv = envy::from_env().map_err(|e| Error::InvalidConfig {
            field: "TVLY_API_KEY".to_string(),
            reason: e.to_string(),
        })?;

        if let Some(api_key) = env.tvly_api_key {
            debug!("Using API credential from TVLY_API_KEY");
            self.tavily.tvly_api_key = Some(api_key);
        }
        Ok(())
    }

    /// Parse configuration from a TOML string on top of the defaults
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::InvalidConfig {
            field: "toml".to_string(),
            reason: e.to_string(),
        })
    }

    /// Per-user configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join("config.toml"))
    }

    /// Apply command-line overrides
    #[must_use]
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(api_key) = &overrides.api_key {
            self.tavily.tvly_api_key = Some(api_key.clone());
        }
        if let Some(base_url) = &overrides.base_url {
            self.http.base_url.clone_from(base_url);
        }
        if let Some(search_depth) = &overrides.search_depth {
            self.tavily.search_depth = Some(search_depth.clone());
        }
        if let Some(max_results) = overrides.max_results {
            self.tavily.max_results = Some(max_results);
        }
        if let Some(timeout) = overrides.timeout {
            self.tavily.timeout = Some(timeout);
        }
        self
    }

    /// Validate settings that do not depend on the credential
    pub fn validate(&self) -> Result<()> {
        if self.http.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig {
                field: "http.base_url".to_string(),
                reason: "Base URL cannot be empty".to_string(),
            });
        }

        url::Url::parse(&self.http.base_url).map_err(|e| Error::InvalidConfig {
            field: "http.base_url".to_string(),
            reason: format!("Invalid URL: {e}"),
        })?;

        if self.http.connect_timeout_secs == 0 {
            return Err(Error::InvalidConfig {
                field: "http.connect_timeout_secs".to_string(),
                reason: "Connect timeout must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
