//! Per-client configuration
//!
//! `ClientConfig` carries everything a `PokedexClient` needs to know about the
//! upstream service and how to talk to it. It is scoped to one client instance.

use std::time::Duration;
use thiserror::Error;

/// Base URL of the public PokeAPI service
pub const DEFAULT_BASE_URL: &str = "http://pokeapi.co";

/// API version prefix placed between the base URL and the entity path
pub const DEFAULT_VERSION_PATH: &str = "/api/v2/";

/// How long a fetched response stays fresh (1,000,000 seconds, about 11.5 days)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(1_000_000);

/// Upper bound on simultaneous requests issued by one batch lookup
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Errors raised while turning a `ClientConfig` into a working client
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL is not an absolute http(s) URL
    #[error("Invalid base URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Settings for a single client instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Whether outbound requests carry the client's cookies
    pub with_credentials: bool,
    /// Scheme and host of the upstream service, without a trailing slash
    pub base_url: String,
    /// Version segment, e.g. `/api/v2/`
    pub version_path: String,
    /// Freshness window for cached responses
    pub cache_ttl: Duration,
    /// Maximum number of in-flight requests per batch lookup (at least 1)
    pub max_concurrency: usize,
    /// Per-request timeout; `None` leaves reqwest's default (no timeout)
    pub timeout: Option<Duration>,
    /// Value of the `User-Agent` header
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            with_credentials: true,
            base_url: DEFAULT_BASE_URL.to_string(),
            version_path: DEFAULT_VERSION_PATH.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Sets whether requests attach the client's cookies
    pub fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.with_credentials = with_credentials;
        self
    }

    /// Points the client at a different host (trailing slashes are dropped)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the version segment; it is normalized to start and end with `/`
    pub fn with_version_path(mut self, version_path: impl AsRef<str>) -> Self {
        let trimmed = version_path.as_ref().trim_matches('/');
        self.version_path = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        };
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    /// Bounds batch fan-out; zero is treated as one
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Checks that the settings can produce a usable client
    pub fn validate(&self) -> Result<(), ConfigError> {
        let host = self
            .base_url
            .strip_prefix("http://")
            .or_else(|| self.base_url.strip_prefix("https://"));

        match host {
            Some(host) if !host.is_empty() => Ok(()),
            _ => Err(ConfigError::InvalidBaseUrl(self.base_url.clone())),
        }
    }

    /// The URL prefix shared by every endpoint, e.g. `http://pokeapi.co/api/v2/`
    pub fn api_root(&self) -> String {
        format!("{}{}", self.base_url, self.version_path)
    }
}
