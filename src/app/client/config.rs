//! HTTP client configuration and building logic
//!
//! One `reqwest::Client` is shared by the search producer and every download
//! worker, so its connection pool is sized for the worker count rather than
//! for a single request stream.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{http, search};
use crate::errors::{ConfigError, ConfigResult};

/// Configuration for the shared HTTP client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Site root the search path is resolved against
    pub base_url: String,
    /// User agent sent with every request
    pub user_agent: String,
    /// Connect timeout (transport default when unset)
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Option<Duration>,
    /// Whole-request timeout (transport default when unset)
    #[serde(with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
    /// TCP keep-alive settings
    #[serde(with = "humantime_serde")]
    pub tcp_keepalive: Option<Duration>,
    /// Maximum number of idle connections per host
    pub pool_max_per_host: usize,
    /// Connection pool idle timeout
    #[serde(with = "humantime_serde")]
    pub pool_idle_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: search::BASE_URL.to_string(),
            user_agent: http::USER_AGENT.to_string(),
            connect_timeout: None,
            request_timeout: None,
            tcp_nodelay: true,
            tcp_keepalive: Some(http::TCP_KEEPALIVE),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
        }
    }
}

impl ClientConfig {
    /// Point the client at another site root, e.g. a mirror or a test server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Parse the configured base URL
    pub fn parsed_base_url(&self) -> ConfigResult<Url> {
        Url::parse(&self.base_url)
            .map_err(|e| ConfigError::invalid("client.base_url", &self.base_url, e.to_string()))
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let url = self.parsed_base_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "client.base_url",
                &self.base_url,
                "Only http and https URLs are supported",
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "client.user_agent".to_string(),
            });
        }
        Ok(())
    }

    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> ConfigResult<Client> {
        let mut client_builder = Client::builder()
            .user_agent(self.user_agent.as_str())
            .tcp_nodelay(self.tcp_nodelay)
            .pool_max_idle_per_host(self.pool_max_per_host);

        if let Some(timeout) = self.connect_timeout {
            client_builder = client_builder.connect_timeout(timeout);
        }

        if let Some(timeout) = self.request_timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(keepalive) = self.tcp_keepalive {
            client_builder = client_builder.tcp_keepalive(keepalive);
        }

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder.build().map_err(ConfigError::HttpClient)
    }
}
