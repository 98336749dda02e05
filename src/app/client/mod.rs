//! HTTP client for the Derpibooru API
//!
//! [`SearchClient`] performs the two kinds of request the pipeline needs:
//! fetching one page of search results and opening a streaming response
//! for an image artifact. It never retries by itself; the producer and the
//! workers decide what to do with each error kind.
//!
//! The module is organized into:
//! - `config`: HTTP client configuration and building
//! - `query`: search parameters and page URL construction

use url::Url;

use crate::app::models::{SearchItem, SearchPage};
use crate::constants::search;
use crate::errors::{
    ConfigError, ConfigResult, DownloadError, DownloadResult, SearchError, SearchResult,
};

pub mod config;
pub mod query;

pub use config::ClientConfig;
pub use query::SearchQuery;

/// HTTP client for searching Derpibooru and downloading images
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    search_endpoint: Url,
}

impl SearchClient {
    /// Creates a client for the public site with default settings
    pub fn new() -> ConfigResult<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Creates a client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL is invalid or the HTTP client
    /// cannot be built
    pub fn with_config(config: &ClientConfig) -> ConfigResult<Self> {
        config.validate()?;
        let base_url = config.parsed_base_url()?;
        let search_endpoint = base_url
            .join(search::SEARCH_PATH)
            .map_err(|e| ConfigError::invalid("client.base_url", &config.base_url, e.to_string()))?;
        let http = config.build_http_client()?;

        tracing::debug!("Created search client for {}", search_endpoint);

        Ok(Self {
            http,
            search_endpoint,
        })
    }

    /// Full URL of the search endpoint
    pub fn search_endpoint(&self) -> &Url {
        &self.search_endpoint
    }

    /// Fetch one page of results
    ///
    /// Each element of the response's `images` array becomes one
    /// [`SearchItem`], in response order. An empty vector means the result
    /// set is exhausted.
    ///
    /// # Errors
    ///
    /// - `SearchError::Transport` if no response was received
    /// - `SearchError::Status` for a non-success status
    /// - `SearchError::Body` if the body could not be read
    /// - `SearchError::Decode` if the body is not a search page
    pub async fn search_page(&self, query: &SearchQuery, page: u32) -> SearchResult<Vec<SearchItem>> {
        let url = query.page_url(&self.search_endpoint, page);
        tracing::debug!("Requesting search page {}: {}", page, url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(SearchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(SearchError::Body)?;
        let page: SearchPage = serde_json::from_slice(&body)?;

        Ok(page.into_images().into_iter().map(SearchItem::from_raw).collect())
    }

    /// Open a streaming GET for an artifact
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::NotFound` for 404 and 410,
    /// `DownloadError::Forbidden` for 403, `DownloadError::ServerError` for
    /// any other non-success status and `DownloadError::Http` when the
    /// request fails.
    pub async fn fetch_artifact(&self, url: &str) -> DownloadResult<reqwest::Response> {
        let parsed = Url::parse(url).map_err(|e| DownloadError::InvalidUrl {
            url: url.to_string(),
            error: e.to_string(),
        })?;

        let response = self.http.get(parsed).send().await?;
        let status = response.status();

        match status.as_u16() {
            _ if status.is_success() => Ok(response),
            404 | 410 => Err(DownloadError::NotFound {
                url: url.to_string(),
            }),
            403 => Err(DownloadError::Forbidden {
                url: url.to_string(),
            }),
            code => Err(DownloadError::ServerError { status: code }),
        }
    }
}
