//! Search query parameters

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::search;

/// A search expression plus the filter and page size it is run with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Search expression in the site's query syntax
    pub text: String,
    /// Server-side filter applied to the results
    pub filter_id: u64,
    /// Results per page
    pub page_size: u32,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            filter_id: search::DEFAULT_FILTER_ID,
            page_size: search::PAGE_SIZE,
        }
    }

    pub fn with_filter_id(mut self, filter_id: u64) -> Self {
        self.filter_id = filter_id;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Request URL of one result page
    pub fn page_url(&self, search_endpoint: &Url, page: u32) -> Url {
        let mut url = search_endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("q", &self.text)
            .append_pair("per_page", &self.page_size.to_string())
            .append_pair("page", &page.to_string())
            .append_pair("filter_id", &self.filter_id.to_string());
        url
    }
}
