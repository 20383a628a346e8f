//! Travis client configuration

use serde::{Deserialize, Serialize};

/// Public Travis CI API endpoint
pub const DEFAULT_API_URL: &str = "https://api.travis-ci.com";

/// Builds requested per page when listing a repository's history
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Travis API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravisConfig {
    /// API base URL
    pub api_url: String,
    /// API token (optional for public repositories)
    pub token: Option<String>,
    /// Page size for build listings
    pub page_size: u32,
}

impl Default for TravisConfig {
    fn default() -> Self {
        TravisConfig {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TravisConfig {
    /// Create config for a specific endpoint
    pub fn new(api_url: &str) -> Self {
        TravisConfig {
            api_url: api_url.to_string(),
            token: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Set listing page size (at least 1)
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}
