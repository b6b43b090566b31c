//! Receipt page fetching over HTTP(S)
//!
//! One GET per URL, no retries. The response status is not used to decide
//! success: whatever body comes back is handed to the extractor.

use std::time::Duration;
use thiserror::Error;
use url::Url;

const USER_AGENT: &str = concat!("trascan/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// HTTP client for receipt pages
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher; `None` means requests wait indefinitely
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::Client)?;

        Ok(Self { client })
    }

    /// Fetch the full body of a receipt page as text
    pub async fn get_html(&self, url: &str) -> Result<String, FetchError> {
        let target = request_url(url)?;
        tracing::debug!(%target, "fetching receipt page");

        let request_err = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(request_err)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "non-success status, extracting body anyway");
        }

        response.text().await.map_err(request_err)
    }
}

/// Request target for a receipt URL: scheme, host, port and path only
pub fn request_url(url: &str) -> Result<Url, FetchError> {
    let mut parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    parsed.set_query(None);
    parsed.set_fragment(None);
    Ok(parsed)
}
