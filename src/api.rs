//! HTTP access to the upstream news API.
//!
//! The normalizer never talks to the network directly. It goes through the
//! [`FetchJson`] trait so tests can substitute an in-memory source and callers
//! can supply a client configured with their own deadline.
//!
//! - [`FetchJson`]: one GET with query parameters, returning the body text
//! - [`ReqwestFetcher`]: production implementation over [`reqwest::Client`]
//!
//! There is no retry policy and no default timeout. A caller that needs
//! bounded latency builds the client with [`reqwest::ClientBuilder::timeout`]
//! and hands it to [`ReqwestFetcher::with_client`].

use crate::error::FetchError;
use crate::utils::redact_token;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Trait for fetching a raw response body from the upstream API.
pub trait FetchJson {
    /// Perform one GET against `url` with `query` appended to its query string.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the URL is unusable, the transport fails,
    /// or the server answers with a non-success status.
    async fn get(
        &self,
        url: &str,
        query: &BTreeMap<String, String>,
    ) -> Result<String, FetchError>;
}

/// [`FetchJson`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Create a fetcher with a default client (no timeout).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher around a pre-configured client.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = reqwest::Client::builder()
    ///     .timeout(Duration::from_secs(10))
    ///     .build()?;
    /// let fetcher = ReqwestFetcher::with_client(client);
    /// ```
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Append `query` to `url`, leaving the URL untouched when there is nothing to add.
pub fn build_request_url(
    url: &str,
    query: &BTreeMap<String, String>,
) -> Result<Url, FetchError> {
    let mut request_url = Url::parse(url).map_err(|source| FetchError::Url {
        url: url.to_string(),
        source,
    })?;
    if !query.is_empty() {
        request_url.query_pairs_mut().extend_pairs(query);
    }
    Ok(request_url)
}

impl FetchJson for ReqwestFetcher {
    #[instrument(level = "info", skip_all)]
    async fn get(
        &self,
        url: &str,
        query: &BTreeMap<String, String>,
    ) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let request_url = build_request_url(url, query)?;
        let logged_url = redact_token(&request_url);
        debug!(url = %logged_url, "Requesting feed");

        let response = self
            .client
            .get(request_url)
            .send()
            .await
            .map_err(|e| FetchError::transport(&logged_url, e))?;
        let status = response.status();
        if !status.is_success() {
            warn!(
                url = %logged_url,
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u128,
                "Feed API returned non-success status"
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: logged_url,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::transport(&logged_url, e))?;
        info!(
            url = %logged_url,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u128,
            "Fetched feed body"
        );
        Ok(body)
    }
}
