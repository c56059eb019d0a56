//! Cookie-bearing HTTP client for portal requests.
//!
//! One `PortalClient` is created per session. The cookie jar inside it is
//! what carries the authenticated state between requests; nothing above this
//! layer handles cookies directly.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::Url;
use url::form_urlencoded;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::FetchError;
use super::page::Page;
use crate::user_agent;

/// HTTP client bound to one portal base URL.
#[derive(Debug, Clone)]
pub struct PortalClient {
    client: Client,
    base_url: Url,
}

impl PortalClient {
    /// Creates a client with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] when `base_url` does not parse, or
    /// [`FetchError::ClientBuild`] when the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_timeouts(base_url, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    #[instrument(level = "debug")]
    pub fn with_timeouts(
        base_url: &str,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, FetchError> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .cookie_provider(Arc::new(Jar::default()))
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .user_agent(user_agent::default_user_agent())
            .gzip(true)
            .build()
            .map_err(|source| FetchError::ClientBuild { source })?;
        Ok(Self { client, base_url })
    }

    /// The normalized portal base URL (always ends with `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins a portal-relative path such as `moodle/` onto the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] when the join fails.
    pub fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|_| FetchError::invalid_url(format!("{}{path}", self.base_url)))
    }

    /// Fetches an HTML page.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network failure, timeout, or non-success status.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_page(&self, url: &Url) -> Result<Page, FetchError> {
        let response = self.get(url).await?;
        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::network(url.as_str(), e))?;
        debug!(bytes = body.len(), "page fetched");
        Ok(Page::new(final_url, body))
    }

    /// Submits a URL-encoded form. The response body is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network failure, timeout, or non-success status.
    #[instrument(skip(self, form), fields(url = %url))]
    pub async fn post_form(&self, url: &Url, form: &[(&str, &str)]) -> Result<(), FetchError> {
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| FetchError::network(url.as_str(), e))?;
        check_status(url, &response)?;
        debug!(status = response.status().as_u16(), "form submitted");
        Ok(())
    }

    /// Sends a GET request and returns the response for streaming.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network failure, timeout, or non-success status.
    pub async fn get(&self, url: &Url) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::network(url.as_str(), e))?;
        check_status(url, &response)?;
        Ok(response)
    }
}

fn check_status(url: &Url, response: &reqwest::Response) -> Result<(), FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::http_status(url.as_str(), status.as_u16()))
    }
}

/// Parses the base URL and guarantees a trailing slash so relative joins
/// append instead of replacing the last path segment.
fn normalize_base_url(raw: &str) -> Result<Url, FetchError> {
    let mut url = Url::parse(raw.trim()).map_err(|_| FetchError::invalid_url(raw))?;
    if url.cannot_be_a_base() {
        return Err(FetchError::invalid_url(raw));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
