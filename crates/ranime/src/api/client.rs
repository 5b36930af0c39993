//! randomanime.org custom list client.

use super::types::{ListingPage, ListingQuery};
use crate::error::{RanimeError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for the paginated custom list endpoint.
///
/// Requests are made once; failures are returned to the caller as-is.
#[derive(Debug, Clone)]
pub struct ListingClient {
    /// HTTP client
    client: Client,
    /// Custom list endpoint
    base_url: String,
}

impl ListingClient {
    /// Create a new listing client
    ///
    /// Without a timeout a stalled connection blocks until the transport gives up.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("ranime/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(RanimeError::UpstreamTransport)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one page of a custom list
    pub async fn fetch_page(&self, query: ListingQuery) -> Result<ListingPage> {
        info!(list_id = %query.list_id, page = query.page, "Fetching listing page");

        let page = query.page.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("id", query.list_id.as_str()), ("page", page.as_str())])
            .header("authorization", &query.auth_key)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.base_url, error = %e, "Request error");
                RanimeError::UpstreamTransport(e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(RanimeError::UpstreamTransport)?;

        if !status.is_success() {
            warn!(
                url = %self.base_url,
                status = %status,
                error = %body,
                "Request failed"
            );
            return Err(RanimeError::UpstreamStatus { status, body });
        }

        let page: ListingPage = serde_json::from_str(&body).map_err(|e| {
            warn!(url = %self.base_url, error = %e, "Failed to parse response");
            RanimeError::UpstreamBody(e)
        })?;

        debug!(
            page = query.page,
            results_total = page.results_total,
            results = page.results.len(),
            "Request successful"
        );
        Ok(page)
    }
}
