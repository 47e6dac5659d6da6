//! Shared HTTP plumbing for the service clients.

use std::time::Duration;

use reqwest::Response;
use serde_json::Value;
use tracing::info;

use crate::error_handler::{SearchError, SearchResult, make_snippet};

/// Builds the reqwest client used by every service in this crate.
///
/// # Errors
/// [`SearchError::Transport`] if the client cannot be built.
pub(crate) fn build_client(timeout: Duration) -> SearchResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("search-core/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Passes 2xx responses through; anything else becomes
/// [`SearchError::HttpStatus`] with a body snippet.
pub(crate) async fn ensure_success(resp: Response, url: &str) -> SearchResult<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let snippet = make_snippet(&text);
    info!(%url, %status, %snippet, "service returned non-success status");
    Err(SearchError::HttpStatus {
        status,
        url: url.to_string(),
        snippet,
    })
}

/// Reads a successful response body as JSON.
///
/// # Errors
/// [`SearchError::Transport`] while reading, [`SearchError::Protocol`] for
/// a body that is not JSON.
pub(crate) async fn read_json(resp: Response, url: &str) -> SearchResult<Value> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        SearchError::protocol(format!("{url} returned a body that is not valid JSON: {e}"))
    })
}
