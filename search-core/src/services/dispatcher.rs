//! Query dispatcher: payload building and endpoint selection for searches.
//!
//! | mode   | endpoint                 | payload                                  |
//! |--------|--------------------------|------------------------------------------|
//! | Router | `POST {base}/route`      | `q, k, ck, bk, before?, workspace?`      |
//! | Agent  | `POST {base}/agent`      | `question, k, steps, before?, workspace?`|
//!
//! Fields that belong to the other mode are never sent. `before` and
//! `workspace` are omitted when unset. Ordering between concurrent dispatches
//! is the caller's concern; see [`crate::sequencing`].

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    config::client_config::DEFAULT_TIMEOUT_SECS,
    error_handler::{SearchResult, normalize_api_base},
    models::{ApiResult, QueryMode, QueryRequest},
    normalizer::normalize,
    sequencing::{Sequenced, Ticket},
    services::http::{build_client, ensure_success, read_json},
};

/// Full URL for a mode, with trailing slashes stripped from the base.
///
/// # Errors
/// [`crate::SearchError::Validation`] for a blank or non-http base.
pub fn endpoint_url(mode: QueryMode, api_base: &str) -> SearchResult<String> {
    let base = normalize_api_base(api_base)?;
    let path = match mode {
        QueryMode::Router => "/route",
        QueryMode::Agent => "/agent",
    };
    Ok(format!("{base}{path}"))
}

/// Request body for `/route`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RoutePayload<'a> {
    pub q: &'a str,
    pub k: u32,
    pub ck: u32,
    pub bk: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<&'a str>,
}

/// Request body for `/agent`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AgentPayload<'a> {
    pub question: &'a str,
    pub k: u32,
    pub steps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<&'a str>,
}

/// Mode-specific body; serializes as the inner payload.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Payload<'a> {
    Route(RoutePayload<'a>),
    Agent(AgentPayload<'a>),
}

/// Builds the body for the request's mode.
pub fn build_payload(request: &QueryRequest) -> Payload<'_> {
    match request.mode() {
        QueryMode::Router => Payload::Route(RoutePayload {
            q: request.question(),
            k: request.top_k(),
            ck: request.chunk_k(),
            bk: request.bm25_k(),
            before: request.before(),
            workspace: request.workspace(),
        }),
        QueryMode::Agent => Payload::Agent(AgentPayload {
            question: request.question(),
            k: request.top_k(),
            steps: request.steps(),
            before: request.before(),
            workspace: request.workspace(),
        }),
    }
}

/// Sends searches and normalizes their responses. Holds no per-search state.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
}

impl Dispatcher {
    /// Creates a dispatcher with a request timeout (default 120 s).
    ///
    /// # Errors
    /// [`crate::SearchError::Transport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> SearchResult<Self> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        Ok(Self {
            client: build_client(timeout)?,
        })
    }

    /// Sends one search and returns the canonical result.
    ///
    /// # Errors
    /// - [`crate::SearchError::Validation`] for a bad `api_base`
    /// - [`crate::SearchError::Transport`] on network failure
    /// - [`crate::SearchError::HttpStatus`] on non-2xx
    /// - [`crate::SearchError::Protocol`] for non-JSON or unrecognized bodies
    #[instrument(skip_all, fields(mode = %request.mode()))]
    pub async fn dispatch(
        &self,
        request: &QueryRequest,
        api_base: &str,
    ) -> SearchResult<ApiResult> {
        let url = endpoint_url(request.mode(), api_base)?;
        let payload = build_payload(request);

        debug!(
            k = request.top_k(),
            before = ?request.before(),
            workspace = ?request.workspace(),
            "POST {}", url
        );

        let resp = self.client.post(&url).json(&payload).send().await?;
        let resp = ensure_success(resp, &url).await?;
        let raw = read_json(resp, &url).await?;
        normalize(&raw)
    }

    /// Like [`Dispatcher::dispatch`], with the outcome tagged by `ticket` so
    /// the caller can discard it if a newer search was started meanwhile.
    pub async fn dispatch_sequenced(
        &self,
        ticket: Ticket,
        request: &QueryRequest,
        api_base: &str,
    ) -> Sequenced<SearchResult<ApiResult>> {
        debug!(ticket = ticket.get(), "dispatching sequenced search");
        Sequenced::new(ticket, self.dispatch(request, api_base).await)
    }
}
