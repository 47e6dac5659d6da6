//! Facade shared by every front end.
//!
//! - Construct once from a [`ClientConfig`], wrap in `Arc`, and pass clones
//!   to whatever starts searches.
//! - Bundles the [`Dispatcher`], the [`BackendService`] and the
//!   [`HealthService`] over one API base.
//! - Holds no search state; ordering of concurrent searches is handled with
//!   [`crate::sequencing`] on the caller side.
//!
//! # Example
//! ```no_run
//! use search_core::{ClientConfig, QueryRequest, SearchClient};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SearchClient::from_config(&ClientConfig::default())?;
//! let request = QueryRequest::router("Which file mentions HTTP_500 errors?")?;
//! let result = client.search(&request).await?;
//! println!("{result:?}");
//! # Ok(()) }
//! ```

use tracing::info;

use crate::{
    config::ClientConfig,
    error_handler::{SearchResult, normalize_api_base},
    health_service::{HealthService, HealthStatus},
    models::{ApiResult, QueryRequest},
    sequencing::{Sequenced, Ticket},
    services::{
        backend_service::{BackendService, IndexAck, IndexKind},
        dispatcher::Dispatcher,
    },
};

#[derive(Debug)]
pub struct SearchClient {
    api_base: String,
    dispatcher: Dispatcher,
    backend: BackendService,
    health: HealthService,
}

impl SearchClient {
    /// Builds all services for `cfg.api_base`.
    ///
    /// # Errors
    /// [`crate::SearchError::Validation`] for a bad API base;
    /// [`crate::SearchError::Transport`] if an HTTP client cannot be built.
    pub fn from_config(cfg: &ClientConfig) -> SearchResult<Self> {
        let api_base = normalize_api_base(&cfg.api_base)?;
        info!(
            api_base = %api_base,
            timeout_secs = cfg.timeout_secs,
            "search client initialized"
        );
        Ok(Self {
            dispatcher: Dispatcher::new(Some(cfg.timeout_secs))?,
            backend: BackendService::new(&api_base, Some(cfg.timeout_secs))?,
            health: HealthService::new(Some(cfg.health_timeout_secs))?,
            api_base,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Runs one search against the configured base.
    pub async fn search(&self, request: &QueryRequest) -> SearchResult<ApiResult> {
        self.dispatcher.dispatch(request, &self.api_base).await
    }

    /// Runs one search and tags the outcome with `ticket`.
    pub async fn search_sequenced(
        &self,
        ticket: Ticket,
        request: &QueryRequest,
    ) -> Sequenced<SearchResult<ApiResult>> {
        self.dispatcher
            .dispatch_sequenced(ticket, request, &self.api_base)
            .await
    }

    /// Resilient health probe.
    pub async fn health(&self) -> HealthStatus {
        self.health.check(&self.api_base).await
    }

    pub async fn build_index(&self, kind: IndexKind, root: &str) -> SearchResult<IndexAck> {
        self.backend.build_index(kind, root).await
    }

    pub async fn list_workspaces(&self) -> SearchResult<Vec<String>> {
        self.backend.list_workspaces().await
    }

    pub async fn pick_folder(&self) -> SearchResult<Option<String>> {
        self.backend.pick_folder().await
    }

    pub async fn open_file_remote(&self, path: &str) -> SearchResult<()> {
        self.backend.open_file_remote(path).await
    }
}
