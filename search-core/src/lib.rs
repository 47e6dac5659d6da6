//! Presentation-agnostic client core for the local retrieval service.
//!
//! Front ends (terminal, desktop, browser) call into this crate with plain
//! data and render plain data back:
//!
//! - [`services::dispatcher`]: builds the payload and picks `/route` or `/agent`
//! - [`normalizer`]: maps both response shapes onto [`ApiResult`]
//! - [`path_resolver`]: turns a citation path into a local file path
//! - [`sequencing`]: discards responses superseded by a newer search

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod models;
pub mod normalizer;
pub mod path_resolver;
pub mod search_client;
pub mod sequencing;
pub mod services;
pub mod telemetry;
pub mod workspace_store;

pub use config::{ClientConfig, config_from_env};
pub use error_handler::{SearchError, SearchResult};
pub use models::{
    AnswerResult, ApiResult, Citation, FileHit, FileListResult, QueryForm, QueryMode,
    QueryRequest, Via,
};
pub use path_resolver::{ResolveTier, ResolvedPath, resolve, resolve_detailed};
pub use search_client::SearchClient;
pub use sequencing::{DisplayedResult, RequestSequencer, Sequenced, Ticket};
pub use services::backend_service::{IndexAck, IndexKind};
pub use workspace_store::WorkspaceStore;
