//! Utility endpoints of the retrieval service that the front ends call
//! besides searching: index builds, workspace listing, the host-side folder
//! picker and host-side file opening.
//!
//! - `POST {base}/index/bm25`, `POST {base}/index/chroma` with `{root}`
//! - `GET  {base}/list-workspaces`
//! - `GET  {base}/pick-folder`
//! - `POST {base}/open-file` with `{path}`

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::client_config::DEFAULT_TIMEOUT_SECS,
    error_handler::{SearchError, SearchResult, normalize_api_base},
    services::http::{build_client, ensure_success, read_json},
};

/// Which index the service should (re)build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Bm25,
    Chroma,
}

impl IndexKind {
    fn path(self) -> &'static str {
        match self {
            IndexKind::Bm25 => "/index/bm25",
            IndexKind::Chroma => "/index/chroma",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexKind::Bm25 => "bm25",
            IndexKind::Chroma => "chroma",
        })
    }
}

impl FromStr for IndexKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bm25" => Ok(IndexKind::Bm25),
            "chroma" | "vector" => Ok(IndexKind::Chroma),
            other => Err(SearchError::Validation(format!(
                "unknown index kind `{other}` (expected `bm25` or `chroma`)"
            ))),
        }
    }
}

/// Acknowledgement of an index build. Decoded leniently: the exact schema is
/// not load-bearing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexAck {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub root: Option<String>,
}

/// Client for the non-search endpoints.
#[derive(Debug, Clone)]
pub struct BackendService {
    client: reqwest::Client,
    base: String,
}

impl BackendService {
    /// # Errors
    /// - [`SearchError::Validation`] for a blank or non-http base
    /// - [`SearchError::Transport`] if the HTTP client cannot be built
    pub fn new(api_base: &str, timeout_secs: Option<u64>) -> SearchResult<Self> {
        let base = normalize_api_base(api_base)?;
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        Ok(Self {
            client: build_client(timeout)?,
            base,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.base
    }

    /// Asks the service to index `root`.
    ///
    /// # Errors
    /// [`SearchError::Validation`] for a blank root; transport/status errors
    /// otherwise. An undecodable acknowledgement is not an error.
    #[instrument(skip(self))]
    pub async fn build_index(&self, kind: IndexKind, root: &str) -> SearchResult<IndexAck> {
        let root = non_blank(root, "index root")?;
        let url = format!("{}{}", self.base, kind.path());
        debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .json(&json!({ "root": root }))
            .send()
            .await?;
        let resp = ensure_success(resp, &url).await?;

        let ack = match read_json(resp, &url).await {
            Ok(raw) => serde_json::from_value::<IndexAck>(raw).unwrap_or_else(|e| {
                warn!(error = %e, "unexpected index acknowledgement shape");
                IndexAck { ok: true, ..IndexAck::default() }
            }),
            Err(e) => {
                warn!(error = %e, "index acknowledgement is not JSON");
                IndexAck { ok: true, ..IndexAck::default() }
            }
        };
        info!(%kind, root, ok = ack.ok, "index build acknowledged");
        Ok(ack)
    }

    /// Workspaces the service has indexed. A body that is not an array of
    /// strings yields the strings it does contain, possibly none.
    #[instrument(skip(self))]
    pub async fn list_workspaces(&self) -> SearchResult<Vec<String>> {
        let url = format!("{}/list-workspaces", self.base);
        debug!("GET {}", url);

        let resp = self.client.get(&url).send().await?;
        let resp = ensure_success(resp, &url).await?;
        let raw = read_json(resp, &url).await?;

        Ok(match raw {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            other => {
                warn!(body = %other, "list-workspaces did not return an array");
                Vec::new()
            }
        })
    }

    /// Opens the host-side folder picker; `None` when the reply carries no root.
    #[instrument(skip(self))]
    pub async fn pick_folder(&self) -> SearchResult<Option<String>> {
        let url = format!("{}/pick-folder", self.base);
        debug!("GET {}", url);

        let resp = self.client.get(&url).send().await?;
        let resp = ensure_success(resp, &url).await?;
        let raw = read_json(resp, &url).await?;

        Ok(raw
            .get("root")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string))
    }

    /// Asks the service host to open `path` with its default handler.
    ///
    /// # Errors
    /// [`SearchError::Validation`] for a blank path; a missing file comes
    /// back as [`SearchError::HttpStatus`] 404.
    #[instrument(skip(self))]
    pub async fn open_file_remote(&self, path: &str) -> SearchResult<()> {
        let path = non_blank(path, "path")?;
        let url = format!("{}/open-file", self.base);
        debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .json(&json!({ "path": path }))
            .send()
            .await?;
        ensure_success(resp, &url).await?;
        info!(path, "file opened on service host");
        Ok(())
    }
}

fn non_blank<'a>(value: &'a str, what: &str) -> SearchResult<&'a str> {
    let v = value.trim();
    if v.is_empty() {
        Err(SearchError::Validation(format!("{what} must not be empty")))
    } else {
        Ok(v)
    }
}
