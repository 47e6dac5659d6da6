//! Unified error handling for `search-core`.
//!
//! This module exposes a single top-level error type [`SearchError`] for the whole
//! library and groups configuration failures in [`ConfigError`]. Small helpers for
//! reading/validating environment variables are provided and return the unified
//! [`SearchResult<T>`] alias.
//!
//! The variants follow the taxonomy the front ends report to the user:
//! validation problems are shown inline, transport/status failures collapse into
//! "request failed", and protocol problems are shown as "no results".

use reqwest::StatusCode;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Maximum number of characters kept from an error response body.
pub const SNIPPET_CHARS: usize = 240;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `search-core` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SearchError {
    /// Input rejected before any network call (empty question, empty API base...).
    #[error("[Search Core] invalid input: {0}")]
    Validation(String),

    /// DNS/connection/timeout failure of the underlying HTTP client.
    #[error("[Search Core] transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("[Search Core] HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: StatusCode,
        /// Request URL.
        url: String,
        /// Short snippet of the response body (trimmed).
        snippet: String,
    },

    /// The body was not JSON, had no recognizable `mode`, or lacked a mandatory field.
    #[error("[Search Core] protocol error: {0}")]
    Protocol(String),

    /// Configuration/validation errors at startup.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Local file I/O (workspace state file).
    #[error("[Search Core] I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SearchError {
    /// Short user-facing text for this error.
    ///
    /// Full details belong in the diagnostic log, not in the UI.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::Validation(msg) => msg.clone(),
            SearchError::Transport(_) | SearchError::HttpStatus { .. } => {
                "request failed".to_string()
            }
            SearchError::Protocol(_) => "no results".to_string(),
            SearchError::Config(e) => e.to_string(),
            SearchError::Io(e) => format!("file error: {e}"),
        }
    }

    /// Whether the error happened before anything was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, SearchError::Validation(_))
    }

    /// Convenience constructor for protocol errors.
    pub(crate) fn protocol(msg: impl Into<String>) -> Self {
        SearchError::Protocol(msg.into())
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A number failed to parse (ports, timeouts).
    #[error("[Search Core] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `SEARCH_API_PORT`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u16`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[Search Core] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable or field name (e.g., `SEARCH_API_URL`).
        var: &'static str,
        /// Explanation.
        reason: &'static str,
    },
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `SearchResult<T>`)                            */
/* ------------------------------------------------------------------------- */

/// Fetches an optional environment variable (`None` if unset or blank).
pub fn opt_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional `u64` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`SearchError::Config`] with [`ConfigError::InvalidNumber`] if the
/// variable is set but not a valid `u64`.
pub fn env_opt_u64(name: &'static str) -> SearchResult<Option<u64>> {
    match opt_env(name) {
        Some(v) => v.parse::<u64>().map(Some).map_err(|_| {
            SearchError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        None => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers                                                        */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`SearchError::Config`] with [`ConfigError::InvalidFormat`] when
/// the string does not start with a valid HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> SearchResult<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Trims an API base and strips trailing slashes.
///
/// # Errors
/// [`SearchError::Validation`] if the base is blank or not an http(s) URL.
pub fn normalize_api_base(api_base: &str) -> SearchResult<String> {
    let base = api_base.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(SearchError::Validation("API base must not be empty".into()));
    }
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(SearchError::Validation(format!(
            "API base must start with http:// or https://, got `{base}`"
        )));
    }
    Ok(base.to_string())
}

/// Compacts a response body for error messages: whitespace collapsed, capped
/// at [`SNIPPET_CHARS`] characters.
pub fn make_snippet(body: &str) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(SNIPPET_CHARS).collect()
}
