//! User intent before dispatch.
//!
//! A [`QueryRequest`] is built fresh for every search action, either from raw
//! form input ([`QueryForm`]) or programmatically via [`QueryRequest::router`] /
//! [`QueryRequest::agent`]. Both paths share the same normalization rules, so
//! the request handed to the dispatcher always holds a non-empty question and
//! positive depths.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error_handler::{SearchError, SearchResult};

/// Number of chunks sent to the LLM (or files shown in file lookup).
pub const DEFAULT_TOP_K: u32 = 6;
/// Vector retrieval depth (router only).
pub const DEFAULT_CHUNK_K: u32 = 8;
/// BM25 retrieval depth (router only).
pub const DEFAULT_BM25_K: u32 = 20;
/// Maximum agent tool steps (agent only).
pub const DEFAULT_STEPS: u32 = 4;

/// Backend path selected by the user up front.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Rule-based router: file hits or a generated answer.
    #[default]
    Router,
    /// Multi-step LLM agent bounded by `steps`.
    Agent,
}

impl QueryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryMode::Router => "router",
            QueryMode::Agent => "agent",
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "router" => Ok(QueryMode::Router),
            "agent" => Ok(QueryMode::Agent),
            other => Err(SearchError::Validation(format!(
                "unknown mode `{other}` (expected `router` or `agent`)"
            ))),
        }
    }
}

/// Raw, untyped form input exactly as typed by the user.
///
/// Numeric fields stay as text here; [`QueryRequest::from_form`] decides what
/// is usable.
#[derive(Debug, Clone, Default)]
pub struct QueryForm {
    pub mode: QueryMode,
    pub question: String,
    pub top_k: Option<String>,
    pub chunk_k: Option<String>,
    pub bm25_k: Option<String>,
    pub before: Option<String>,
    pub steps: Option<String>,
    pub workspace: Option<String>,
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    mode: QueryMode,
    question: String,
    top_k: u32,
    chunk_k: u32,
    bm25_k: u32,
    before: Option<String>,
    steps: u32,
    workspace: Option<String>,
}

impl QueryRequest {
    /// Creates a request for the given mode with default depths.
    ///
    /// # Errors
    /// [`SearchError::Validation`] if `question` is blank.
    pub fn new(mode: QueryMode, question: impl AsRef<str>) -> SearchResult<Self> {
        let question = question.as_ref().trim();
        if question.is_empty() {
            return Err(SearchError::Validation("question must not be empty".into()));
        }
        Ok(Self {
            mode,
            question: question.to_string(),
            top_k: DEFAULT_TOP_K,
            chunk_k: DEFAULT_CHUNK_K,
            bm25_k: DEFAULT_BM25_K,
            before: None,
            steps: DEFAULT_STEPS,
            workspace: None,
        })
    }

    /// Router-mode request with defaults.
    pub fn router(question: impl AsRef<str>) -> SearchResult<Self> {
        Self::new(QueryMode::Router, question)
    }

    /// Agent-mode request with defaults.
    pub fn agent(question: impl AsRef<str>) -> SearchResult<Self> {
        Self::new(QueryMode::Agent, question)
    }

    /// Builds a request from raw form input.
    ///
    /// Numeric fields fall back to their defaults when absent, unparseable or
    /// not positive. `before` and `workspace` are trimmed; empty means unset.
    ///
    /// # Errors
    /// [`SearchError::Validation`] if the question is blank.
    pub fn from_form(form: &QueryForm) -> SearchResult<Self> {
        Ok(Self::new(form.mode, &form.question)?
            .with_top_k(parse_positive(form.top_k.as_deref(), DEFAULT_TOP_K))
            .with_chunk_k(parse_positive(form.chunk_k.as_deref(), DEFAULT_CHUNK_K))
            .with_bm25_k(parse_positive(form.bm25_k.as_deref(), DEFAULT_BM25_K))
            .with_steps(parse_positive(form.steps.as_deref(), DEFAULT_STEPS))
            .with_before(form.before.as_deref())
            .with_workspace(form.workspace.as_deref()))
    }

    pub fn with_top_k(mut self, k: u32) -> Self {
        self.top_k = positive_or(k, DEFAULT_TOP_K);
        self
    }

    pub fn with_chunk_k(mut self, ck: u32) -> Self {
        self.chunk_k = positive_or(ck, DEFAULT_CHUNK_K);
        self
    }

    pub fn with_bm25_k(mut self, bk: u32) -> Self {
        self.bm25_k = positive_or(bk, DEFAULT_BM25_K);
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = positive_or(steps, DEFAULT_STEPS);
        self
    }

    /// Sets the `before` date filter; blank clears it.
    pub fn with_before(mut self, before: Option<&str>) -> Self {
        self.before = trimmed_non_empty(before);
        self
    }

    /// Sets the workspace directory; blank clears it.
    pub fn with_workspace(mut self, workspace: Option<&str>) -> Self {
        self.workspace = trimmed_non_empty(workspace);
        self
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn top_k(&self) -> u32 {
        self.top_k
    }

    pub fn chunk_k(&self) -> u32 {
        self.chunk_k
    }

    pub fn bm25_k(&self) -> u32 {
        self.bm25_k
    }

    pub fn before(&self) -> Option<&str> {
        self.before.as_deref()
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn workspace(&self) -> Option<&str> {
        self.workspace.as_deref()
    }
}

fn positive_or(value: u32, default: u32) -> u32 {
    if value == 0 { default } else { value }
}

fn parse_positive(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .map(|v| positive_or(v, default))
        .unwrap_or(default)
}

fn trimmed_non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_question_is_rejected() {
        let err = QueryRequest::router("   ").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn form_numbers_fall_back_to_defaults() {
        let form = QueryForm {
            question: "  where is the invoice?  ".into(),
            top_k: Some("abc".into()),
            chunk_k: Some("0".into()),
            bm25_k: Some(" 50 ".into()),
            steps: None,
            before: Some("   ".into()),
            workspace: Some(" /data/docs ".into()),
            ..QueryForm::default()
        };
        let req = QueryRequest::from_form(&form).unwrap();
        assert_eq!(req.question(), "where is the invoice?");
        assert_eq!(req.top_k(), DEFAULT_TOP_K);
        assert_eq!(req.chunk_k(), DEFAULT_CHUNK_K);
        assert_eq!(req.bm25_k(), 50);
        assert_eq!(req.steps(), DEFAULT_STEPS);
        assert_eq!(req.before(), None);
        assert_eq!(req.workspace(), Some("/data/docs"));
    }

    #[test]
    fn negative_numbers_are_not_positive() {
        let form = QueryForm {
            question: "q".into(),
            top_k: Some("-3".into()),
            ..QueryForm::default()
        };
        assert_eq!(QueryRequest::from_form(&form).unwrap().top_k(), DEFAULT_TOP_K);
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!(" Agent ".parse::<QueryMode>().unwrap(), QueryMode::Agent);
        assert_eq!("ROUTER".parse::<QueryMode>().unwrap(), QueryMode::Router);
        assert!("llm".parse::<QueryMode>().is_err());
    }
}
