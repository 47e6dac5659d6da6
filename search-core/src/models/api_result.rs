//! Canonical, mode-tagged result of one query.
//!
//! Both backend response shapes (file list and answer with citations) and all
//! their field-name variants end up in these types. One `ApiResult` replaces
//! the previously displayed result in full; nothing is merged across searches.

use serde::Serialize;

/// Which backend engine produced a result, when the service reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Via {
    Router,
    Agent,
}

impl Via {
    /// Tolerant parse; unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "router" => Some(Via::Router),
            "agent" => Some(Via::Agent),
            _ => None,
        }
    }
}

/// One ranked file from a file-lookup response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileHit {
    pub path: String,
    /// Best page within the file; `0` when unknown.
    pub page: i64,
    /// Preview text; empty when the service sent none.
    pub snippet: String,
    /// Fused rank score (`rrf`), if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Whether the keyword (BM25) index matched this file, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_bm25: Option<bool>,
}

/// Backend-asserted source reference attached to a generated answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub path: String,
    /// Page number; `0` when unknown.
    pub page: i64,
    pub chunk_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileListResult {
    pub hits: Vec<FileHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<Via>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnswerResult {
    pub text: String,
    pub citations: Vec<Citation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<Via>,
    /// Agent reasoning steps, when the service includes them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<String>>,
}

/// The canonical display model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode")]
pub enum ApiResult {
    #[serde(rename = "files")]
    FileList(FileListResult),
    #[serde(rename = "answer")]
    Answer(AnswerResult),
}

impl ApiResult {
    /// Paths a user can open from this result, in display order.
    ///
    /// File hits for a file list, citations for an answer.
    pub fn openable_paths(&self) -> Vec<&str> {
        match self {
            ApiResult::FileList(f) => f.hits.iter().map(|h| h.path.as_str()).collect(),
            ApiResult::Answer(a) => a.citations.iter().map(|c| c.path.as_str()).collect(),
        }
    }

    /// Path of the 1-based entry `n` (hit or citation), as displayed.
    pub fn path_at(&self, n: usize) -> Option<&str> {
        n.checked_sub(1)
            .and_then(|i| self.openable_paths().get(i).copied())
    }

    pub fn via(&self) -> Option<Via> {
        match self {
            ApiResult::FileList(f) => f.via,
            ApiResult::Answer(a) => a.via,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_at_is_one_based() {
        let result = ApiResult::Answer(AnswerResult {
            text: "t".into(),
            citations: vec![
                Citation { path: "a.pdf".into(), page: 1, chunk_id: None },
                Citation { path: "b.pdf".into(), page: 2, chunk_id: None },
            ],
            ..AnswerResult::default()
        });
        assert_eq!(result.path_at(0), None);
        assert_eq!(result.path_at(2), Some("b.pdf"));
        assert_eq!(result.path_at(3), None);
    }

    #[test]
    fn serializes_with_mode_tag() {
        let result = ApiResult::FileList(FileListResult::default());
        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v["mode"], "files");
        assert_eq!(v["hits"], serde_json::json!([]));
    }
}
