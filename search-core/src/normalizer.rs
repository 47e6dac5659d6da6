//! Maps raw service JSON onto the canonical [`ApiResult`].
//!
//! The service has shipped two schema versions, so most fields can arrive
//! under more than one key. Each field is described by an [`AliasRule`]: an
//! ordered list of candidate keys where the first present (non-null) key wins.
//! New schema variants are added by extending a rule table, not by adding
//! branches.
//!
//! Discrimination uses the top-level `mode`:
//! - `"files"` (any case) → [`ApiResult::FileList`]
//! - any other string → [`ApiResult::Answer`]
//! - missing / non-string / blank → [`SearchError::Protocol`]

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    error_handler::{SearchError, SearchResult},
    models::{AnswerResult, ApiResult, Citation, FileHit, FileListResult, Via},
};

/// Text shown when an answer-shaped body carries no `answer`.
pub const NO_ANSWER_PLACEHOLDER: &str = "(no answer returned)";

/// Ordered candidate keys for one logical field.
#[derive(Debug, Clone, Copy)]
pub struct AliasRule {
    /// Logical name used in error messages.
    pub field: &'static str,
    /// Candidate keys, highest priority first.
    pub keys: &'static [&'static str],
}

impl AliasRule {
    /// Returns the value of the first candidate key that is present and not `null`.
    pub fn lookup<'a>(&self, obj: &'a Map<String, Value>) -> Option<&'a Value> {
        self.keys
            .iter()
            .filter_map(|k| obj.get(*k))
            .find(|v| !v.is_null())
    }

    fn text(&self, obj: &Map<String, Value>) -> Option<String> {
        self.lookup(obj).and_then(as_text)
    }

    fn int(&self, obj: &Map<String, Value>) -> Option<i64> {
        self.lookup(obj).and_then(as_int)
    }
}

/* ---------------------------- rule tables ---------------------------- */

pub const FILE_PATH: AliasRule = AliasRule {
    field: "file path",
    keys: &["path", "source"],
};
pub const FILE_PAGE: AliasRule = AliasRule {
    field: "file page",
    keys: &["top_page", "page"],
};
pub const FILE_SNIPPET: AliasRule = AliasRule {
    field: "file snippet",
    keys: &["preview", "snippet"],
};
pub const FILE_SCORE: AliasRule = AliasRule {
    field: "file score",
    keys: &["rrf"],
};
pub const FILE_HAS_BM25: AliasRule = AliasRule {
    field: "file lexical match",
    keys: &["has_bm25"],
};

pub const CITATION_PATH: AliasRule = AliasRule {
    field: "citation path",
    keys: &["path", "source"],
};
pub const CITATION_PAGE: AliasRule = AliasRule {
    field: "citation page",
    keys: &["page"],
};
pub const CITATION_CHUNK_ID: AliasRule = AliasRule {
    field: "citation chunk id",
    keys: &["chunk_id"],
};

const MODE_KEY: &str = "mode";
const FILES_KEY: &str = "files";
const CITATIONS_KEY: &str = "citations";
const ANSWER_KEY: &str = "answer";
const VIA_KEY: &str = "via";
const TRACE_KEY: &str = "trace";

/* ----------------------------- entry points ----------------------------- */

/// Parses raw bytes as JSON and normalizes them.
///
/// # Errors
/// [`SearchError::Protocol`] for invalid JSON or any [`normalize`] failure.
pub fn normalize_bytes(body: &[u8]) -> SearchResult<ApiResult> {
    let raw: Value = serde_json::from_slice(body)
        .map_err(|e| SearchError::protocol(format!("response is not valid JSON: {e}")))?;
    normalize(&raw)
}

/// Converts one raw response body into the canonical model.
///
/// Pure: the same input always yields the same output.
///
/// # Errors
/// [`SearchError::Protocol`] when the body is not an object, `mode` is
/// missing or blank, a `files`/`citations` value is not an array of objects,
/// or a citation has no path.
pub fn normalize(raw: &Value) -> SearchResult<ApiResult> {
    let obj = raw
        .as_object()
        .ok_or_else(|| SearchError::protocol("response body is not a JSON object"))?;

    let mode = obj
        .get(MODE_KEY)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| {
            info!("response without a usable `mode` field");
            SearchError::protocol("response has no recognizable `mode`")
        })?;

    let via = obj.get(VIA_KEY).and_then(Value::as_str).and_then(Via::parse);

    if mode.eq_ignore_ascii_case("files") {
        let hits = entries(obj, FILES_KEY)?
            .into_iter()
            .map(file_hit)
            .collect::<Vec<_>>();
        debug!(hits = hits.len(), "normalized file list");
        Ok(ApiResult::FileList(FileListResult { hits, via }))
    } else {
        let citations = entries(obj, CITATIONS_KEY)?
            .into_iter()
            .enumerate()
            .map(|(i, c)| citation(i, c))
            .collect::<SearchResult<Vec<_>>>()?;
        let text = obj
            .get(ANSWER_KEY)
            .and_then(as_text)
            .unwrap_or_else(|| NO_ANSWER_PLACEHOLDER.to_string());
        let trace = obj.get(TRACE_KEY).and_then(Value::as_array).map(|steps| {
            steps.iter().filter_map(as_text).collect::<Vec<_>>()
        });
        debug!(mode, citations = citations.len(), "normalized answer");
        Ok(ApiResult::Answer(AnswerResult { text, citations, via, trace }))
    }
}

/* ------------------------------- internals ------------------------------ */

/// Returns the objects of an array field. Absent or `null` is an empty list.
fn entries<'a>(
    obj: &'a Map<String, Value>,
    key: &'static str,
) -> SearchResult<Vec<&'a Map<String, Value>>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_object().ok_or_else(|| {
                    SearchError::protocol(format!("`{key}[{i}]` is not an object"))
                })
            })
            .collect(),
        Some(_) => Err(SearchError::protocol(format!("`{key}` is not an array"))),
    }
}

fn file_hit(obj: &Map<String, Value>) -> FileHit {
    FileHit {
        path: FILE_PATH.text(obj).unwrap_or_default(),
        page: FILE_PAGE.int(obj).unwrap_or(0),
        snippet: FILE_SNIPPET.text(obj).unwrap_or_default(),
        score: FILE_SCORE.lookup(obj).and_then(Value::as_f64),
        has_bm25: FILE_HAS_BM25.lookup(obj).and_then(Value::as_bool),
    }
}

fn citation(index: usize, obj: &Map<String, Value>) -> SearchResult<Citation> {
    let path = CITATION_PATH.text(obj).ok_or_else(|| {
        SearchError::protocol(format!(
            "citation {index} has no {} (`path` or `source`)",
            CITATION_PATH.field
        ))
    })?;
    Ok(Citation {
        path,
        page: CITATION_PAGE.int(obj).unwrap_or(0),
        chunk_id: CITATION_CHUNK_ID.text(obj),
    })
}

/// Strings as-is, numbers as their decimal text, anything else absent.
fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integers, finite floats (truncated) and numeric strings.
fn as_int(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn files(result: ApiResult) -> FileListResult {
        match result {
            ApiResult::FileList(f) => f,
            other => panic!("expected file list, got {other:?}"),
        }
    }

    fn answer(result: ApiResult) -> AnswerResult {
        match result {
            ApiResult::Answer(a) => a,
            other => panic!("expected answer, got {other:?}"),
        }
    }

    #[test]
    fn legacy_file_keys_are_used_when_new_ones_are_missing() {
        let raw = json!({
            "mode": "files",
            "files": [{"source": "logs/app.log", "page": 3, "snippet": "HTTP_500 occurred"}]
        });
        let f = files(normalize(&raw).unwrap());
        assert_eq!(
            f.hits,
            vec![FileHit {
                path: "logs/app.log".into(),
                page: 3,
                snippet: "HTTP_500 occurred".into(),
                score: None,
                has_bm25: None,
            }]
        );
    }

    #[test]
    fn first_alias_wins_when_both_are_present() {
        let raw = json!({
            "mode": "files",
            "files": [{
                "path": "new.pdf", "source": "old.pdf",
                "top_page": 7, "page": 1,
                "preview": "fresh", "snippet": "stale",
                "rrf": 0.41, "has_bm25": true
            }]
        });
        let hit = &files(normalize(&raw).unwrap()).hits[0];
        assert_eq!(hit.path, "new.pdf");
        assert_eq!(hit.page, 7);
        assert_eq!(hit.snippet, "fresh");
        assert_eq!(hit.score, Some(0.41));
        assert_eq!(hit.has_bm25, Some(true));
    }

    #[test]
    fn lexical_flag_is_optional_and_strict() {
        let raw = json!({"mode": "files", "files": [
            {"path": "a", "has_bm25": false},
            {"path": "b", "has_bm25": "yes"},
            {"path": "c"}
        ]});
        let flags: Vec<_> = files(normalize(&raw).unwrap())
            .hits
            .into_iter()
            .map(|h| h.has_bm25)
            .collect();
        assert_eq!(flags, [Some(false), None, None]);
    }

    #[test]
    fn null_alias_falls_through_to_next_key() {
        let raw = json!({"mode": "answer", "citations": [{"path": null, "source": "b.txt"}]});
        assert_eq!(answer(normalize(&raw).unwrap()).citations[0].path, "b.txt");
    }

    #[test]
    fn file_hit_defaults() {
        let raw = json!({"mode": "files", "files": [{}]});
        let hit = &files(normalize(&raw).unwrap()).hits[0];
        assert_eq!(hit.path, "");
        assert_eq!(hit.page, 0);
        assert_eq!(hit.snippet, "");
    }

    #[test]
    fn file_order_and_count_are_preserved() {
        let raw = json!({"mode": "files", "files": [
            {"path": "c"}, {"path": "a"}, {"path": "b"}
        ]});
        let paths: Vec<_> = files(normalize(&raw).unwrap())
            .hits
            .into_iter()
            .map(|h| h.path)
            .collect();
        assert_eq!(paths, ["c", "a", "b"]);
    }

    #[test]
    fn missing_arrays_are_empty() {
        assert!(files(normalize(&json!({"mode": "files"})).unwrap()).hits.is_empty());
        let a = answer(normalize(&json!({"mode": "answer", "answer": "x"})).unwrap());
        assert!(a.citations.is_empty());
    }

    #[test]
    fn missing_answer_gets_placeholder() {
        let a = answer(normalize(&json!({"mode": "answer"})).unwrap());
        assert_eq!(a.text, NO_ANSWER_PLACEHOLDER);
    }

    #[test]
    fn mode_is_case_insensitive_and_unknown_modes_are_answers() {
        assert!(matches!(
            normalize(&json!({"mode": "FILES"})).unwrap(),
            ApiResult::FileList(_)
        ));
        assert!(matches!(
            normalize(&json!({"mode": "summary", "answer": "s"})).unwrap(),
            ApiResult::Answer(_)
        ));
    }

    #[test]
    fn missing_or_blank_mode_is_protocol_error() {
        for raw in [json!({}), json!({"mode": null}), json!({"mode": 3}), json!({"mode": " "})] {
            assert!(matches!(normalize(&raw), Err(SearchError::Protocol(_))), "{raw}");
        }
        assert!(matches!(normalize(&json!([1, 2])), Err(SearchError::Protocol(_))));
    }

    #[test]
    fn citation_without_path_is_protocol_error() {
        let raw = json!({"mode": "answer", "answer": "a", "citations": [{"page": 2}]});
        assert!(matches!(normalize(&raw), Err(SearchError::Protocol(_))));
    }

    #[test]
    fn malformed_arrays_are_protocol_errors() {
        assert!(normalize(&json!({"mode": "files", "files": {"path": "x"}})).is_err());
        assert!(normalize(&json!({"mode": "answer", "citations": ["x.pdf"]})).is_err());
    }

    #[test]
    fn loose_numeric_types_are_tolerated() {
        let raw = json!({"mode": "answer", "answer": "a", "citations": [
            {"path": "a.pdf", "page": "12", "chunk_id": 44},
            {"path": "b.pdf", "page": 3.9},
            {"path": "c.pdf", "page": "n/a"}
        ]});
        let a = answer(normalize(&raw).unwrap());
        assert_eq!(a.citations[0].page, 12);
        assert_eq!(a.citations[0].chunk_id.as_deref(), Some("44"));
        assert_eq!(a.citations[1].page, 3);
        assert_eq!(a.citations[2].page, 0);
    }

    #[test]
    fn via_and_trace_are_carried() {
        let raw = json!({
            "mode": "answer", "via": "agent", "answer": "done",
            "citations": [], "trace": ["Action: hybrid_retrieve", "Action: final_answer"]
        });
        let a = answer(normalize(&raw).unwrap());
        assert_eq!(a.via, Some(Via::Agent));
        assert_eq!(a.trace.unwrap().len(), 2);
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = json!({"mode": "files", "files": [{"path": "a", "top_page": 2}]});
        assert_eq!(normalize(&raw).unwrap(), normalize(&raw).unwrap());
    }

    #[test]
    fn invalid_json_bytes_are_protocol_error() {
        assert!(matches!(
            normalize_bytes(b"<html>oops</html>"),
            Err(SearchError::Protocol(_))
        ));
    }
}
