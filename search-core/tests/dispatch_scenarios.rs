use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use search_core::services::dispatcher::Dispatcher;
use search_core::{
    AnswerResult, ApiResult, Citation, FileHit, FileListResult, QueryRequest, SearchError,
};

fn dispatcher() -> Dispatcher {
    Dispatcher::new(Some(5)).expect("dispatcher")
}

#[tokio::test]
async fn router_file_lookup_with_legacy_keys() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/route"))
        .and(body_json(json!({
            "q": "Which file mentions HTTP_500 errors?",
            "k": 6, "ck": 8, "bk": 20
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "mode": "files",
            "files": [{"source": "logs/app.log", "page": 3, "snippet": "HTTP_500 occurred"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let req = QueryRequest::router("Which file mentions HTTP_500 errors?")
        .unwrap()
        .with_top_k(6);
    let result = dispatcher().dispatch(&req, &server.uri()).await.unwrap();

    assert_eq!(
        result,
        ApiResult::FileList(FileListResult {
            hits: vec![FileHit {
                path: "logs/app.log".into(),
                page: 3,
                snippet: "HTTP_500 occurred".into(),
                score: None,
                has_bm25: None,
            }],
            via: None,
        })
    );
}

#[tokio::test]
async fn agent_answer_with_citation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agent"))
        .and(body_json(json!({"question": "When did Rome fall?", "k": 6, "steps": 4})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "mode": "answer",
            "answer": "Rome fell in 455.",
            "citations": [{"path": "history.pdf", "page": 12}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let req = QueryRequest::agent("When did Rome fall?").unwrap();
    let base = format!("{}/", server.uri());
    let result = dispatcher().dispatch(&req, &base).await.unwrap();

    assert_eq!(
        result,
        ApiResult::Answer(AnswerResult {
            text: "Rome fell in 455.".into(),
            citations: vec![Citation {
                path: "history.pdf".into(),
                page: 12,
                chunk_id: None,
            }],
            via: None,
            trace: None,
        })
    );
}

#[tokio::test]
async fn files_mode_without_files_key_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/route"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"mode": "files"})))
        .mount(&server)
        .await;

    let req = QueryRequest::router("anything").unwrap();
    let result = dispatcher().dispatch(&req, &server.uri()).await.unwrap();
    assert_eq!(result, ApiResult::FileList(FileListResult::default()));
}

#[tokio::test]
async fn non_success_status_is_http_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/route"))
        .respond_with(
            ResponseTemplate::new(422).set_body_string("Missing question (use 'q' or 'question')."),
        )
        .mount(&server)
        .await;

    let req = QueryRequest::router("x").unwrap();
    let err = dispatcher().dispatch(&req, &server.uri()).await.unwrap_err();
    match err {
        SearchError::HttpStatus { status, snippet, .. } => {
            assert_eq!(status.as_u16(), 422);
            assert!(snippet.contains("Missing question"));
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn html_body_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let req = QueryRequest::agent("x").unwrap();
    let err = dispatcher().dispatch(&req, &server.uri()).await.unwrap_err();
    assert!(matches!(err, SearchError::Protocol(_)));
    assert_eq!(err.user_message(), "no results");
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    // Grab a free port, then close the listener so nothing answers there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let req = QueryRequest::router("x").unwrap();
    let err = dispatcher()
        .dispatch(&req, &format!("http://{addr}"))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Transport(_)));
    assert_eq!(err.user_message(), "request failed");
}

#[tokio::test]
async fn empty_api_base_fails_before_network() {
    let req = QueryRequest::router("x").unwrap();
    let err = dispatcher().dispatch(&req, "").await.unwrap_err();
    assert!(err.is_validation());
}
