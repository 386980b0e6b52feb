// Integration tests for the web demo server

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use qaops::predictor::{Predictor, QaAnswer, QaRequest};
use qaops::server::{create_router, DemoConfig, DemoServer};
use tower::ServiceExt;

/// Predictor double replaying a fixed endpoint response body.
struct StubPredictor {
    body: &'static [u8],
}

#[async_trait]
impl Predictor for StubPredictor {
    async fn predict(&self, _request: &QaRequest) -> Result<QaAnswer> {
        Ok(QaAnswer::parse(self.body)?)
    }

    fn endpoint_name(&self) -> &str {
        "bert-qa-dem-test"
    }
}

fn demo_server(body: &'static [u8]) -> Arc<DemoServer> {
    Arc::new(DemoServer::new(
        Arc::new(StubPredictor { body }),
        DemoConfig {
            bind_address: "127.0.0.1:0".to_string(),
        },
    ))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_index_page_renders_the_form() {
    let app = create_router(demo_server(b"{}"));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(page.contains("Context Paragraph"));
    assert!(page.contains("Question"));
    assert!(page.contains("Shubham"));
}

#[tokio::test]
async fn test_predict_renders_answer_and_confidence() {
    let app = create_router(demo_server(br#"{"answer": "HuggingFace", "score": 0.87}"#));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "context=My+name+is+Shubham&question=Which+company%3F",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(page.contains("HuggingFace"));
    assert!(page.contains("0.87"));
}

#[tokio::test]
async fn test_malformed_endpoint_response_propagates_as_error() {
    let app = create_router(demo_server(b"<html>bad gateway</html>"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("context=c&question=q"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let page = body_string(response).await;
    assert!(page.contains("malformed"));
}

#[test]
fn test_server_default_config() {
    let config = DemoConfig::default();
    assert_eq!(config.bind_address, "0.0.0.0:80");
}
