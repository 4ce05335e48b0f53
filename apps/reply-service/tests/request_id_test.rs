//! # Request ID レイヤーのテスト
//!
//! `build_app` のレイヤー構成で X-Request-Id が付与・伝播されることを検証する。

use std::sync::Arc;

use axum::{Router, body::Body};
use http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use quickreply_domain::choice::ChoiceCatalog;
use quickreply_infra::mock::MockReplySender;
use quickreply_service::{
    app_builder::build_app,
    handler::ReadinessState,
    usecase::{QuickReplyService, ReplyRenderer},
};
use tower::ServiceExt;

fn test_app() -> Router {
    let service = QuickReplyService::new(
        Arc::new(ChoiceCatalog::loan_collections()),
        ReplyRenderer::new().unwrap(),
        Arc::new(MockReplySender::new()),
        "https://reply.example.com",
    );
    build_app(
        Arc::new(service),
        Arc::new(ReadinessState { checks: Vec::new() }),
    )
}

fn request(uri: &str) -> http::request::Builder {
    Request::builder().uri(uri)
}

#[tokio::test]
async fn test_レスポンスにx_request_idヘッダーが含まれる() {
    let response = test_app()
        .oneshot(request("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers().contains_key("x-request-id"),
        "レスポンスに x-request-id ヘッダーが含まれること"
    );
}

#[tokio::test]
async fn test_クライアント提供のx_request_idがそのまま返される() {
    let custom_id = "client-provided-request-id-123";

    let response = test_app()
        .oneshot(
            request("/r?thread_id=t&subject=Loan&choice=close")
                .header("x-request-id", custom_id)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .unwrap()
            .to_str()
            .unwrap(),
        custom_id
    );
}

#[tokio::test]
async fn test_エラーレスポンスにもx_request_idが付与される() {
    let response = test_app()
        .oneshot(request("/r?thread_id=t").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_自動生成のx_request_idがuuid_v7形式である() {
    let response = test_app()
        .oneshot(request("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let request_id = response
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap();

    let uuid = uuid::Uuid::parse_str(request_id)
        .unwrap_or_else(|_| panic!("有効な UUID であること: {request_id}"));
    assert_eq!(uuid.get_version(), Some(uuid::Version::SortRand));
}
