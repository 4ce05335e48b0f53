//! # クイックリプライ統合テスト
//!
//! ルーター全体（ハンドラ → ユースケース → レンダラー → モック送信）を
//! `tower::ServiceExt::oneshot` で検証する。

use std::sync::Arc;

use axum::{Router, body::Body};
use http::{Request, StatusCode, header};
use pretty_assertions::assert_eq;
use quickreply_domain::{
    choice::{Choice, ChoiceCatalog, ChoiceCopy},
    reply::ReplyError,
};
use quickreply_infra::mock::MockReplySender;
use quickreply_service::{
    app_builder::build_app,
    handler::ReadinessState,
    usecase::{QuickReplyService, ReplyRenderer},
};
use rstest::rstest;
use serde_json::{Value, json};
use tower::ServiceExt;

const BASE_URL: &str = "https://reply.example.com";

fn abcd_catalog() -> ChoiceCatalog {
    let choices = ["A", "B", "C", "D"]
        .into_iter()
        .map(|id| {
            Choice::new(
                id,
                format!("Option {id}"),
                ChoiceCopy::new(format!("Title {id}"), format!("Body {id}")),
            )
            .unwrap()
        })
        .collect();
    ChoiceCatalog::new(choices).unwrap()
}

fn all_ready() -> Arc<ReadinessState> {
    Arc::new(ReadinessState {
        checks: vec![
            ("api_key", true),
            ("sender_account", true),
            ("public_base_url", true),
        ],
    })
}

fn app_with(catalog: ChoiceCatalog, sender: &MockReplySender) -> Router {
    let service = QuickReplyService::new(
        Arc::new(catalog),
        ReplyRenderer::new().unwrap(),
        Arc::new(sender.clone()),
        BASE_URL,
    );
    build_app(Arc::new(service), all_ready())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

// --- GET /r ---

#[tokio::test]
async fn test_ボタンクリックで残りの選択肢付き返信を送り確認ページを返す() {
    let sender = MockReplySender::new();
    let app = app_with(abcd_catalog(), &sender);

    let response = app
        .oneshot(get("/r?thread_id=thread-1&subject=Re%3A%20Loan&choice=B"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/html"));
    let page = body_string(response).await;
    assert!(page.contains("Thank you for your response!"));
    assert!(page.contains("Option B"));

    let sent = sender.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].thread_id.as_str(), "thread-1");
    assert_eq!(sent[0].subject.as_reply(), "Re: Loan");
    for id in ["A", "C", "D"] {
        // href 属性値としてエスケープされる
        let link = format!(
            "https:&#x2F;&#x2F;reply.example.com&#x2F;r?thread_id=thread-1&amp;subject=Loan&amp;choice={id}"
        );
        assert!(sent[0].html_body.contains(&link), "{id} のリンクがあること");
    }
    assert!(!sent[0].html_body.contains("choice=B"));
}

#[tokio::test]
async fn test_旧形式のパラメータとエイリアスを受け付ける() {
    let sender = MockReplySender::new();
    let app = app_with(ChoiceCatalog::loan_collections(), &sender);

    let response = app
        .oneshot(get("/r?uuid=legacy-1&subject=Loan&chosen=settle"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let sent = sender.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].thread_id.as_str(), "legacy-1");
    // リンクは正規の ID を使う
    assert!(sent[0].html_body.contains("choice=close_loan"));
    assert!(sent[0].html_body.contains("choice=never_pay"));
    assert!(sent[0].html_body.contains("choice=need_more_time"));
    assert!(!sent[0].html_body.contains("choice=settle_loan"));
}

#[tokio::test]
async fn test_選択肢が1つのカタログでは完了メッセージを送る() {
    let sender = MockReplySender::new();
    let only = Choice::new("only", "Only option", ChoiceCopy::new("Done", "Thanks")).unwrap();
    let app = app_with(ChoiceCatalog::new(vec![only]).unwrap(), &sender);

    let response = app
        .oneshot(get("/r?thread_id=t&subject=Loan&choice=only"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(page.contains("Your selection has been recorded."));
    let sent = sender.sent_messages();
    assert!(!sent[0].html_body.contains("<a "));
}

#[tokio::test]
async fn test_不明な選択肢は400を返し送信しない() {
    let sender = MockReplySender::new();
    let app = app_with(abcd_catalog(), &sender);

    let response = app
        .oneshot(get("/r?thread_id=t&subject=Loan&choice=Z"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Unknown Choice");
    assert_eq!(body["status"], 400);
    assert!(body["type"].as_str().unwrap().ends_with("/unknown-choice"));
    assert!(sender.sent_messages().is_empty());
}

#[rstest]
#[case::thread_idなし("/r?subject=Loan&choice=A")]
#[case::件名なし("/r?thread_id=t&choice=A")]
#[case::選択肢なし("/r?thread_id=t&subject=Loan")]
#[case::件名がreのみ("/r?thread_id=t&subject=Re%3A%20Re%3A&choice=A")]
#[tokio::test]
async fn test_必須項目の欠落は400を返し送信しない(#[case] uri: &str) {
    let sender = MockReplySender::new();
    let app = app_with(abcd_catalog(), &sender);

    let response = app.oneshot(get(uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Validation Error");
    assert!(sender.sent_messages().is_empty());
}

#[tokio::test]
async fn test_設定不備の場合は503を返す() {
    let service = QuickReplyService::unconfigured(
        Arc::new(abcd_catalog()),
        ReplyRenderer::new().unwrap(),
        vec!["api_key"],
    );
    let app = build_app(Arc::new(service), all_ready());

    let response = app
        .oneshot(get("/r?thread_id=t&subject=Loan&choice=A"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "返信機能が設定されていません");
}

#[rstest]
#[case(ReplyError::Timeout("deadline".into()), StatusCode::GATEWAY_TIMEOUT)]
#[case(ReplyError::RateLimited("slow down".into()), StatusCode::SERVICE_UNAVAILABLE)]
#[case(ReplyError::Authentication("bad key".into()), StatusCode::BAD_GATEWAY)]
#[case(ReplyError::Rejected("bounced".into()), StatusCode::BAD_GATEWAY)]
#[tokio::test]
async fn test_送信失敗はエラー種別に応じたステータスになる(
    #[case] error: ReplyError,
    #[case] expected: StatusCode,
) {
    let sender = MockReplySender::failing(error);
    let app = app_with(abcd_catalog(), &sender);

    let response = app
        .oneshot(get("/r?thread_id=t&subject=Loan&choice=A"))
        .await
        .unwrap();

    assert_eq!(response.status(), expected);
    assert_eq!(sender.sent_messages().len(), 1);
}

// --- POST /webhook/reply ---

#[tokio::test]
async fn test_webhookでbを選ぶと残りacdを返す() {
    let sender = MockReplySender::new();
    let app = app_with(abcd_catalog(), &sender);

    let response = app
        .oneshot(post_json(
            "/webhook/reply",
            &json!({ "thread_id": "thread-9", "subject": "Re: Loan", "choice": "B" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({
            "data": {
                "status": "sent",
                "chosen": "B",
                "remaining": ["A", "C", "D"],
                "subject": "Re: Loan",
                "provider_message_id": "mock-thread-9"
            }
        })
    );
}

#[tokio::test]
async fn test_webhookでdを選ぶと残りabcになり件名のreは1つにまとまる() {
    let sender = MockReplySender::new();
    let app = app_with(abcd_catalog(), &sender);

    let response = app
        .oneshot(post_json(
            "/webhook/reply",
            &json!({ "reply_to_uuid": "thread-9", "subject": "Re: Re: Re: Loan", "chosen": "D" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["remaining"], json!(["A", "B", "C"]));
    assert_eq!(body["data"]["subject"], "Re: Loan");
    assert_eq!(sender.sent_messages()[0].thread_id.as_str(), "thread-9");
}

#[rstest]
#[case::email_id(json!({ "email_id": "e-1", "subject": "Loan", "choice": "A" }))]
#[case::uuid(json!({ "uuid": "e-1", "subject": "Loan", "choice": "A" }))]
#[tokio::test]
async fn test_webhookはスレッドidの別名を受け付ける(#[case] body: Value) {
    let sender = MockReplySender::new();
    let app = app_with(abcd_catalog(), &sender);

    let response = app.oneshot(post_json("/webhook/reply", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(sender.sent_messages()[0].thread_id.as_str(), "e-1");
}

#[tokio::test]
async fn test_webhookで最後の選択肢はcompletedを返す() {
    let sender = MockReplySender::new();
    let only = Choice::new("only", "Only", ChoiceCopy::new("Done", "Thanks")).unwrap();
    let app = app_with(ChoiceCatalog::new(vec![only]).unwrap(), &sender);

    let response = app
        .oneshot(post_json(
            "/webhook/reply",
            &json!({ "thread_id": "t", "subject": "Loan", "choice": "only" }),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["remaining"], json!([]));
}

#[tokio::test]
async fn test_webhookの不正なjsonは400を返す() {
    let sender = MockReplySender::new();
    let app = app_with(abcd_catalog(), &sender);

    let request = Request::builder()
        .method("POST")
        .uri("/webhook/reply")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Validation Error");
    assert!(sender.sent_messages().is_empty());
}

#[tokio::test]
async fn test_webhookの不明な選択肢は400を返す() {
    let sender = MockReplySender::new();
    let app = app_with(abcd_catalog(), &sender);

    let response = app
        .oneshot(post_json(
            "/webhook/reply",
            &json!({ "thread_id": "t", "subject": "Loan", "choice": "E" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(sender.sent_messages().is_empty());
}

// --- ヘルスチェック ---

#[tokio::test]
async fn test_healthは常にhealthyを返す() {
    let app = app_with(abcd_catalog(), &MockReplySender::new());

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_全設定が揃っていればreadyを返す() {
    let app = app_with(abcd_catalog(), &MockReplySender::new());

    let response = app.oneshot(get("/health/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_未設定の項目があればnot_readyと503を返す() {
    let service = QuickReplyService::unconfigured(
        Arc::new(abcd_catalog()),
        ReplyRenderer::new().unwrap(),
        vec!["sender_account"],
    );
    let readiness = Arc::new(ReadinessState {
        checks: vec![
            ("api_key", true),
            ("sender_account", false),
            ("public_base_url", true),
        ],
    });
    let app = build_app(Arc::new(service), readiness);

    let response = app.oneshot(get("/health/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({
            "status": "not_ready",
            "checks": {
                "api_key": "ok",
                "public_base_url": "ok",
                "sender_account": "error"
            }
        })
    );
}
