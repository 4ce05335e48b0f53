//! # Reply Service アプリケーション構築
//!
//! DI（送信クライアント・State）の初期化とルーター構築を担当する。
//! `main.rs` は設定読み込みとサーバー起動に集中する。

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use quickreply_domain::{choice::ChoiceCatalog, reply::ReplyError};
use quickreply_infra::{InstantlyReplySender, NoopReplySender, ReplySender};
use quickreply_shared::{
    canonical_log::CanonicalLogLineLayer,
    observability::{MakeRequestUuidV7, make_request_span},
};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    config::{ReplyBackend, ServiceConfig},
    handler::{
        ReadinessState,
        ReplyState,
        health_check,
        quick_reply,
        readiness_check,
        reply_webhook,
    },
    usecase::{QuickReplyService, ReplyRenderer},
};

/// 設定から送信クライアントを選び、ユースケースを組み立てる
///
/// 必要な設定が欠けている場合も起動は続け、返信要求を 503 で拒否するサービスを返す。
pub fn build_service(
    config: &ServiceConfig,
    catalog: ChoiceCatalog,
) -> Result<QuickReplyService, ReplyError> {
    let catalog = Arc::new(catalog);
    let renderer = ReplyRenderer::new()?;

    let api = &config.reply_api;
    let sender: Arc<dyn ReplySender> = match (api.backend, &api.api_key, &api.sender_account) {
        (ReplyBackend::Noop, _, _) => {
            tracing::warn!("REPLY_BACKEND=noop: 返信は送信されません");
            Arc::new(NoopReplySender)
        }
        (ReplyBackend::Instantly, Some(api_key), Some(sender_account)) => {
            Arc::new(InstantlyReplySender::new(
                &api.base_url,
                api_key.clone(),
                sender_account.clone(),
                api.timeout,
            )?)
        }
        (ReplyBackend::Instantly, _, _) => {
            return Ok(unconfigured(catalog, renderer, config.missing_settings()));
        }
    };

    match &config.public_base_url {
        Some(public_base_url) => Ok(QuickReplyService::new(
            catalog,
            renderer,
            sender,
            public_base_url.clone(),
        )),
        None => Ok(unconfigured(catalog, renderer, config.missing_settings())),
    }
}

fn unconfigured(
    catalog: Arc<ChoiceCatalog>,
    renderer: ReplyRenderer,
    missing: Vec<&'static str>,
) -> QuickReplyService {
    tracing::warn!(missing = ?missing, "返信に必要な設定が不足しています。返信要求は 503 を返します");
    QuickReplyService::unconfigured(catalog, renderer, missing)
}

/// ルーター定義を行う
pub fn build_app(service: Arc<QuickReplyService>, readiness_state: Arc<ReadinessState>) -> Router {
    let reply_state = Arc::new(ReplyState { service });

    Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .merge(
            Router::new()
                .route("/r", get(quick_reply))
                .route("/webhook/reply", post(reply_webhook))
                .with_state(reply_state),
        )
        // レイヤー順序: 下に書いたものが外側
        // 1. SetRequestIdLayer（最外）: UUID v7 を生成（またはクライアント提供値を使用）
        // 2. TraceLayer: スパンに request_id を含め、全ログに自動注入
        // 3. CanonicalLogLineLayer: リクエスト完了時に1行サマリログを出力（スパン内）
        // 4. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CanonicalLogLineLayer)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
