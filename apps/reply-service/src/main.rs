//! # Reply Service サーバー
//!
//! メール内のクイックリプライボタンと返信 Webhook を受け、
//! 残りの選択肢をボタンにした返信を同じスレッドに送る。
//!
//! ```text
//! ┌──────────────┐  GET /r        ┌───────────────┐  POST /api/v2/emails/reply  ┌──────────────┐
//! │  受信者の     │───────────────▶│ Reply Service │────────────────────────────▶│  Instantly   │
//! │  メール       │  POST /webhook │               │                             │              │
//! └──────────────┘                └───────────────┘                             └──────────────┘
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `REPLY_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `REPLY_PORT` | No | ポート番号（デフォルト: `8000`） |
//! | `PUBLIC_BASE_URL` | **Yes** | ボタンのリンク先に使う公開 URL |
//! | `REPLY_BACKEND` | No | `instantly`（デフォルト）または `noop` |
//! | `REPLY_API_BASE_URL` | No | 返信 API のベース URL |
//! | `INSTANTLY_API_KEY` | **Yes** | 返信 API の Bearer トークン |
//! | `INSTANTLY_EACCOUNT` | **Yes** | 送信元アカウント |
//! | `REPLY_API_TIMEOUT_SECS` | No | 返信 API のタイムアウト秒数（デフォルト: `30`） |
//! | `CHOICE_CATALOG_PATH` | No | 選択肢カタログ JSON のパス |
//!
//! 必須項目が未設定でも起動はする。`/health/ready` が 503 を返し、返信要求は 503 で拒否される。
//!
//! ## 起動方法
//!
//! ```bash
//! REPLY_BACKEND=noop PUBLIC_BASE_URL=http://localhost:8000 cargo run -p quickreply-service
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use quickreply_service::{
    app_builder::{build_app, build_service},
    config::ServiceConfig,
    handler::ReadinessState,
};
use quickreply_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// Reply Service のエントリーポイント
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. 設定と選択肢カタログの読み込み
/// 4. ルーターの構築
/// 5. HTTP サーバーの起動
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 本番環境では .env ファイルは使用せず、環境変数を直接設定する
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("reply-service");
    init_tracing(&tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "reply-service").entered();

    let config = ServiceConfig::from_env().context("設定の読み込みに失敗しました")?;
    tracing::debug!(?config, "設定を読み込みました");

    let catalog = config
        .load_catalog()
        .context("選択肢カタログの読み込みに失敗しました")?;
    tracing::info!(choices = catalog.choices().len(), "選択肢カタログを読み込みました");

    let service =
        build_service(&config, catalog).context("返信サービスの初期化に失敗しました")?;
    let readiness_state = Arc::new(ReadinessState {
        checks: config.setting_checks(),
    });
    let app = build_app(Arc::new(service), readiness_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("バインドアドレスが不正です")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("{addr} にバインドできません"))?;
    tracing::info!("Reply Service サーバーを起動します: {}", addr);

    axum::serve(listener, app)
        .await
        .context("サーバーエラー")?;

    Ok(())
}
