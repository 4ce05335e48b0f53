//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! - 各ハンドラはサブモジュールに配置し、親モジュールで re-export する
//! - ハンドラは薄く保ち、ビジネスロジックは [`crate::usecase`] に委譲
//!
//! ## ハンドラ一覧
//!
//! - `health`: ヘルスチェック
//! - `quick_reply`: メール内ボタンのクリック（`GET /r`）
//! - `webhook`: 返信 Webhook（`POST /webhook/reply`）

pub mod health;
pub mod quick_reply;
pub mod webhook;

use std::sync::Arc;

pub use health::{ReadinessState, health_check, readiness_check};
pub use quick_reply::quick_reply;
pub use webhook::reply_webhook;

use crate::usecase::QuickReplyService;

/// 返信ハンドラ共通の State
pub struct ReplyState {
    pub service: Arc<QuickReplyService>,
}
