//! # 返信送信
//!
//! レンダリング済みの返信メッセージを外部メール API に渡す。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `ReplySender` trait で送信手段を抽象化
//! - **2 つの実装**: Instantly（本番用）、Noop（ローカル実行用）
//! - **環境変数切替**: `REPLY_BACKEND` でランタイム選択
//! - **リトライなし**: 失敗はそのまま呼び出し元に返す

mod instantly;
mod noop;

use async_trait::async_trait;
pub use instantly::{InstantlyReplySender, REPLY_ENDPOINT, classify_response};
pub use noop::NoopReplySender;
use quickreply_domain::reply::{ReplyError, ReplyMessage, ReplyReceipt};

/// 返信送信トレイト
///
/// 1 回の呼び出しで外部 API への送信は高々 1 回。
#[async_trait]
pub trait ReplySender: Send + Sync {
    /// 既存スレッドへの返信として送信する
    async fn send_reply(&self, message: &ReplyMessage) -> Result<ReplyReceipt, ReplyError>;
}
