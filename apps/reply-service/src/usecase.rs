//! # ユースケース層
//!
//! Reply Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: 送信クライアントを `Arc<dyn ReplySender>` で外部から注入
//! - **薄いハンドラ**: ハンドラは入力の取り出しとレスポンス整形のみを行う
//!
//! ## モジュール構成
//!
//! - `quick_reply`: 選択肢の解決から返信送信までの流れ
//! - `reply_renderer`: 返信メール・確認ページの HTML 生成

pub mod quick_reply;
pub mod reply_renderer;

pub use quick_reply::{QuickReplyOutcome, QuickReplyService};
pub use reply_renderer::{ReplyLinks, ReplyRenderer};
