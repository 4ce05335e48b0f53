//! # QuickReply インフラ層
//!
//! 外部メール API との通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! ドメイン層で定義された返信メッセージ・送信エラーを使い、
//! 実際の送信手段（Instantly の返信 API、ログ出力のみの Noop）を提供する。
//! 送信手段は [`ReplySender`] trait で抽象化し、サービス層は trait object として保持する。
//!
//! ## 依存関係
//!
//! ```text
//! service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`reply_sender`] - 返信送信 trait と各実装
//! - `mock` - テスト用モック（`test-utils` feature）

pub mod reply_sender;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use reply_sender::{InstantlyReplySender, NoopReplySender, ReplySender};
