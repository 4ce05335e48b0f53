//! # QuickReply ドメイン層
//!
//! メールスレッド内のクイックリプライ（選択肢ボタン）のやり取りを表現する
//! ドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **純粋性**: このクレートは I/O を一切行わない。HTTP 送信やテンプレート
//!   レンダリングはインフラ層・サービス層の責務
//! - **ステートレス**: 残りの選択肢は毎リクエスト、カタログ全体から再計算する。
//!   スレッドごとのクリック履歴は保持しない
//! - **不変のカタログ**: 選択肢カタログは起動時に構築され、以後変更されない。
//!   グローバル変数ではなく、値として各コンポーネントに注入する
//!
//! ## 依存関係の方向
//!
//! ```text
//! service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`choice`] - 選択肢カタログと残り選択肢の解決
//! - [`subject`] - 返信件名の正規化
//! - [`reply`] - スレッド ID、返信メッセージ、送信エラー
//! - [`error`] - ドメインエラー
//!
//! ## 使用例
//!
//! ```rust
//! use quickreply_domain::choice::ChoiceCatalog;
//!
//! let catalog = ChoiceCatalog::loan_collections();
//! let resolution = catalog.resolve("settle_loan").unwrap();
//!
//! assert_eq!(resolution.chosen().id().as_str(), "settle_loan");
//! assert_eq!(resolution.remaining().len(), 3);
//! ```

#[macro_use]
mod macros;

pub mod choice;
pub mod error;
pub mod reply;
pub mod subject;

pub use error::DomainError;
