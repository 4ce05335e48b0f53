//! # QuickReply 共有ユーティリティ
//!
//! サービス全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - domain / infra / service のいずれからも依存できる
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - tracing / tower 系の依存は `observability` feature の内側に閉じる

pub mod api_response;
pub mod error_response;
pub mod event_log;
pub mod health;
pub mod observability;

#[cfg(feature = "observability")]
pub mod canonical_log;

pub use api_response::ApiResponse;
pub use error_response::ErrorResponse;
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
