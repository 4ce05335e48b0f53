//! # Reply Service エラー定義
//!
//! Reply Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! | エラー | HTTP ステータス |
//! |-------|----------------|
//! | 入力不正・不明な選択肢 | 400 |
//! | 返信に必要な設定が未設定 | 503 |
//! | メール API のタイムアウト | 504 |
//! | メール API のレート制限 | 503 |
//! | その他のメール API 失敗 | 502 |
//! | テンプレート・カタログ不正 | 500 |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use quickreply_domain::{
    DomainError,
    reply::{ReplyError, ReplyErrorKind},
};
use quickreply_shared::ErrorResponse;
use thiserror::Error;

/// Reply Service で発生するエラー
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 入力値・選択肢の検証エラー
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// 返信に必要な設定が未設定
    #[error("返信に必要な設定がありません: {}", .0.join(", "))]
    NotConfigured(Vec<&'static str>),

    /// レンダリング・送信の失敗
    #[error(transparent)]
    Reply(#[from] ReplyError),
}

impl ServiceError {
    /// レスポンスボディ（内部情報は含めない）
    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            Self::Domain(DomainError::Validation(msg)) => ErrorResponse::validation_error(msg),
            Self::Domain(e @ DomainError::UnknownChoice(_)) => {
                ErrorResponse::unknown_choice(e.to_string())
            }
            Self::Domain(DomainError::InvalidCatalog(_)) => ErrorResponse::internal_error(),
            Self::NotConfigured(_) => {
                ErrorResponse::service_unavailable("返信機能が設定されていません")
            }
            Self::Reply(e) => match e.kind() {
                ReplyErrorKind::Timeout => {
                    ErrorResponse::gateway_timeout("メール API が時間内に応答しませんでした")
                }
                ReplyErrorKind::RateLimited => ErrorResponse::service_unavailable(
                    "メール API のレート制限に達しました。しばらくしてから再度お試しください",
                ),
                ReplyErrorKind::Template => ErrorResponse::internal_error(),
                _ => ErrorResponse::bad_gateway("返信メールを送信できませんでした"),
            },
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = self.to_error_response();
        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::debug!(error = %self, status = body.status, "エラーレスポンスを返却");
        }

        (status, Json(body)).into_response()
    }
}
