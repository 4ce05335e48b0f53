//! # ヘルスチェックハンドラ
//!
//! - `/health`: Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready`: Readiness Check（返信送信に必要な設定が揃っているか）
//!
//! レスポンス型は [`quickreply_shared::HealthResponse`] / [`quickreply_shared::ReadinessResponse`] を参照。

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use quickreply_shared::{CheckStatus, HealthResponse, ReadinessResponse};

/// Reply Service のヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}

/// Readiness Check 用の State
///
/// 設定は起動後に変わらないため、起動時の判定結果を保持する。
pub struct ReadinessState {
    pub checks: Vec<(&'static str, bool)>,
}

/// Reply Service の Readiness Check エンドポイント
///
/// 全チェック OK → 200、1 つでも失敗 → 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let response = ReadinessResponse::from_checks(
        state
            .checks
            .iter()
            .map(|(name, ok)| (*name, CheckStatus::from(*ok))),
    );

    let http_status = if response.is_ready() {
        StatusCode::OK
    } else {
        tracing::warn!(checks = ?response.checks, "readiness check: 未設定の項目があります");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (http_status, Json(response))
}
