//! # 返信 Webhook ハンドラ
//!
//! ## エンドポイント
//!
//! ```text
//! POST /webhook/reply
//! ```
//!
//! ## リクエスト例
//!
//! ```json
//! { "thread_id": "0190...", "subject": "Re: Loan", "choice": "settle_loan" }
//! ```
//!
//! `thread_id` は `reply_to_uuid` / `email_id` / `uuid`、`choice` は `chosen` でも受け付ける。
//!
//! ## レスポンス例
//!
//! ```json
//! {
//!   "data": {
//!     "status": "sent",
//!     "chosen": "settle_loan",
//!     "remaining": ["close_loan", "never_pay", "need_more_time"],
//!     "subject": "Re: Loan",
//!     "provider_message_id": "..."
//!   }
//! }
//! ```

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use quickreply_domain::{DomainError, reply::QuickReplyRequest};
use quickreply_shared::ApiResponse;
use serde::{Deserialize, Serialize};

use super::ReplyState;
use crate::{error::ServiceError, usecase::QuickReplyOutcome};

/// Webhook のリクエストボディ
#[derive(Debug, Deserialize)]
pub struct ReplyWebhookRequest {
    #[serde(alias = "reply_to_uuid", alias = "email_id", alias = "uuid")]
    pub thread_id: Option<String>,
    pub subject:   Option<String>,
    #[serde(alias = "chosen")]
    pub choice:    Option<String>,
}

/// Webhook のレスポンスデータ
#[derive(Debug, Serialize)]
pub struct ReplyWebhookData {
    /// `"sent"`（残りの選択肢あり）または `"completed"`
    pub status:              &'static str,
    pub chosen:              String,
    pub remaining:           Vec<String>,
    /// 送信した返信の件名
    pub subject:             String,
    pub provider_message_id: Option<String>,
}

impl From<QuickReplyOutcome> for ReplyWebhookData {
    fn from(outcome: QuickReplyOutcome) -> Self {
        let status = if outcome.is_completed() {
            "completed"
        } else {
            "sent"
        };
        Self {
            status,
            chosen: outcome.chosen.id().to_string(),
            remaining: outcome.remaining.iter().map(ToString::to_string).collect(),
            subject: outcome.subject.as_reply(),
            provider_message_id: outcome.receipt.provider_message_id,
        }
    }
}

/// POST /webhook/reply
#[tracing::instrument(skip_all)]
pub async fn reply_webhook(
    State(state): State<Arc<ReplyState>>,
    body: Result<Json<ReplyWebhookRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ReplyWebhookData>>, ServiceError> {
    let Json(body) = body.map_err(|e| DomainError::Validation(e.body_text()))?;
    let request = QuickReplyRequest::new(body.thread_id, body.subject, body.choice)?;

    let outcome = state.service.reply(&request).await?;

    Ok(Json(ApiResponse::new(outcome.into())))
}
