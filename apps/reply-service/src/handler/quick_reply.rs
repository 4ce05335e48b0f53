//! # ボタンクリックハンドラ
//!
//! 返信メール内のボタンは `GET /r?thread_id=..&subject=..&choice=..` を指す。
//! 受信者のブラウザには確認ページ（HTML）を返す。
//!
//! 旧形式のリンク（`uuid` / `chosen` パラメータ）もそのまま受け付ける。

use std::sync::Arc;

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::Html,
};
use quickreply_domain::{DomainError, reply::QuickReplyRequest};
use serde::Deserialize;

use super::ReplyState;
use crate::error::ServiceError;

/// クエリパラメータ
#[derive(Debug, Deserialize)]
pub struct QuickReplyQuery {
    #[serde(alias = "uuid")]
    pub thread_id: Option<String>,
    pub subject:   Option<String>,
    #[serde(alias = "chosen")]
    pub choice:    Option<String>,
}

/// GET /r
///
/// 選択肢を解決して返信メールを送り、確認ページを返す。
#[tracing::instrument(skip_all)]
pub async fn quick_reply(
    State(state): State<Arc<ReplyState>>,
    query: Result<Query<QuickReplyQuery>, QueryRejection>,
) -> Result<Html<String>, ServiceError> {
    let Query(query) = query.map_err(|e| DomainError::Validation(e.body_text()))?;
    let request = QuickReplyRequest::new(query.thread_id, query.subject, query.choice)?;

    let outcome = state.service.reply(&request).await?;

    let page = state
        .service
        .renderer()
        .render_acknowledgement(&outcome.chosen, outcome.is_completed())?;

    Ok(Html(page))
}
