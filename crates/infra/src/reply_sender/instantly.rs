//! Instantly 返信送信実装
//!
//! Instantly の返信 API（`POST /api/v2/emails/reply`）を呼び出し、
//! 既存のメールスレッドに返信する。
//!
//! 2xx でも本文にエラーが示されることがあるため、ステータスだけでなく
//! レスポンス本文も検査する（[`classify_response`]）。

use std::{fmt, time::Duration};

use async_trait::async_trait;
use quickreply_domain::reply::{ReplyError, ReplyMessage, ReplyReceipt};
use serde::Serialize;
use serde_json::{Map, Value};

use super::ReplySender;

/// 返信 API のパス
pub const REPLY_ENDPOINT: &str = "/api/v2/emails/reply";

/// エラーメッセージに含めるレスポンス本文の最大文字数
const BODY_EXCERPT_CHARS: usize = 500;

/// 2xx でも失敗とみなすフィールド（値が空でなければ失敗）
const ERROR_FIELDS: [&str; 5] = ["error", "message", "errors", "error_message", "error_detail"];
const FAILED_STATUSES: [&str; 4] = ["error", "failed", "rejected", "bounced"];
const FAILED_STATES: [&str; 3] = ["error", "failed", "rejected"];
/// 採番された返信メール ID のフィールド（先に見つかったものを使う）
const MESSAGE_ID_FIELDS: [&str; 5] = ["id", "email_id", "uuid", "email_uuid", "message_id"];

#[derive(Debug, Serialize)]
struct ReplyRequest<'a> {
    eaccount:      &'a str,
    reply_to_uuid: &'a str,
    subject:       String,
    body:          ReplyBody<'a>,
}

#[derive(Debug, Serialize)]
struct ReplyBody<'a> {
    html: &'a str,
}

/// Instantly 返信送信
pub struct InstantlyReplySender {
    base_url:       String,
    api_key:        String,
    sender_account: String,
    client:         reqwest::Client,
}

impl InstantlyReplySender {
    /// 新しい InstantlyReplySender を作成する
    ///
    /// # 引数
    ///
    /// - `base_url`: API のベース URL（例: `https://api.instantly.ai`）
    /// - `api_key`: Bearer トークン
    /// - `sender_account`: 送信元アカウント（`eaccount`）
    /// - `timeout`: 1 回の呼び出しのタイムアウト
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        sender_account: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ReplyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReplyError::Network(format!("HTTP クライアントの初期化に失敗: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            sender_account: sender_account.into(),
            client,
        })
    }
}

// API キーをログに出さない
impl fmt::Debug for InstantlyReplySender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstantlyReplySender")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("sender_account", &self.sender_account)
            .finish()
    }
}

#[async_trait]
impl ReplySender for InstantlyReplySender {
    async fn send_reply(&self, message: &ReplyMessage) -> Result<ReplyReceipt, ReplyError> {
        let url = format!("{}{REPLY_ENDPOINT}", self.base_url);
        let request = ReplyRequest {
            eaccount:      &self.sender_account,
            reply_to_uuid: message.thread_id.as_str(),
            subject:       message.subject.as_reply(),
            body:          ReplyBody {
                html: &message.html_body,
            },
        };

        tracing::debug!(
            thread_id = %message.thread_id,
            subject = %request.subject,
            html_length = message.html_body.len(),
            "返信 API を呼び出し"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_transport_error)?;

        classify_response(status, &body)
    }
}

fn map_transport_error(err: reqwest::Error) -> ReplyError {
    if err.is_timeout() {
        ReplyError::Timeout(err.to_string())
    } else {
        ReplyError::Network(err.to_string())
    }
}

/// 返信 API のレスポンスを分類する
///
/// - 非 2xx: ステータスコードに応じた [`ReplyError`]
/// - 2xx で本文がエラーを示す: [`ReplyError::Rejected`]
/// - それ以外: 成功。本文にメール ID があれば受付結果に含める
///
/// 本文が空、または JSON オブジェクトでない 2xx は成功として扱う。
pub fn classify_response(status: u16, body: &str) -> Result<ReplyReceipt, ReplyError> {
    if !(200..300).contains(&status) {
        return Err(ReplyError::from_status(status, excerpt(body)));
    }

    let accepted = |provider_message_id| ReplyReceipt {
        provider_message_id,
        status,
    };

    if body.trim().is_empty() {
        return Ok(accepted(None));
    }

    let Ok(Value::Object(json)) = serde_json::from_str::<Value>(body) else {
        tracing::warn!(status, body = %excerpt(body), "返信 API のレスポンスが JSON オブジェクトではありません");
        return Ok(accepted(None));
    };

    if let Some(detail) = ERROR_FIELDS
        .iter()
        .find_map(|field| json.get(*field).filter(|v| is_truthy(v)))
    {
        return Err(ReplyError::Rejected(excerpt(&value_text(detail))));
    }

    if json.get("success") == Some(&Value::Bool(false)) {
        return Err(ReplyError::Rejected("success=false".to_string()));
    }

    if let Some(value) = failed_indicator(&json, "status", &FAILED_STATUSES) {
        return Err(ReplyError::Rejected(format!("status={value}")));
    }

    if let Some(value) = failed_indicator(&json, "state", &FAILED_STATES) {
        return Err(ReplyError::Rejected(format!("state={value}")));
    }

    let provider_message_id = MESSAGE_ID_FIELDS
        .iter()
        .find_map(|field| json.get(*field).and_then(message_id_text));

    if provider_message_id.is_none() {
        tracing::warn!(status, "返信 API のレスポンスにメール ID が含まれていません");
    }

    Ok(accepted(provider_message_id))
}

fn failed_indicator<'a>(
    json: &'a Map<String, Value>,
    field: &str,
    failures: &[&str],
) -> Option<&'a str> {
    let value = json.get(field)?.as_str()?;
    failures
        .iter()
        .any(|f| f.eq_ignore_ascii_case(value))
        .then_some(value)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn message_id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
