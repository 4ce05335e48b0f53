//! Noop 返信送信実装
//!
//! 返信を実際に送信せず、ログ出力のみ行う。
//! ローカル実行や送信を止めたい環境で使用する。

use async_trait::async_trait;
use quickreply_domain::reply::{ReplyError, ReplyMessage, ReplyReceipt};

use super::ReplySender;

/// Noop 返信送信（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopReplySender;

#[async_trait]
impl ReplySender for NoopReplySender {
    async fn send_reply(&self, message: &ReplyMessage) -> Result<ReplyReceipt, ReplyError> {
        tracing::info!(
            thread_id = %message.thread_id,
            subject = %message.subject,
            html_length = message.html_body.len(),
            "Noop: 返信送信をスキップ"
        );
        Ok(ReplyReceipt {
            provider_message_id: None,
            status:              200,
        })
    }
}
