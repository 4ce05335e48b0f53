//! # テスト用モック送信
//!
//! ユースケース・ハンドラのテストで使用するインメモリの ReplySender。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! quickreply-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quickreply_domain::reply::{ReplyError, ReplyMessage, ReplyReceipt};

use crate::reply_sender::ReplySender;

/// 送信内容を記録するモック
///
/// `failing` で作成すると、記録したうえで指定のエラーを返す。
#[derive(Clone, Default)]
pub struct MockReplySender {
    sent:    Arc<Mutex<Vec<ReplyMessage>>>,
    failure: Option<ReplyError>,
}

impl MockReplySender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: ReplyError) -> Self {
        Self {
            sent:    Arc::new(Mutex::new(Vec::new())),
            failure: Some(error),
        }
    }

    /// これまでに送信要求されたメッセージ
    pub fn sent_messages(&self) -> Vec<ReplyMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplySender for MockReplySender {
    async fn send_reply(&self, message: &ReplyMessage) -> Result<ReplyReceipt, ReplyError> {
        self.sent.lock().unwrap().push(message.clone());

        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(ReplyReceipt {
                provider_message_id: Some(format!("mock-{}", message.thread_id)),
                status:              200,
            }),
        }
    }
}
