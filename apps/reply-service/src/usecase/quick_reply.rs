//! # クイックリプライ ユースケース
//!
//! 選択肢の解決 → 返信 HTML のレンダリング → 返信 API 呼び出しを統合する。
//!
//! ## 設計方針
//!
//! - **ステートレス**: 残りの選択肢はカタログ全体から毎回再計算する
//! - **送信前に失敗**: 不明な選択肢・設定不備は外部 API を呼ぶ前にエラーにする
//! - **依存性注入**: `ReplySender` は trait object で受け取る

use std::sync::Arc;

use quickreply_domain::{
    choice::{Choice, ChoiceCatalog, ChoiceId},
    reply::{QuickReplyRequest, ReplyMessage, ReplyReceipt},
    subject::ReplySubject,
};
use quickreply_infra::ReplySender;
use quickreply_shared::{
    event_log::{error, event},
    log_business_event,
};

use super::reply_renderer::{ReplyLinks, ReplyRenderer};
use crate::error::ServiceError;

/// 送信経路の状態
enum Delivery {
    Ready {
        sender:          Arc<dyn ReplySender>,
        public_base_url: String,
    },
    /// 必要な設定が欠けており送信できない
    Unavailable { missing: Vec<&'static str> },
}

/// 1 回のクイックリプライの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickReplyOutcome {
    /// クリックされた選択肢
    pub chosen:    Choice,
    /// 返信メールにボタンとして載せた選択肢（定義順）
    pub remaining: Vec<ChoiceId>,
    pub subject:   ReplySubject,
    pub receipt:   ReplyReceipt,
}

impl QuickReplyOutcome {
    /// 残りの選択肢がなく、会話が完了したか
    pub fn is_completed(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// クイックリプライ サービス
pub struct QuickReplyService {
    catalog:  Arc<ChoiceCatalog>,
    renderer: ReplyRenderer,
    delivery: Delivery,
}

impl QuickReplyService {
    /// 送信可能な状態で作成する
    pub fn new(
        catalog: Arc<ChoiceCatalog>,
        renderer: ReplyRenderer,
        sender: Arc<dyn ReplySender>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            renderer,
            delivery: Delivery::Ready {
                sender,
                public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            },
        }
    }

    /// 設定不備で送信できない状態で作成する
    ///
    /// 返信要求はすべて [`ServiceError::NotConfigured`] になる。
    pub fn unconfigured(
        catalog: Arc<ChoiceCatalog>,
        renderer: ReplyRenderer,
        missing: Vec<&'static str>,
    ) -> Self {
        Self {
            catalog,
            renderer,
            delivery: Delivery::Unavailable { missing },
        }
    }

    pub fn renderer(&self) -> &ReplyRenderer {
        &self.renderer
    }

    /// クリックされた選択肢に対する返信を送る
    ///
    /// # エラー
    ///
    /// - 選択肢がカタログにない: `ServiceError::Domain(UnknownChoice)`
    /// - 設定不備: `ServiceError::NotConfigured`
    /// - レンダリング・送信の失敗: `ServiceError::Reply`
    pub async fn reply(
        &self,
        request: &QuickReplyRequest,
    ) -> Result<QuickReplyOutcome, ServiceError> {
        let thread_id = request.thread_id();

        let resolution = match self.catalog.resolve(request.choice()) {
            Ok(resolution) => resolution,
            Err(e) => {
                log_business_event!(
                    event.category = event::category::REPLY,
                    event.action = event::action::CHOICE_REJECTED,
                    event.entity_type = event::entity_type::EMAIL_THREAD,
                    event.entity_id = %thread_id,
                    event.result = event::result::FAILURE,
                    choice = request.choice(),
                    "カタログにない選択肢を拒否"
                );
                return Err(e.into());
            }
        };

        let (sender, public_base_url) = match &self.delivery {
            Delivery::Ready {
                sender,
                public_base_url,
            } => (sender, public_base_url.as_str()),
            Delivery::Unavailable { missing } => {
                tracing::error!(
                    error.category = error::category::CONFIGURATION,
                    error.kind = error::kind::MISSING_SETTING,
                    missing = ?missing,
                    "返信に必要な設定がないため送信できません"
                );
                return Err(ServiceError::NotConfigured(missing.clone()));
            }
        };

        let links = ReplyLinks {
            base_url: public_base_url,
            thread_id,
            subject: request.subject(),
        };
        let html_body = self
            .renderer
            .render(resolution.chosen(), resolution.remaining(), &links)
            .inspect_err(|e| {
                tracing::error!(
                    error.category = error::category::INTERNAL,
                    error.kind = error::kind::TEMPLATE,
                    error = %e,
                    "返信テンプレートのレンダリングに失敗"
                );
            })?;

        let message = ReplyMessage {
            thread_id: thread_id.clone(),
            subject: request.subject().clone(),
            html_body,
        };
        let chosen_id = resolution.chosen().id().as_str();
        let remaining: Vec<ChoiceId> = resolution.remaining_ids().into_iter().cloned().collect();

        match sender.send_reply(&message).await {
            Ok(receipt) => {
                log_business_event!(
                    event.category = event::category::REPLY,
                    event.action = event::action::REPLY_SENT,
                    event.entity_type = event::entity_type::EMAIL_THREAD,
                    event.entity_id = %thread_id,
                    event.result = event::result::SUCCESS,
                    choice = chosen_id,
                    remaining = remaining.len(),
                    provider_message_id = receipt.provider_message_id.as_deref().unwrap_or("-"),
                    "返信を送信"
                );
                Ok(QuickReplyOutcome {
                    chosen: resolution.chosen().clone(),
                    remaining,
                    subject: message.subject,
                    receipt,
                })
            }
            Err(e) => {
                let kind: &'static str = e.kind().into();
                tracing::error!(
                    error.category = error::category::EXTERNAL_SERVICE,
                    error.kind = kind,
                    error = %e,
                    "返信 API の呼び出しに失敗"
                );
                log_business_event!(
                    event.category = event::category::REPLY,
                    event.action = event::action::REPLY_FAILED,
                    event.entity_type = event::entity_type::EMAIL_THREAD,
                    event.entity_id = %thread_id,
                    event.result = event::result::FAILURE,
                    choice = chosen_id,
                    "返信の送信に失敗"
                );
                Err(e.into())
            }
        }
    }
}
