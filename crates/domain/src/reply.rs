//! # 返信
//!
//! クイックリプライ 1 回分のリクエストと、外部メール API に渡す返信メッセージ、
//! 送信失敗の分類を定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`ThreadId`] | スレッド ID | メール API 上で返信先メールを指す不透明な識別子 |
//! | [`QuickReplyRequest`] | クイックリプライ要求 | ボタンクリック・Webhook から抽出した 3 項目 |
//! | [`ReplyMessage`] | 返信メッセージ | レンダリング済みの送信内容 |
//! | [`ReplyError`] | 返信送信エラー | 外部 API 呼び出しの失敗分類 |
//!
//! リクエストはリクエストスコープでのみ存在し、永続化されない。

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

use crate::{DomainError, subject::ReplySubject};

define_validated_string! {
    /// スレッド ID（値オブジェクト）
    ///
    /// 外部メール API の `reply_to_uuid` にそのまま渡す。形式は API 側が決めるため、
    /// ここでは空でないことと長さのみ検証する。
    pub struct ThreadId {
        label: "スレッド ID",
        max_length: 256,
    }
}

/// クイックリプライ要求
///
/// ボタンクリック（クエリパラメータ）または Webhook（JSON）から抽出した値。
/// `choice` はカタログ上の ID またはエイリアスで、カタログとの照合は
/// [`ChoiceCatalog::resolve`](crate::choice::ChoiceCatalog::resolve) で行う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickReplyRequest {
    thread_id: ThreadId,
    subject:   ReplySubject,
    choice:    String,
}

impl QuickReplyRequest {
    /// 受け取った値からリクエストを組み立てる
    ///
    /// # エラー
    ///
    /// いずれかの項目が欠けている、または空の場合は `DomainError::Validation` を返す。
    pub fn new(
        thread_id: Option<String>,
        subject: Option<String>,
        choice: Option<String>,
    ) -> Result<Self, DomainError> {
        let thread_id = ThreadId::new(
            thread_id.ok_or_else(|| DomainError::Validation("スレッド ID は必須です".to_string()))?,
        )?;
        let subject = ReplySubject::normalize(
            subject
                .as_deref()
                .ok_or_else(|| DomainError::Validation("件名は必須です".to_string()))?,
        )?;
        let choice = choice
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| DomainError::Validation("選択肢は必須です".to_string()))?;

        Ok(Self {
            thread_id,
            subject,
            choice,
        })
    }

    pub fn thread_id(&self) -> &ThreadId {
        &self.thread_id
    }

    pub fn subject(&self) -> &ReplySubject {
        &self.subject
    }

    pub fn choice(&self) -> &str {
        &self.choice
    }
}

/// 返信メッセージ
///
/// 返信レンダラーの出力。ReplySender に渡される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyMessage {
    /// 返信先スレッド
    pub thread_id: ThreadId,
    /// 件名（送信時に `Re: ` を 1 つ付ける）
    pub subject:   ReplySubject,
    /// HTML 本文
    pub html_body: String,
}

/// 送信受付結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyReceipt {
    /// メール API が採番した返信メールの ID（レスポンスに含まれる場合のみ）
    pub provider_message_id: Option<String>,
    /// HTTP ステータスコード
    pub status:              u16,
}

/// 返信送信エラー
///
/// いずれの失敗もリトライしない。呼び出し元にそのまま伝播する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    /// 認証情報が拒否された（401 / 403）
    #[error("メール API の認証に失敗: {0}")]
    Authentication(String),

    /// タイムアウト
    #[error("メール API がタイムアウトしました: {0}")]
    Timeout(String),

    /// 接続エラー
    #[error("メール API に接続できません: {0}")]
    Network(String),

    /// リクエスト不正（400 / 404 / 422）
    #[error("メール API がリクエストを拒否: {0}")]
    MalformedRequest(String),

    /// レート制限（429）
    #[error("メール API のレート制限に達しました: {0}")]
    RateLimited(String),

    /// 2xx だがレスポンス本文に失敗が示されている
    #[error("メール API が返信を受け付けませんでした: {0}")]
    Rejected(String),

    /// 上記以外の非 2xx
    #[error("メール API がエラーを返しました (status={status}): {message}")]
    Upstream { status: u16, message: String },

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    Template(String),
}

/// 返信送信エラーの種別
///
/// ログの `error.kind` に使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ReplyErrorKind {
    Authentication,
    Timeout,
    Network,
    MalformedRequest,
    RateLimited,
    Rejected,
    Upstream,
    Template,
}

impl ReplyError {
    pub fn kind(&self) -> ReplyErrorKind {
        match self {
            Self::Authentication(_) => ReplyErrorKind::Authentication,
            Self::Timeout(_) => ReplyErrorKind::Timeout,
            Self::Network(_) => ReplyErrorKind::Network,
            Self::MalformedRequest(_) => ReplyErrorKind::MalformedRequest,
            Self::RateLimited(_) => ReplyErrorKind::RateLimited,
            Self::Rejected(_) => ReplyErrorKind::Rejected,
            Self::Upstream { .. } => ReplyErrorKind::Upstream,
            Self::Template(_) => ReplyErrorKind::Template,
        }
    }

    /// HTTP ステータスコードから失敗を分類する
    ///
    /// 2xx は対象外（呼び出し側で本文を検査する）。
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Authentication(message),
            400 | 404 | 422 => Self::MalformedRequest(message),
            408 | 504 => Self::Timeout(message),
            429 => Self::RateLimited(message),
            _ => Self::Upstream { status, message },
        }
    }
}
