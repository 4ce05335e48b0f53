//! # ドメイン層エラー定義
//!
//! 入力値の検証失敗や、カタログに存在しない選択肢を表現するエラー型。
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 必須項目の欠落、形式不正 |
//! | `UnknownChoice` | 400 Bad Request | カタログにない選択肢がクリックされた |
//! | `InvalidCatalog` | - (起動失敗) | カタログ定義そのものが不正 |
//!
//! いずれのエラーでも返信メールは送信されない。

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 必須フィールドが欠けている、文字数制限を超えている等。
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 選択肢がカタログに存在しない
    ///
    /// 保持する文字列はリクエストで指定された選択肢（trim 済み）。
    #[error("不明な選択肢です: {0}")]
    UnknownChoice(String),

    /// カタログ定義が不正
    ///
    /// 空のカタログ、ID の重複、エイリアスの衝突など。
    /// 起動時の設定読み込みでのみ発生する。
    #[error("選択肢カタログが不正です: {0}")]
    InvalidCatalog(String),
}
