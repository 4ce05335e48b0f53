//! # 選択肢カタログ
//!
//! メール受信者に提示するクイックリプライの選択肢と、クリック後に
//! 「残りの選択肢」を求める解決ロジックを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`Choice`] | 選択肢 | ID、ボタンラベル、返信文面（タイトル + 本文） |
//! | [`ChoiceCatalog`] | 選択肢カタログ | 順序付きの固定集合。起動時に構築され不変 |
//! | [`Resolution`] | 解決結果 | クリックされた選択肢と、残りの選択肢 |
//!
//! ## 設計方針
//!
//! - **順序保持**: 残りの選択肢はカタログ定義順を維持する
//! - **毎回再計算**: 残り = カタログ全体 − 今回クリックされた選択肢。
//!   過去のクリックは考慮しない（クリック履歴を保持しないため）
//! - **エイリアス**: 短縮パス（`settle` など）でも選択肢を指定できる。
//!   ボタンのリンクには常に正規の ID を使う

use serde::{Deserialize, Serialize};

use crate::DomainError;

define_validated_string! {
    /// 選択肢 ID（値オブジェクト）
    ///
    /// カタログ内で一意なキー。ボタンのリンクに `choice` クエリパラメータとして埋め込まれる。
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - 最大 64 文字
    pub struct ChoiceId {
        label: "選択肢 ID",
        max_length: 64,
    }
}

/// 選択肢ごとの返信文面
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceCopy {
    /// 見出し（例: "You want settlement"）
    pub title: String,
    /// 本文
    pub body:  String,
}

impl ChoiceCopy {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body:  body.into(),
        }
    }
}

/// 選択肢
///
/// 設定時に定義され、実行時に生成・破棄されることはない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    id:      ChoiceId,
    label:   String,
    copy:    ChoiceCopy,
    #[serde(default)]
    aliases: Vec<String>,
}

impl Choice {
    /// 新しい選択肢を作成する
    ///
    /// # エラー
    ///
    /// ID が不正、またはラベル・タイトルが空の場合は `DomainError::Validation` を返す。
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        copy: ChoiceCopy,
    ) -> Result<Self, DomainError> {
        let choice = Self {
            id: ChoiceId::new(id)?,
            label: label.into(),
            copy,
            aliases: Vec::new(),
        };
        choice.validate()?;
        Ok(choice)
    }

    /// エイリアスを設定する
    ///
    /// エイリアスは trim + 小文字化して保持する。
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.aliases = aliases
            .into_iter()
            .map(|alias| normalize_alias(alias.as_ref()))
            .collect();
        self
    }

    pub fn id(&self) -> &ChoiceId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn copy(&self) -> &ChoiceCopy {
        &self.copy
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// ID またはエイリアスが一致するか
    ///
    /// ID は完全一致、エイリアスは大文字小文字を区別しない。
    fn matches(&self, key: &str) -> bool {
        self.id.as_str() == key || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(key))
    }

    /// デシリアライズ経由で構築された値も含めて不変条件を検証する
    fn validate(&self) -> Result<(), DomainError> {
        if self.label.trim().is_empty() {
            return Err(DomainError::Validation(format!(
                "選択肢 {} のラベルは必須です",
                self.id
            )));
        }
        if self.copy.title.trim().is_empty() {
            return Err(DomainError::Validation(format!(
                "選択肢 {} の文面タイトルは必須です",
                self.id
            )));
        }
        if self.aliases.iter().any(|a| a.is_empty()) {
            return Err(DomainError::Validation(format!(
                "選択肢 {} に空のエイリアスがあります",
                self.id
            )));
        }
        Ok(())
    }
}

fn normalize_alias(alias: &str) -> String {
    alias.trim().to_ascii_lowercase()
}

/// 残りの選択肢を求める
///
/// `all` から `chosen` を除いた選択肢を、元の順序のまま返す。
///
/// # エラー
///
/// `chosen` が `all` に含まれない場合は `DomainError::UnknownChoice` を返す。
pub fn remaining_choices<'a>(
    chosen: &ChoiceId,
    all: &'a [Choice],
) -> Result<Vec<&'a Choice>, DomainError> {
    if !all.iter().any(|c| &c.id == chosen) {
        return Err(DomainError::UnknownChoice(chosen.to_string()));
    }
    Ok(all.iter().filter(|c| &c.id != chosen).collect())
}

/// 選択肢の解決結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    chosen:    &'a Choice,
    remaining: Vec<&'a Choice>,
}

impl<'a> Resolution<'a> {
    /// クリックされた選択肢
    pub fn chosen(&self) -> &'a Choice {
        self.chosen
    }

    /// 残りの選択肢（カタログ定義順）
    pub fn remaining(&self) -> &[&'a Choice] {
        &self.remaining
    }

    pub fn remaining_ids(&self) -> Vec<&'a ChoiceId> {
        self.remaining.iter().map(|c| c.id()).collect()
    }

    /// 残りがなく、会話が完了したか
    pub fn is_final(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// 選択肢カタログ
///
/// 順序付きの選択肢集合。起動時に一度だけ構築し、`Arc` で共有する。
///
/// # 不変条件
///
/// - 1 つ以上の選択肢を持つ
/// - ID はカタログ内で一意
/// - エイリアスは他の ID・エイリアスと衝突しない
///
/// # 使用例
///
/// ```rust
/// use quickreply_domain::choice::ChoiceCatalog;
///
/// let catalog = ChoiceCatalog::loan_collections();
/// let resolution = catalog.resolve("never").unwrap();
///
/// assert_eq!(resolution.chosen().id().as_str(), "never_pay");
/// let remaining: Vec<&str> = resolution.remaining_ids().iter().map(|id| id.as_str()).collect();
/// assert_eq!(remaining, vec!["close_loan", "settle_loan", "need_more_time"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "CatalogDefinition")]
pub struct ChoiceCatalog {
    choices: Vec<Choice>,
}

/// カタログ定義ファイルの形式
///
/// ```json
/// { "choices": [ { "id": "...", "label": "...", "copy": { "title": "...", "body": "..." }, "aliases": [] } ] }
/// ```
#[derive(Deserialize)]
struct CatalogDefinition {
    choices: Vec<Choice>,
}

impl TryFrom<CatalogDefinition> for ChoiceCatalog {
    type Error = DomainError;

    fn try_from(definition: CatalogDefinition) -> Result<Self, Self::Error> {
        Self::new(definition.choices)
    }
}

impl ChoiceCatalog {
    /// 選択肢の一覧からカタログを構築する
    ///
    /// # エラー
    ///
    /// 不変条件を満たさない場合は `DomainError::InvalidCatalog` を返す。
    pub fn new(choices: Vec<Choice>) -> Result<Self, DomainError> {
        if choices.is_empty() {
            return Err(DomainError::InvalidCatalog(
                "選択肢が 1 つもありません".to_string(),
            ));
        }

        // デシリアライズ経由の ID は trim されていないため、正規化してから重複を検査する
        let choices: Vec<Choice> = choices
            .into_iter()
            .map(|mut choice| -> Result<Choice, DomainError> {
                choice.id = ChoiceId::new(choice.id.as_str())
                    .map_err(|e| DomainError::InvalidCatalog(e.to_string()))?;
                choice.aliases = choice.aliases.iter().map(|a| normalize_alias(a)).collect();
                Ok(choice)
            })
            .collect::<Result<_, _>>()?;

        let mut keys: Vec<String> = Vec::new();
        for choice in &choices {
            choice
                .validate()
                .map_err(|e| DomainError::InvalidCatalog(e.to_string()))?;

            let id_key = choice.id.as_str().to_ascii_lowercase();
            if keys.contains(&id_key) {
                return Err(DomainError::InvalidCatalog(format!(
                    "選択肢 ID が重複しています: {}",
                    choice.id
                )));
            }
            keys.push(id_key);

            for alias in &choice.aliases {
                if keys.contains(alias) {
                    return Err(DomainError::InvalidCatalog(format!(
                        "エイリアス {alias} が他の選択肢と衝突しています"
                    )));
                }
                keys.push(alias.clone());
            }
        }

        Ok(Self { choices })
    }

    /// ローン回収キャンペーン用の既定カタログ
    pub fn loan_collections() -> Self {
        let choice = |id: &str, label: &str, title: &str, body: &str, aliases: &[&str]| Choice {
            id:      ChoiceId(id.to_string()),
            label:   label.to_string(),
            copy:    ChoiceCopy::new(title, body),
            aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
        };

        Self {
            choices: vec![
                choice(
                    "close_loan",
                    "🔵 Close my loan",
                    "You want to close your loan",
                    "We'll share closure steps shortly.",
                    &["close"],
                ),
                choice(
                    "settle_loan",
                    "💠 Settle my loan",
                    "You want settlement",
                    "We'll evaluate and send a proposal.",
                    &["settle"],
                ),
                choice(
                    "never_pay",
                    "⚠️ I will never pay",
                    "You cannot / won't pay",
                    "We understand. We'll review your case.",
                    &["never"],
                ),
                choice(
                    "need_more_time",
                    "⏳ Need more time",
                    "You need time",
                    "Noted. We'll share extension options.",
                    &["time", "human"],
                ),
            ],
        }
    }

    /// 全選択肢（定義順）
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn ids(&self) -> Vec<&ChoiceId> {
        self.choices.iter().map(|c| c.id()).collect()
    }

    /// ID またはエイリアスで選択肢を検索する
    pub fn find(&self, key: &str) -> Option<&Choice> {
        let key = key.trim();
        self.choices
            .iter()
            .find(|c| c.id.as_str() == key)
            .or_else(|| self.choices.iter().find(|c| c.matches(key)))
    }

    /// クリックされた選択肢から残りの選択肢を解決する
    ///
    /// # エラー
    ///
    /// `key` がどの ID・エイリアスにも一致しない場合は `DomainError::UnknownChoice` を返す。
    pub fn resolve(&self, key: &str) -> Result<Resolution<'_>, DomainError> {
        let chosen = self
            .find(key)
            .ok_or_else(|| DomainError::UnknownChoice(key.trim().to_string()))?;
        let remaining = remaining_choices(chosen.id(), &self.choices)?;

        Ok(Resolution { chosen, remaining })
    }
}
