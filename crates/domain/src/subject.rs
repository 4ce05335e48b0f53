//! # 返信件名
//!
//! 返信メールの件名を正規化する。受信者がボタンを何度クリックしても
//! 件名が `Re: Re: Re: ...` と伸びていかないよう、先頭の `Re:` を
//! すべて取り除いてから 1 つだけ付け直す。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DomainError;

const REPLY_PREFIX: &str = "re:";

/// 返信件名（値オブジェクト）
///
/// 内部には `Re:` を取り除いた元の件名（ベース件名）を保持する。
/// ボタンのリンクにはベース件名を埋め込み、送信時は [`ReplySubject::as_reply`] を使う。
///
/// # 使用例
///
/// ```rust
/// use quickreply_domain::subject::ReplySubject;
///
/// let subject = ReplySubject::normalize("Re: RE:re:  Loan").unwrap();
/// assert_eq!(subject.base(), "Loan");
/// assert_eq!(subject.as_reply(), "Re: Loan");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReplySubject {
    base: String,
}

impl ReplySubject {
    /// 件名を正規化する
    ///
    /// 前後の空白を除き、先頭の `Re:`（大文字小文字を区別しない）を繰り返し取り除く。
    /// 正規化は冪等で、`normalize(x.as_reply())` は `x` と等しい。
    ///
    /// # エラー
    ///
    /// `Re:` を取り除いた結果が空になる場合は `DomainError::Validation` を返す。
    pub fn normalize(raw: &str) -> Result<Self, DomainError> {
        let base = strip_reply_prefixes(raw);
        if base.is_empty() {
            return Err(DomainError::Validation("件名は必須です".to_string()));
        }
        Ok(Self {
            base: base.to_string(),
        })
    }

    /// `Re:` を含まない元の件名
    pub fn base(&self) -> &str {
        &self.base
    }

    /// 送信用の件名（`Re: ` がちょうど 1 つ付く）
    pub fn as_reply(&self) -> String {
        format!("Re: {}", self.base)
    }
}

fn strip_reply_prefixes(raw: &str) -> &str {
    let mut rest = raw.trim();
    while let Some(head) = rest.get(..REPLY_PREFIX.len()) {
        if !head.eq_ignore_ascii_case(REPLY_PREFIX) {
            break;
        }
        rest = rest[REPLY_PREFIX.len()..].trim_start();
    }
    rest.trim_end()
}

impl fmt::Display for ReplySubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Re: {}", self.base)
    }
}

impl TryFrom<String> for ReplySubject {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalize(&value)
    }
}

impl From<ReplySubject> for String {
    fn from(subject: ReplySubject) -> Self {
        subject.base
    }
}
