//! # 返信レンダラー
//!
//! tera テンプレートエンジンで返信メールの HTML と、クリック後に表示する確認ページを生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **ボタンのリンク**: `{public_base_url}/r?thread_id=..&subject=..&choice=..`。
//!   件名は `Re:` を除いたベース件名を渡し、値はすべて URL エンコードする
//! - **自動エスケープ**: ラベル・文面に加え、リンク URL も属性値としてエスケープする
//!   （`&` は `&amp;` になる）

use quickreply_domain::{
    choice::{Choice, ChoiceId},
    reply::{ReplyError, ThreadId},
    subject::ReplySubject,
};
use serde::Serialize;
use tera::{Context, Tera};

const NEXT_CHOICES_TEMPLATE: &str = "next_choices.html";
const COMPLETED_TEMPLATE: &str = "completed.html";
const ACKNOWLEDGEMENT_TEMPLATE: &str = "acknowledgement.html";

/// ボタンのリンク先を組み立てるための値
#[derive(Debug, Clone, Copy)]
pub struct ReplyLinks<'a> {
    /// 公開 URL（末尾の `/` なし）
    pub base_url:  &'a str,
    pub thread_id: &'a ThreadId,
    pub subject:   &'a ReplySubject,
}

impl ReplyLinks<'_> {
    /// 選択肢ボタンのリンク URL
    pub fn choice_url(&self, choice: &ChoiceId) -> String {
        format!(
            "{}/r?thread_id={}&subject={}&choice={}",
            self.base_url,
            urlencoding::encode(self.thread_id.as_str()),
            urlencoding::encode(self.subject.base()),
            urlencoding::encode(choice.as_str()),
        )
    }
}

#[derive(Debug, Serialize)]
struct ButtonView<'a> {
    label: &'a str,
    url:   String,
}

/// 返信レンダラー
pub struct ReplyRenderer {
    engine: Tera,
}

impl ReplyRenderer {
    /// `include_str!` で埋め込んだテンプレートを tera に登録する
    pub fn new() -> Result<Self, ReplyError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    NEXT_CHOICES_TEMPLATE,
                    include_str!("../../templates/replies/next_choices.html"),
                ),
                (
                    COMPLETED_TEMPLATE,
                    include_str!("../../templates/replies/completed.html"),
                ),
                (
                    ACKNOWLEDGEMENT_TEMPLATE,
                    include_str!("../../templates/replies/acknowledgement.html"),
                ),
            ])
            .map_err(|e| ReplyError::Template(e.to_string()))?;

        Ok(Self { engine })
    }

    /// 返信メールの HTML 本文を生成する
    ///
    /// - `remaining` が空でない: 選んだ選択肢の文面 + 残りの選択肢ごとにボタン 1 つ
    /// - `remaining` が空: 選んだ選択肢の文面 + 完了メッセージ（ボタンなし）
    pub fn render(
        &self,
        chosen: &Choice,
        remaining: &[&Choice],
        links: &ReplyLinks<'_>,
    ) -> Result<String, ReplyError> {
        let mut context = Context::new();
        context.insert("title", &chosen.copy().title);
        context.insert("body", &chosen.copy().body);

        let template = if remaining.is_empty() {
            COMPLETED_TEMPLATE
        } else {
            let buttons: Vec<ButtonView<'_>> = remaining
                .iter()
                .map(|choice| ButtonView {
                    label: choice.label(),
                    url:   links.choice_url(choice.id()),
                })
                .collect();
            context.insert("buttons", &buttons);
            NEXT_CHOICES_TEMPLATE
        };

        self.engine
            .render(template, &context)
            .map_err(|e| ReplyError::Template(e.to_string()))
    }

    /// クリックした受信者のブラウザに表示する確認ページを生成する
    pub fn render_acknowledgement(
        &self,
        chosen: &Choice,
        completed: bool,
    ) -> Result<String, ReplyError> {
        let mut context = Context::new();
        context.insert("label", chosen.label());
        context.insert("title", &chosen.copy().title);
        context.insert("completed", &completed);

        self.engine
            .render(ACKNOWLEDGEMENT_TEMPLATE, &context)
            .map_err(|e| ReplyError::Template(e.to_string()))
    }
}
