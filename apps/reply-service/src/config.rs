//! # Reply Service 設定
//!
//! 環境変数から Reply Service の設定を読み込む。
//!
//! 値の形式が不正な場合（ポート番号、タイムアウト、バックエンド名）は起動を中止する。
//! 認証情報や公開 URL が未設定でも起動は続行し、readiness が not_ready を返す。

use std::{env, fmt, path::PathBuf, time::Duration};

use quickreply_domain::choice::ChoiceCatalog;
use strum::EnumString;
use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 値の形式が不正
    #[error("{name} の値が不正です: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    /// 選択肢カタログファイルを読み込めない
    #[error("選択肢カタログを読み込めません ({path}): {message}")]
    Catalog { path: String, message: String },
}

/// 返信の送信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReplyBackend {
    /// Instantly の返信 API で送信
    #[default]
    Instantly,
    /// 送信しない（ログ出力のみ）
    Noop,
}

/// Reply Service の設定
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// バインドアドレス
    pub host:            String,
    /// ポート番号
    pub port:            u16,
    /// ボタンのリンク先に使う公開 URL（例: `https://reply.example.com`）
    pub public_base_url: Option<String>,
    /// 返信 API の設定
    pub reply_api:       ReplyApiConfig,
    /// 選択肢カタログ JSON のパス（未設定なら既定カタログ）
    pub catalog_path:    Option<PathBuf>,
}

/// 返信 API の設定
///
/// `REPLY_BACKEND` 環境変数で送信バックエンドを切り替える:
/// - `instantly`: Instantly の返信 API 経由で送信
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Clone)]
pub struct ReplyApiConfig {
    pub backend:        ReplyBackend,
    pub base_url:       String,
    pub api_key:        Option<String>,
    pub sender_account: Option<String>,
    pub timeout:        Duration,
}

// API キーをログに出さない
impl fmt::Debug for ReplyApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyApiConfig")
            .field("backend", &self.backend)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("sender_account", &self.sender_account)
            .field("timeout", &self.timeout)
            .finish()
    }
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_REPLY_API_BASE_URL: &str = "https://api.instantly.ai";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl ServiceConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// 空文字列（空白のみを含む）は未設定として扱う。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("REPLY_PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "REPLY_PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let backend = match get("REPLY_BACKEND") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "REPLY_BACKEND",
                value,
            })?,
            None => ReplyBackend::default(),
        };

        let timeout_secs = match get("REPLY_API_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "REPLY_API_TIMEOUT_SECS",
                    value,
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            host: get("REPLY_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            public_base_url: get("PUBLIC_BASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            reply_api: ReplyApiConfig {
                backend,
                base_url: get("REPLY_API_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_REPLY_API_BASE_URL.to_string()),
                api_key: get("INSTANTLY_API_KEY"),
                sender_account: get("INSTANTLY_EACCOUNT"),
                timeout: Duration::from_secs(timeout_secs),
            },
            catalog_path: get("CHOICE_CATALOG_PATH").map(PathBuf::from),
        })
    }

    /// 返信送信に必要な設定の充足状況
    ///
    /// `noop` バックエンドでは認証情報を必要としない。
    pub fn setting_checks(&self) -> Vec<(&'static str, bool)> {
        let needs_credentials = self.reply_api.backend == ReplyBackend::Instantly;
        vec![
            (
                "api_key",
                !needs_credentials || self.reply_api.api_key.is_some(),
            ),
            (
                "sender_account",
                !needs_credentials || self.reply_api.sender_account.is_some(),
            ),
            ("public_base_url", self.public_base_url.is_some()),
        ]
    }

    /// 未設定の項目名
    pub fn missing_settings(&self) -> Vec<&'static str> {
        self.setting_checks()
            .into_iter()
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| name)
            .collect()
    }

    /// 選択肢カタログを読み込む
    ///
    /// `CHOICE_CATALOG_PATH` が未設定の場合は既定のローン回収カタログを返す。
    pub fn load_catalog(&self) -> Result<ChoiceCatalog, ConfigError> {
        let Some(path) = &self.catalog_path else {
            return Ok(ChoiceCatalog::loan_collections());
        };

        let catalog_error = |message: String| ConfigError::Catalog {
            path: path.display().to_string(),
            message,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| catalog_error(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| catalog_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServiceConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn 未設定の場合はデフォルト値を使う() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.public_base_url, None);
        assert_eq!(config.reply_api.backend, ReplyBackend::Instantly);
        assert_eq!(config.reply_api.base_url, "https://api.instantly.ai");
        assert_eq!(config.reply_api.timeout, Duration::from_secs(30));
        assert_eq!(config.catalog_path, None);
    }

    #[test]
    fn 環境変数の値を読み込む() {
        let config = config_from(&[
            ("REPLY_HOST", "127.0.0.1"),
            ("REPLY_PORT", "9000"),
            ("PUBLIC_BASE_URL", "https://reply.example.com/"),
            ("REPLY_BACKEND", "NOOP"),
            ("REPLY_API_TIMEOUT_SECS", "5"),
            ("INSTANTLY_API_KEY", "key"),
            ("INSTANTLY_EACCOUNT", "sender@example.com"),
        ])
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.public_base_url.as_deref(),
            Some("https://reply.example.com")
        );
        assert_eq!(config.reply_api.backend, ReplyBackend::Noop);
        assert_eq!(config.reply_api.timeout, Duration::from_secs(5));
        assert_eq!(config.reply_api.api_key.as_deref(), Some("key"));
    }

    #[rstest]
    #[case("REPLY_PORT", "eighty")]
    #[case("REPLY_PORT", "70000")]
    #[case("REPLY_BACKEND", "smtp")]
    #[case("REPLY_API_TIMEOUT_SECS", "0")]
    #[case("REPLY_API_TIMEOUT_SECS", "-1")]
    fn 不正な値は起動エラーになる(#[case] name: &str, #[case] value: &str) {
        let result = config_from(&[(name, value)]);

        assert!(
            matches!(result, Err(ConfigError::InvalidValue { name: n, .. }) if n == name)
        );
    }

    #[test]
    fn 認証情報が未設定でも読み込みは成功し未設定項目として報告される() {
        let config = config_from(&[("INSTANTLY_API_KEY", "  ")]).unwrap();

        assert_eq!(
            config.missing_settings(),
            vec!["api_key", "sender_account", "public_base_url"]
        );
    }

    #[test]
    fn noopバックエンドでは認証情報を要求しない() {
        let config = config_from(&[
            ("REPLY_BACKEND", "noop"),
            ("PUBLIC_BASE_URL", "http://localhost:8000"),
        ])
        .unwrap();

        assert!(config.missing_settings().is_empty());
    }

    #[test]
    fn debug出力にapiキーを含めない() {
        let config = config_from(&[("INSTANTLY_API_KEY", "super-secret")]).unwrap();

        let debug = format!("{config:?}");

        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn カタログパス未設定なら既定カタログを使う() {
        let config = config_from(&[]).unwrap();

        let catalog = config.load_catalog().unwrap();

        assert_eq!(catalog, ChoiceCatalog::loan_collections());
    }

    #[test]
    fn カタログファイルを読み込める() {
        let path = std::env::temp_dir().join(format!(
            "quickreply-catalog-{}.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"{"choices": [
                {"id": "yes", "label": "Yes", "copy": {"title": "Great", "body": "Thanks."}},
                {"id": "no", "label": "No", "copy": {"title": "Understood", "body": "Noted."}}
            ]}"#,
        )
        .unwrap();
        let mut config = config_from(&[]).unwrap();
        config.catalog_path = Some(path.clone());

        let catalog = config.load_catalog();
        std::fs::remove_file(&path).unwrap();

        let ids: Vec<String> = catalog.unwrap().ids().iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["yes", "no"]);
    }

    #[test]
    fn 存在しないカタログファイルはエラーになる() {
        let mut config = config_from(&[]).unwrap();
        config.catalog_path = Some(PathBuf::from("/nonexistent/quickreply/catalog.json"));

        let result = config.load_catalog();

        assert!(matches!(result, Err(ConfigError::Catalog { .. })));
    }
}
