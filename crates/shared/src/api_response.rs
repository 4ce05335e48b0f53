//! # API レスポンスエンベロープ
//!
//! JSON エンドポイントの統一レスポンス形式 `{ "data": T }` を提供する。

use serde::{Deserialize, Serialize};

/// JSON エンドポイントの統一レスポンス型
///
/// ## 使用例
///
/// ```
/// use quickreply_shared::ApiResponse;
///
/// let response = ApiResponse::new("sent");
/// assert_eq!(response.data, "sent");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializeでdataキーに包まれる() {
        let response = ApiResponse::new(vec!["close_loan", "never_pay"]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "data": ["close_loan", "never_pay"] })
        );
    }

    #[test]
    fn test_deserializeでjsonからオブジェクトに変換する() {
        let response: ApiResponse<String> = serde_json::from_str(r#"{"data": "sent"}"#).unwrap();

        assert_eq!(response.data, "sent");
    }
}
