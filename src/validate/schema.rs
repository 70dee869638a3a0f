//! ドメインスキーマ検証
//!
//! このアプリの JSON は汎用ではなく、コンテンツソース記述子の一覧
//! （トップレベルの `sites` 配列）を表す。構文エラーとは別に、この形の
//! 欠陥を 1 始まりの要素番号つきで報告する。

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `api` フィールドに要求する URL 形（http/https スキーム + 本体）
fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^https?://.+").expect("static pattern"))
}

/// スキーマ検証エラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("JSON 解析失敗: {message}")]
    Syntax { message: String },

    #[error("設定はオブジェクトである必要があります")]
    NotAnObject,

    #[error("設定に sites 配列がありません")]
    MissingSites,

    #[error("{index} 番目のソースに {field} フィールドがありません")]
    MissingField { index: usize, field: &'static str },

    #[error("{index} 番目のソースの api が有効な URL ではありません")]
    InvalidApi { index: usize },
}

/// コンテンツソース 1 件の記述子
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteEntry {
    pub key: String,
    pub name: String,
    pub api: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchable: Option<i64>,
    #[serde(rename = "quickSearch", default, skip_serializing_if = "Option::is_none")]
    pub quick_search: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable: Option<i64>,
}

/// 設定ドキュメント全体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SourceConfig {
    pub sites: Vec<SiteEntry>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub wallpaper: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub spider: String,
    #[serde(rename = "warningText", default, skip_serializing_if = "String::is_empty")]
    pub warning_text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub disclaimer: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
}

/// 未ロード時に使う空の設定ドキュメント
pub fn default_document() -> String {
    let skeleton = serde_json::json!({
        "sites": [],
        "wallpaper": "",
        "spider": "",
        "warningText": "",
        "disclaimer": "",
        "version": "1.0.0"
    });
    serde_json::to_string_pretty(&skeleton).unwrap_or_else(|_| "{}".to_string())
}

/// 設定 JSON を構造検証し、成功時に型付きの設定を返す
pub fn validate_config(text: &str) -> Result<SourceConfig, SchemaError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| SchemaError::Syntax {
            message: e.to_string(),
        })?;

    let object = value.as_object().ok_or(SchemaError::NotAnObject)?;
    let sites = object
        .get("sites")
        .and_then(|v| v.as_array())
        .ok_or(SchemaError::MissingSites)?;

    for (idx, site) in sites.iter().enumerate() {
        let index = idx + 1;
        let key = site.get("key").and_then(|v| v.as_str()).unwrap_or("");
        if key.is_empty() {
            return Err(SchemaError::MissingField { index, field: "key" });
        }
        let name = site.get("name").and_then(|v| v.as_str()).unwrap_or("");
        if name.is_empty() {
            return Err(SchemaError::MissingField { index, field: "name" });
        }
        let api = site.get("api").and_then(|v| v.as_str()).unwrap_or("");
        if api.is_empty() {
            return Err(SchemaError::MissingField { index, field: "api" });
        }
        if !url_pattern().is_match(api) {
            return Err(SchemaError::InvalidApi { index });
        }
    }

    serde_json::from_value(value).map_err(|e| SchemaError::Syntax {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_config() {
        let text = r#"{"sites":[{"key":"a","name":"b","api":"https://example.com/api"}]}"#;
        let config = validate_config(text).unwrap();
        assert_eq!(config.sites.len(), 1);
        assert_eq!(config.sites[0].key, "a");
    }

    #[test]
    fn rejects_non_http_api_with_element_index() {
        let text = r#"{"sites":[{"key":"a","name":"b","api":"ftp://x"}]}"#;
        assert_eq!(
            validate_config(text),
            Err(SchemaError::InvalidApi { index: 1 })
        );
    }

    #[test]
    fn rejects_missing_sites() {
        assert_eq!(validate_config("{}"), Err(SchemaError::MissingSites));
        assert_eq!(validate_config("[]"), Err(SchemaError::NotAnObject));
    }

    #[test]
    fn reports_first_defective_element() {
        let text = r#"{"sites":[
            {"key":"a","name":"b","api":"https://ok.example"},
            {"key":"","name":"b","api":"https://ok.example"}
        ]}"#;
        assert_eq!(
            validate_config(text),
            Err(SchemaError::MissingField { index: 2, field: "key" })
        );
    }

    #[test]
    fn missing_name_is_distinct_from_missing_key() {
        let text = r#"{"sites":[{"key":"a","api":"https://ok.example"}]}"#;
        assert_eq!(
            validate_config(text),
            Err(SchemaError::MissingField { index: 1, field: "name" })
        );
    }

    #[test]
    fn default_document_passes_both_stages() {
        let doc = default_document();
        assert!(crate::validate::validate(&doc).is_valid());
        assert!(validate_config(&doc).is_ok());
    }

    #[test]
    fn optional_numeric_fields_deserialize() {
        let text = r#"{"sites":[{"key":"a","name":"b","api":"https://x.example",
            "type":1,"searchable":1,"quickSearch":0,"filterable":1}]}"#;
        let config = validate_config(text).unwrap();
        assert_eq!(config.sites[0].quick_search, Some(0));
    }
}
