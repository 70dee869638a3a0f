//! フォーマット変換モジュール
//!
//! JSON の整形・圧縮と、XML / CSV / YAML へのエクスポート変換を提供する。
//! いずれも入力テキストを一度 JSON として解析し、不正な入力は
//! [`ConvertError`] で拒否する。

use serde::Serialize;
use serde_json::Value;

use crate::error::ConvertError;

/// エクスポート形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Xml,
    Csv,
    Yaml,
}

impl ExportFormat {
    /// ファイル拡張子
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Xml => "xml",
            ExportFormat::Csv => "csv",
            ExportFormat::Yaml => "yaml",
        }
    }

    /// MIME タイプ
    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Xml => "text/xml",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Yaml => "text/yaml",
        }
    }
}

/// 変換結果のドキュメント
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedDocument {
    pub format: ExportFormat,
    pub content: String,
}

fn parse(text: &str) -> Result<Value, ConvertError> {
    serde_json::from_str(text).map_err(|e| ConvertError::InvalidJson {
        message: e.to_string(),
    })
}

/// 指定インデント幅で整形する
pub fn format_json(text: &str, indent_width: usize) -> Result<String, ConvertError> {
    let value = parse(text)?;
    let indent = b" ".repeat(indent_width.clamp(1, 8));
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| ConvertError::InvalidJson {
            message: e.to_string(),
        })?;
    String::from_utf8(out).map_err(|e| ConvertError::InvalidJson {
        message: e.to_string(),
    })
}

/// 空白を取り除いて 1 行に圧縮する
pub fn compress_json(text: &str) -> Result<String, ConvertError> {
    let value = parse(text)?;
    serde_json::to_string(&value).map_err(|e| ConvertError::InvalidJson {
        message: e.to_string(),
    })
}

/// YAML へ変換する
pub fn to_yaml(text: &str) -> Result<ConvertedDocument, ConvertError> {
    let value = parse(text)?;
    let content = serde_yaml::to_string(&value).map_err(|e| ConvertError::Yaml {
        message: e.to_string(),
    })?;
    Ok(ConvertedDocument {
        format: ExportFormat::Yaml,
        content,
    })
}

/// CSV へ変換する
///
/// トップレベルが配列でなければ 1 要素の配列として扱う。ヘッダは全要素の
/// キーの和集合（出現順）。ネストした値は JSON 文字列として埋め込む。
pub fn to_csv(text: &str) -> Result<ConvertedDocument, ConvertError> {
    let value = parse(text)?;
    let rows = match value {
        Value::Array(items) => items,
        other => vec![other],
    };

    let mut keys: Vec<String> = Vec::new();
    for row in &rows {
        if let Value::Object(map) = row {
            for key in map.keys() {
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        }
    }

    if keys.is_empty() {
        return Ok(ConvertedDocument {
            format: ExportFormat::Csv,
            content: String::new(),
        });
    }

    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(&keys)
        .map_err(|e| ConvertError::Csv {
            message: e.to_string(),
        })?;

    for row in &rows {
        let record: Vec<String> = keys
            .iter()
            .map(|key| match row.get(key) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(scalar @ (Value::Bool(_) | Value::Number(_))) => scalar.to_string(),
                Some(nested) => serde_json::to_string(nested).unwrap_or_default(),
            })
            .collect();
        writer.write_record(&record).map_err(|e| ConvertError::Csv {
            message: e.to_string(),
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ConvertError::Csv {
            message: e.to_string(),
        })?;
    let content = String::from_utf8(bytes).map_err(|e| ConvertError::Csv {
        message: e.to_string(),
    })?;
    Ok(ConvertedDocument {
        format: ExportFormat::Csv,
        content,
    })
}

/// XML へ変換する
///
/// 配列要素は `name_0, name_1, ...` の要素名で展開する。
pub fn to_xml(text: &str) -> Result<ConvertedDocument, ConvertError> {
    let value = parse(text)?;
    let mut content = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    write_xml(&value, "root", &mut content);
    Ok(ConvertedDocument {
        format: ExportFormat::Xml,
        content,
    })
}

fn write_xml(value: &Value, name: &str, out: &mut String) {
    match value {
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                write_xml(item, &format!("{name}_{idx}"), out);
                out.push('\n');
            }
            // 末尾の余分な改行を戻す
            if !items.is_empty() {
                out.pop();
            }
        }
        Value::Object(map) => {
            out.push_str(&format!("<{name}>\n"));
            for (key, child) in map {
                write_xml(child, key, out);
                out.push('\n');
            }
            out.push_str(&format!("</{name}>"));
        }
        Value::String(s) => {
            out.push_str(&format!("<{name}>{}</{name}>", escape_xml(s)));
        }
        scalar => {
            out.push_str(&format!("<{name}>{}</{name}>", escape_xml(&scalar.to_string())));
        }
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}
