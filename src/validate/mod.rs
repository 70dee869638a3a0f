//! JSON 検証モジュール
//!
//! 任意のテキストを JSON として分類し、失敗時には行・桁と周辺コンテキスト、
//! 典型的な原因のヒントを含む診断を組み立てる。ドメインスキーマ検証
//! （`sites` 配列）は [`schema`] に分離した別ステージ。

pub mod schema;

pub use schema::{validate_config, SchemaError, SiteEntry, SourceConfig};

/// 検証結果
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid,
    Invalid {
        message: String,
        /// 1 始まりの行番号（取得できた場合）
        line: Option<usize>,
        /// 1 始まりの桁番号（取得できた場合）
        column: Option<usize>,
    },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// テキストを JSON として検証する
pub fn validate(text: &str) -> ValidationResult {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(_) => ValidationResult::Valid,
        Err(err) => {
            let line = err.line();
            let column = err.column();
            ValidationResult::Invalid {
                message: err.to_string(),
                line: (line > 0).then_some(line),
                column: (line > 0).then_some(column),
            }
        }
    }
}

/// ユーザ向けの詳細診断（複数行）。妥当な JSON には None。
///
/// 構成: エラーメッセージ、行番号つきの前後 2 行コンテキスト
/// （問題行に `>>>` マーカー）、パターンマッチしたヒント。
pub fn diagnose(text: &str) -> Option<String> {
    let err = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(_) => return None,
        Err(err) => err,
    };

    let mut report = format!("JSON エラー: {err}");

    if err.line() > 0 {
        report.push('\n');
        report.push_str(&excerpt(text, err.line()));
    }

    for hint in hints_for(&err) {
        report.push_str("\nヒント: ");
        report.push_str(hint);
    }

    Some(report)
}

/// 問題行の前後 2 行を行番号つきで切り出す
fn excerpt(text: &str, error_line: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return format!(">>> {error_line:>4} | ");
    }

    let error_idx = error_line.saturating_sub(1).min(lines.len() - 1);
    let start = error_idx.saturating_sub(2);
    let end = (error_idx + 2).min(lines.len() - 1);

    let mut out = Vec::new();
    for idx in start..=end {
        let marker = if idx == error_idx { ">>>" } else { "   " };
        out.push(format!("{marker} {:>4} | {}", idx + 1, lines[idx]));
    }
    out.join("\n")
}

/// エラー種別に応じたヒント
fn hints_for(err: &serde_json::Error) -> Vec<&'static str> {
    if err.is_eof() {
        return vec!["中括弧 {} や角括弧 [] の対応が取れているか確認してください"];
    }
    if err.is_syntax() {
        return vec![
            "カンマやコロンの抜けがないか確認してください",
            "文字列が引用符で囲まれているか確認してください",
            "末尾に余分なカンマがないか確認してください",
            "全角の記号（、：｛ など）が混ざっていないか確認してください",
        ];
    }
    Vec::new()
}
