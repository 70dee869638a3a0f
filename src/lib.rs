//! tsuki - GitHub リポジトリ上の JSON 設定ファイルを編集する TUI エディタ
//!
//! モジュール構成とアーキテクチャの実装

// コアモジュール
pub mod app;
pub mod config;
pub mod error;
pub mod logging;

// データ層
pub mod file;
pub mod github;
pub mod storage;

// 編集層
pub mod editor;
pub mod history;

// ロジック層
pub mod convert;
pub mod search;
pub mod validate;

// 表示層
pub mod ui;

// 公開API
pub use app::App;
pub use error::{Result, TsukiError};
