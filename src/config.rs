//! アプリケーション設定
//!
//! 永続化される設定（リポジトリ座標・テーマ・各種上限）と、
//! コード全体で共有する定数・ストレージキーを定義する。

use serde::{Deserialize, Serialize};

use crate::storage::StorageAdapter;

/// 編集履歴の既定上限
pub const HISTORY_DEFAULT_SIZE: usize = 50;

/// 保存トークンの有効日数
pub const TOKEN_EXPIRE_DAYS: i64 = 7;

/// 自動保存バッファの復元提示ウィンドウ（時間）
pub const AUTO_SAVE_RECOVERY_HOURS: i64 = 24;

/// 入力停止から JSON 検証までの遅延（ミリ秒）
pub const VALIDATE_DEBOUNCE_MS: u64 = 500;

/// 変更から自動保存バッファ書き出しまでの遅延（ミリ秒）
pub const AUTO_SAVE_DELAY_MS: u64 = 30_000;

/// ローカルインポートのサイズ上限（10MiB）
pub const MAX_IMPORT_SIZE: u64 = 10 * 1024 * 1024;

/// コミットメッセージの接頭辞
pub const COMMIT_MESSAGE_PREFIX: &str = "[tsuki]";

/// ストレージキー名
pub mod keys {
    pub const SETTINGS: &str = "settings";
    pub const THEME: &str = "theme";
    pub const VIEW_MODE: &str = "view_mode";
    pub const HISTORY: &str = "edit_history";
    pub const GITHUB_TOKEN: &str = "github_token";
    pub const AUTO_SAVE: &str = "auto_save";
}

/// 永続化されるアプリケーション設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// リポジトリのオーナー
    pub owner: String,
    /// リポジトリ名
    pub repo: String,
    /// コミット先ブランチ
    pub branch: String,
    /// 編集履歴の上限
    pub history_limit: usize,
    /// 整形時のインデント幅（空白数）
    pub indent_width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            branch: "main".to_string(),
            history_limit: HISTORY_DEFAULT_SIZE,
            indent_width: 2,
        }
    }
}

impl Settings {
    /// ストレージから設定を読み込む（欠損・破損時は既定値）
    pub fn load(storage: &StorageAdapter) -> Self {
        storage.get(keys::SETTINGS).unwrap_or_default()
    }

    /// ストレージへ保存する（失敗はログのみ）
    pub fn save(&self, storage: &StorageAdapter) {
        if let Err(err) = storage.set(keys::SETTINGS, self) {
            log::warn!("failed to persist settings: {err}");
        }
    }
}
