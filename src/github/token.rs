//! トークン保管
//!
//! アクセストークンを難読化して 7 日の有効期限つきで保存する。
//! 期限切れは「保存されていない」と同じ扱い（取得時に None）。

use crate::config::{self, TOKEN_EXPIRE_DAYS};
use crate::storage::StorageAdapter;

/// トークンの保存・取得・破棄
#[derive(Debug, Clone)]
pub struct CredentialStore {
    storage: StorageAdapter,
}

impl CredentialStore {
    pub fn new(storage: StorageAdapter) -> Self {
        Self { storage }
    }

    /// トークンを保存する（難読化 + 7 日期限）
    pub fn store(&self, token: &str) {
        if let Err(err) = self.storage.set_obfuscated_with_expiry(
            config::keys::GITHUB_TOKEN,
            token,
            TOKEN_EXPIRE_DAYS,
        ) {
            log::warn!("failed to persist access token: {err}");
        }
    }

    /// 有効なトークンを取得する（期限切れ・欠損は None）
    pub fn load(&self) -> Option<String> {
        self.storage.get_obfuscated(config::keys::GITHUB_TOKEN)
    }

    /// トークンを破棄する（401/403 を受けた呼び出し側が使う）
    pub fn clear(&self) {
        self.storage.remove(config::keys::GITHUB_TOKEN);
    }
}
