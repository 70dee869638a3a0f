//! 自動保存バッファ
//!
//! 編集中の内容をローカルストレージへ定期的に退避し、異常終了後の
//! 起動時に復元候補として提示する。リモートへは一切書き込まない。
//! 復元候補として有効なのは退避から 24 時間以内のものだけ。

use crate::config::{self, AUTO_SAVE_RECOVERY_HOURS};
use crate::storage::{now_millis, StorageAdapter};

/// 復元候補
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryCandidate {
    pub content: String,
    /// 退避時刻（エポックミリ秒）
    pub saved_at: i64,
}

/// ローカル退避バッファ
#[derive(Debug, Clone)]
pub struct AutoSaveBuffer {
    storage: StorageAdapter,
}

impl AutoSaveBuffer {
    pub fn new(storage: StorageAdapter) -> Self {
        Self { storage }
    }

    /// 現在の内容を退避する
    pub fn save(&self, content: &str) {
        if let Err(err) = self.storage.set(config::keys::AUTO_SAVE, &content) {
            log::warn!("auto-save buffer write failed: {err}");
        }
    }

    /// 24 時間以内の退避内容があれば返す。古い退避は破棄する
    pub fn recent(&self) -> Option<RecoveryCandidate> {
        let saved_at = self.storage.timestamp_of(config::keys::AUTO_SAVE)?;
        let age_limit = AUTO_SAVE_RECOVERY_HOURS * 60 * 60 * 1000;
        if now_millis() - saved_at > age_limit {
            self.storage.remove(config::keys::AUTO_SAVE);
            return None;
        }
        let content: String = self.storage.get(config::keys::AUTO_SAVE)?;
        Some(RecoveryCandidate { content, saved_at })
    }

    /// 退避内容を破棄する（保存成功後や復元拒否後）
    pub fn clear(&self) {
        self.storage.remove(config::keys::AUTO_SAVE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_content_is_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = AutoSaveBuffer::new(StorageAdapter::at(dir.path()));
        buffer.save("{\"sites\":[]}");

        let candidate = buffer.recent().unwrap();
        assert_eq!(candidate.content, "{\"sites\":[]}");
        assert!(candidate.saved_at <= now_millis());
    }

    #[test]
    fn clear_discards_the_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = AutoSaveBuffer::new(StorageAdapter::at(dir.path()));
        buffer.save("draft");
        buffer.clear();
        assert_eq!(buffer.recent(), None);
    }

    #[test]
    fn missing_buffer_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = AutoSaveBuffer::new(StorageAdapter::at(dir.path()));
        assert_eq!(buffer.recent(), None);
    }
}
