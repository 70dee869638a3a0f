//! ローカルストレージモジュール
//!
//! キー単位の JSON ファイルとして値を永続化する。各エントリは
//! `{value, timestamp, expires}` のエンベロープで包まれ、期限切れや
//! 破損したエントリは「存在しない」ものとして扱う（致命的エラーにしない）。

mod obfuscate;

pub use obfuscate::{deobfuscate, obfuscate};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// 現在時刻（エポックミリ秒）
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// 永続化エンベロープ
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    value: serde_json::Value,
    timestamp: i64,
    expires: Option<i64>,
}

/// キー／バリュー型の永続化アダプタ
///
/// ブラウザ版の per-origin ストレージに相当するものを、ユーザ状態
/// ディレクトリ配下のファイル群で実現する。
#[derive(Debug, Clone)]
pub struct StorageAdapter {
    root: PathBuf,
}

impl StorageAdapter {
    /// 既定の状態ディレクトリ（`~/.local/state/tsuki` 相当）で開く
    pub fn open_default() -> Result<Self, StorageError> {
        let base = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .ok_or(StorageError::NoStateDir)?;
        Ok(Self::at(base.join("tsuki")))
    }

    /// 指定ディレクトリをルートとして開く
    pub fn at<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// ルートディレクトリ
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn write_envelope(&self, key: &str, envelope: &Envelope) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).map_err(|e| StorageError::Io {
            message: e.to_string(),
        })?;
        let body = serde_json::to_string(envelope).map_err(|e| StorageError::Serialize {
            message: e.to_string(),
        })?;
        fs::write(self.entry_path(key), body).map_err(|e| StorageError::Io {
            message: e.to_string(),
        })
    }

    /// 値を保存する（期限なし）
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value).map_err(|e| StorageError::Serialize {
            message: e.to_string(),
        })?;
        self.write_envelope(
            key,
            &Envelope {
                value,
                timestamp: now_millis(),
                expires: None,
            },
        )
    }

    /// 有効日数つきで値を保存する
    pub fn set_with_expiry<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        expiry_days: i64,
    ) -> Result<(), StorageError> {
        let value = serde_json::to_value(value).map_err(|e| StorageError::Serialize {
            message: e.to_string(),
        })?;
        let now = now_millis();
        self.write_envelope(
            key,
            &Envelope {
                value,
                timestamp: now,
                expires: Some(now + expiry_days * MILLIS_PER_DAY),
            },
        )
    }

    /// 値を取得する
    ///
    /// 欠損・破損・期限切れはすべて None。期限切れエントリは読み取り時に削除する。
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = fs::read_to_string(self.entry_path(key)).ok()?;
        let envelope: Envelope = match serde_json::from_str(&raw) {
            Ok(env) => env,
            Err(err) => {
                log::warn!("corrupt storage entry {key}: {err}");
                return None;
            }
        };

        if let Some(expires) = envelope.expires {
            if now_millis() > expires {
                self.remove(key);
                return None;
            }
        }

        match serde_json::from_value(envelope.value) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("storage entry {key} has unexpected shape: {err}");
                None
            }
        }
    }

    /// 保存時刻（エポックミリ秒）を取得する
    pub fn timestamp_of(&self, key: &str) -> Option<i64> {
        let raw = fs::read_to_string(self.entry_path(key)).ok()?;
        let envelope: Envelope = serde_json::from_str(&raw).ok()?;
        Some(envelope.timestamp)
    }

    /// 難読化して保存する（有効日数つき）
    pub fn set_obfuscated_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_days: i64,
    ) -> Result<(), StorageError> {
        self.set_with_expiry(key, &obfuscate(value), expiry_days)
    }

    /// 難読化された値を取得する
    pub fn get_obfuscated(&self, key: &str) -> Option<String> {
        let encoded: String = self.get(key)?;
        match deobfuscate(&encoded) {
            Some(plain) => Some(plain),
            None => {
                log::warn!("storage entry {key} could not be deobfuscated");
                None
            }
        }
    }

    /// エントリを削除する
    pub fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.entry_path(key));
    }

    /// このアダプタ配下のエントリをすべて削除する
    pub fn clear(&self) {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let _ = fs::remove_file(path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        count: u32,
    }

    fn adapter() -> (tempfile::TempDir, StorageAdapter) {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageAdapter::at(dir.path());
        (dir, storage)
    }

    #[test]
    fn set_and_get_round_trip() {
        let (_dir, storage) = adapter();
        let sample = Sample {
            name: "sites".to_string(),
            count: 3,
        };
        storage.set("sample", &sample).unwrap();
        assert_eq!(storage.get::<Sample>("sample"), Some(sample));
    }

    #[test]
    fn missing_key_is_none() {
        let (_dir, storage) = adapter();
        assert_eq!(storage.get::<Sample>("nope"), None);
    }

    #[test]
    fn corrupt_entry_degrades_to_none() {
        let (_dir, storage) = adapter();
        std::fs::create_dir_all(storage.root()).unwrap();
        std::fs::write(storage.root().join("broken.json"), "{not json").unwrap();
        assert_eq!(storage.get::<Sample>("broken"), None);
    }

    #[test]
    fn expired_entry_is_absent_and_removed() {
        let (_dir, storage) = adapter();
        storage
            .set_with_expiry("fleeting", &"value".to_string(), -1)
            .unwrap();
        assert_eq!(storage.get::<String>("fleeting"), None);
        // 読み取りで物理削除される
        assert!(!storage.root().join("fleeting.json").exists());
    }

    #[test]
    fn unexpired_entry_survives() {
        let (_dir, storage) = adapter();
        storage
            .set_with_expiry("token", &"value".to_string(), 7)
            .unwrap();
        assert_eq!(storage.get::<String>("token").as_deref(), Some("value"));
    }

    #[test]
    fn obfuscated_value_is_not_plaintext_on_disk() {
        let (_dir, storage) = adapter();
        storage
            .set_obfuscated_with_expiry("token", "ghp_secret", 7)
            .unwrap();

        let raw = std::fs::read_to_string(storage.root().join("token.json")).unwrap();
        assert!(!raw.contains("ghp_secret"));
        assert_eq!(storage.get_obfuscated("token").as_deref(), Some("ghp_secret"));
    }

    #[test]
    fn clear_removes_only_namespace_entries() {
        let (_dir, storage) = adapter();
        storage.set("one", &1u32).unwrap();
        storage.set("two", &2u32).unwrap();
        std::fs::write(storage.root().join("keep.txt"), "other").unwrap();

        storage.clear();

        assert_eq!(storage.get::<u32>("one"), None);
        assert_eq!(storage.get::<u32>("two"), None);
        assert!(storage.root().join("keep.txt").exists());
    }
}
