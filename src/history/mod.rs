//! 編集履歴モジュール
//!
//! ドキュメント全文のスナップショット列を有界の線形履歴として保持し、
//! undo / redo / 任意バージョンへのジャンプを提供する。履歴は変更の
//! たびにストレージへ永続化され、再起動後も復元される。

use serde::{Deserialize, Serialize};

use crate::config::{self, HISTORY_DEFAULT_SIZE};
use crate::error::HistoryError;
use crate::storage::{now_millis, StorageAdapter};

/// ドキュメント全文のスナップショット
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub content: String,
    pub timestamp: i64,
}

impl Snapshot {
    fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            timestamp: now_millis(),
        }
    }
}

/// 有界の線形履歴
///
/// 不変条件:
/// * スナップショットが存在するとき cursor は `[0, len)` に収まる
/// * 空のとき cursor は None
/// * len は max_size を超えない（超過時は最古を追い出す）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditHistory {
    snapshots: Vec<Snapshot>,
    cursor: Option<usize>,
    #[serde(skip, default = "default_max_size")]
    max_size: usize,
}

fn default_max_size() -> usize {
    HISTORY_DEFAULT_SIZE
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl EditHistory {
    /// 既定の上限で空の履歴を作成
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_DEFAULT_SIZE)
    }

    /// 指定した上限で空の履歴を作成
    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            cursor: None,
            max_size: max_size.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// カーソル位置のスナップショット
    pub fn current(&self) -> Option<&Snapshot> {
        self.cursor.and_then(|idx| self.snapshots.get(idx))
    }

    /// インデックス指定でスナップショットを参照
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    /// すべてのスナップショット（古い順）
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    /// 新しい内容を記録する
    ///
    /// カーソル位置の内容と同一なら何もしない。カーソルが末尾でなければ
    /// 先に redo 側を切り捨てる（線形 undo の標準動作）。上限超過時は最古を
    /// 追い出す。変化があったとき true。
    pub fn record(&mut self, content: &str) -> bool {
        if let Some(idx) = self.cursor {
            if self.snapshots[idx].content == content {
                return false;
            }
            self.snapshots.truncate(idx + 1);
        }

        self.snapshots.push(Snapshot::new(content));
        if self.snapshots.len() > self.max_size {
            self.snapshots.remove(0);
        }
        self.cursor = Some(self.snapshots.len() - 1);
        true
    }

    /// ひとつ前のスナップショットへ戻る（先頭では no-op）
    pub fn undo(&mut self) -> Option<&Snapshot> {
        let idx = self.cursor?;
        if idx == 0 {
            return None;
        }
        self.cursor = Some(idx - 1);
        self.snapshots.get(idx - 1)
    }

    /// ひとつ先のスナップショットへ進む（末尾では no-op）
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let idx = self.cursor?;
        if idx + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor = Some(idx + 1);
        self.snapshots.get(idx + 1)
    }

    /// 任意バージョンへジャンプする（範囲外は no-op）
    pub fn jump_to(&mut self, index: usize) -> Option<&Snapshot> {
        if index >= self.snapshots.len() {
            return None;
        }
        self.cursor = Some(index);
        self.snapshots.get(index)
    }

    /// 履歴を空にする
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = None;
    }

    fn clamp_cursor(&mut self) {
        self.cursor = match (self.cursor, self.snapshots.len()) {
            (_, 0) => None,
            (None, len) => Some(len - 1),
            (Some(idx), len) => Some(idx.min(len - 1)),
        };
    }
}

/// バックアップ用のエクスポートレコード
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryExport {
    pub exported_at: i64,
    pub total: usize,
    pub cursor: Option<usize>,
    pub versions: Vec<ExportedVersion>,
}

/// エクスポートされた 1 バージョン
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedVersion {
    /// 1 始まりのバージョン番号
    pub version: usize,
    pub content: String,
    pub size: usize,
    pub timestamp: i64,
    /// カーソル位置のバージョンか
    pub current: bool,
}

/// 永続化と復元を担う履歴マネージャ
///
/// すべての変更操作のあとに `{snapshots, cursor}` をストレージへ書き出す。
/// 復元は構築時に一度だけ行い、欠損・破損は空の履歴へフォールバックする。
pub struct HistoryManager {
    history: EditHistory,
    storage: StorageAdapter,
}

impl HistoryManager {
    /// ストレージから復元しつつ作成する
    pub fn new(storage: StorageAdapter, max_size: usize) -> Self {
        let history = match storage.get::<EditHistory>(config::keys::HISTORY) {
            Some(mut restored) => {
                restored.max_size = max_size.max(1);
                // 復元データが過去の上限を超えていた場合は最古側を落とし、
                // カーソルが同じ内容を指し続けるよう追い出し分だけ繰り下げる
                let excess = restored.snapshots.len().saturating_sub(restored.max_size);
                if excess > 0 {
                    restored.snapshots.drain(..excess);
                    restored.cursor = restored.cursor.map(|idx| idx.saturating_sub(excess));
                }
                restored.clamp_cursor();
                restored
            }
            None => EditHistory::with_capacity(max_size),
        };
        Self { history, storage }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.history.cursor()
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// 内容を記録し、変化があれば永続化する
    pub fn record(&mut self, content: &str) {
        if self.history.record(content) {
            self.persist();
        }
    }

    /// undo して戻り先の内容を返す
    pub fn undo(&mut self) -> Option<String> {
        let content = self.history.undo().map(|s| s.content.clone())?;
        self.persist();
        Some(content)
    }

    /// redo して進み先の内容を返す
    pub fn redo(&mut self) -> Option<String> {
        let content = self.history.redo().map(|s| s.content.clone())?;
        self.persist();
        Some(content)
    }

    /// 指定バージョンへジャンプして内容を返す
    pub fn jump_to(&mut self, index: usize) -> Option<String> {
        let content = self.history.jump_to(index).map(|s| s.content.clone())?;
        self.persist();
        Some(content)
    }

    /// 履歴を消去し、永続化済みコピーも削除する
    pub fn clear(&mut self) {
        self.history.clear();
        self.storage.remove(config::keys::HISTORY);
    }

    /// バックアップレコードを生成する
    pub fn export(&self) -> HistoryExport {
        let cursor = self.history.cursor();
        HistoryExport {
            exported_at: now_millis(),
            total: self.history.len(),
            cursor,
            versions: self
                .history
                .iter()
                .enumerate()
                .map(|(idx, snapshot)| ExportedVersion {
                    version: idx + 1,
                    content: snapshot.content.clone(),
                    size: snapshot.content.len(),
                    timestamp: snapshot.timestamp,
                    current: Some(idx) == cursor,
                })
                .collect(),
        }
    }

    /// バックアップレコードから履歴を丸ごと置き換える
    ///
    /// カーソルは有効範囲へクランプする。失敗時は既存の履歴に手を付けない。
    pub fn import(&mut self, export: HistoryExport) -> Result<(), HistoryError> {
        let mut replacement = EditHistory::with_capacity(self.history.max_size());
        replacement.snapshots = export
            .versions
            .into_iter()
            .map(|v| Snapshot {
                content: v.content,
                timestamp: v.timestamp,
            })
            .collect();
        let excess = replacement
            .snapshots
            .len()
            .saturating_sub(replacement.max_size);
        if excess > 0 {
            replacement.snapshots.drain(..excess);
        }
        replacement.cursor = export.cursor.map(|idx| idx.saturating_sub(excess));
        replacement.clamp_cursor();

        self.history = replacement;
        self.persist();
        Ok(())
    }

    /// JSON 文字列からのインポート
    pub fn import_json(&mut self, raw: &str) -> Result<(), HistoryError> {
        let export: HistoryExport =
            serde_json::from_str(raw).map_err(|e| HistoryError::Format {
                message: e.to_string(),
            })?;
        self.import(export)
    }

    fn persist(&self) {
        if let Err(err) = self.storage.set(config::keys::HISTORY, &self.history) {
            log::warn!("failed to persist edit history: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_undo_redo_walk_the_sequence() {
        let mut history = EditHistory::new();
        history.record("a");
        history.record("b");
        history.record("c");

        assert_eq!(history.undo().map(|s| s.content.as_str()), Some("b"));
        assert_eq!(history.undo().map(|s| s.content.as_str()), Some("a"));
        assert_eq!(history.undo().map(|s| s.content.as_str()), None);

        assert_eq!(history.redo().map(|s| s.content.as_str()), Some("b"));
        assert_eq!(history.redo().map(|s| s.content.as_str()), Some("c"));
        assert_eq!(history.redo().map(|s| s.content.as_str()), None);
    }

    #[test]
    fn duplicate_record_is_a_no_op() {
        let mut history = EditHistory::new();
        history.record("same");
        let cursor = history.cursor();
        assert!(!history.record("same"));
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), cursor);
    }

    #[test]
    fn record_after_undo_discards_redo_tail() {
        let mut history = EditHistory::new();
        history.record("a");
        history.record("b");
        history.record("c");
        history.undo();
        history.undo();

        history.record("d");
        assert_eq!(history.len(), 2);
        assert_eq!(history.redo(), None);
        assert_eq!(history.undo().map(|s| s.content.as_str()), Some("a"));
        assert_eq!(history.redo().map(|s| s.content.as_str()), Some("d"));
    }

    #[test]
    fn exceeding_capacity_evicts_oldest() {
        let mut history = EditHistory::with_capacity(3);
        for content in ["a", "b", "c", "d"] {
            history.record(content);
        }

        assert_eq!(history.len(), 3);
        // 最古の "a" が追い出され、jump_to(0) は生き残った最古を返す
        assert_eq!(history.jump_to(0).map(|s| s.content.as_str()), Some("b"));
    }

    #[test]
    fn jump_out_of_range_is_a_no_op() {
        let mut history = EditHistory::new();
        history.record("only");
        let cursor = history.cursor();
        assert_eq!(history.jump_to(5), None);
        assert_eq!(history.cursor(), cursor);
    }

    #[test]
    fn empty_history_has_no_cursor() {
        let mut history = EditHistory::new();
        assert_eq!(history.cursor(), None);
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        history.record("first");
        history.clear();
        assert_eq!(history.cursor(), None);
    }

    #[test]
    fn export_numbers_versions_from_one() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = HistoryManager::new(StorageAdapter::at(dir.path()), 50);
        manager.record("a");
        manager.record("b");
        manager.undo();

        let export = manager.export();
        assert_eq!(export.total, 2);
        assert_eq!(export.cursor, Some(0));
        assert_eq!(export.versions[0].version, 1);
        assert!(export.versions[0].current);
        assert!(!export.versions[1].current);
        assert_eq!(export.versions[1].size, 1);
    }

    #[test]
    fn import_rejects_unrecognizable_input_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = HistoryManager::new(StorageAdapter::at(dir.path()), 50);
        manager.record("keep me");

        let result = manager.import_json("{\"totally\": \"different\"}");
        assert!(result.is_err());
        assert_eq!(manager.len(), 1);
        assert_eq!(
            manager.history().current().map(|s| s.content.as_str()),
            Some("keep me")
        );
    }

    #[test]
    fn import_over_capacity_compensates_the_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = HistoryManager::new(StorageAdapter::at(dir.path()), 3);

        let export = HistoryExport {
            exported_at: 0,
            total: 5,
            cursor: Some(3),
            versions: (0..5)
                .map(|v| ExportedVersion {
                    version: v + 1,
                    content: format!("v{v}"),
                    size: 2,
                    timestamp: 0,
                    current: v == 3,
                })
                .collect(),
        };
        manager.import(export).unwrap();

        // v2..v4 が生き残り、カーソルは v3 を指し続ける
        assert_eq!(manager.len(), 3);
        assert_eq!(manager.cursor(), Some(1));
        assert_eq!(
            manager.history().current().map(|s| s.content.as_str()),
            Some("v3")
        );
    }

    #[test]
    fn import_clamps_cursor_into_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = HistoryManager::new(StorageAdapter::at(dir.path()), 50);

        let export = HistoryExport {
            exported_at: 0,
            total: 1,
            cursor: Some(99),
            versions: vec![ExportedVersion {
                version: 1,
                content: "v1".to_string(),
                size: 2,
                timestamp: 0,
                current: true,
            }],
        };
        manager.import(export).unwrap();
        assert_eq!(manager.cursor(), Some(0));
    }
}
