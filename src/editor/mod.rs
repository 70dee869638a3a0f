//! エディタ状態モジュール
//!
//! 編集中テキストとカーソル、保存済み内容との差分（modified フラグ）を
//! 管理する。履歴・検証・検索はこの層の外にあり、内容の読み書きだけを
//! ここへ依頼する。

mod autosave;
mod cursor;
mod debounce;

pub use autosave::{AutoSaveBuffer, RecoveryCandidate};
pub use cursor::{line_column_at, line_count, CursorMovement, CursorPosition};
pub use debounce::Debouncer;

/// エディタ状態
#[derive(Debug, Clone)]
pub struct EditorState {
    content: String,
    saved_content: String,
    cursor: CursorPosition,
}

impl EditorState {
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            saved_content: content.to_string(),
            cursor: CursorPosition::new(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    /// 保存済み内容と異なるか
    pub fn is_modified(&self) -> bool {
        self.content != self.saved_content
    }

    /// 現在の内容を「保存済み」として記録する
    pub fn mark_saved(&mut self) {
        self.saved_content = self.content.clone();
    }

    /// 内容を丸ごと差し替える（undo / redo / ファイル読み込み）
    ///
    /// カーソルは新しい内容に収まるよう丸める。保存済み内容は変えない。
    pub fn replace_content(&mut self, content: &str) {
        self.content = content.to_string();
        self.cursor.clamp_to(&self.content);
    }

    /// 読み込み直後など、保存済みとして内容を設定する
    pub fn load_content(&mut self, content: &str) {
        self.content = content.to_string();
        self.saved_content = content.to_string();
        self.cursor = CursorPosition::new();
    }

    /// カーソル位置に 1 文字挿入する
    pub fn insert_char(&mut self, ch: char) {
        let byte = byte_index(&self.content, self.cursor.char_pos);
        self.content.insert(byte, ch);
        self.cursor.char_pos += 1;
        if ch == '\n' {
            self.cursor.line += 1;
            self.cursor.column = 0;
        } else {
            self.cursor.column += 1;
        }
    }

    /// カーソル位置に文字列を挿入する
    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.insert_char(ch);
        }
    }

    /// 改行を挿入する
    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// カーソル直前の 1 文字を削除する
    pub fn backspace(&mut self) -> bool {
        if self.cursor.char_pos == 0 {
            return false;
        }
        self.cursor.char_pos -= 1;
        let byte = byte_index(&self.content, self.cursor.char_pos);
        self.content.remove(byte);
        let (line, column) = line_column_at(&self.content, self.cursor.char_pos);
        self.cursor.line = line;
        self.cursor.column = column;
        true
    }

    /// カーソル位置の 1 文字を削除する
    pub fn delete_forward(&mut self) -> bool {
        if self.cursor.char_pos >= self.content.chars().count() {
            return false;
        }
        let byte = byte_index(&self.content, self.cursor.char_pos);
        self.content.remove(byte);
        true
    }

    pub fn move_cursor(&mut self, movement: CursorMovement) -> bool {
        cursor::move_cursor(&mut self.cursor, &self.content, movement)
    }

    /// 指定した文字位置へ移動する（検索マッチへのジャンプ）
    pub fn move_to_char(&mut self, char_pos: usize) {
        self.cursor.char_pos = char_pos.min(self.content.chars().count());
        let (line, column) = line_column_at(&self.content, self.cursor.char_pos);
        self.cursor.line = line;
        self.cursor.column = column;
    }
}

/// 文字位置をバイト位置へ変換する
fn byte_index(text: &str, char_pos: usize) -> usize {
    text.char_indices()
        .nth(char_pos)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_backspace_track_modified_state() {
        let mut editor = EditorState::new("{}");
        assert!(!editor.is_modified());

        editor.move_to_char(1);
        editor.insert_str("\"a\":1");
        assert_eq!(editor.content(), "{\"a\":1}");
        assert!(editor.is_modified());

        for _ in 0..5 {
            assert!(editor.backspace());
        }
        assert_eq!(editor.content(), "{}");
        assert!(!editor.is_modified());
    }

    #[test]
    fn multibyte_insertion_keeps_byte_boundaries() {
        let mut editor = EditorState::new("");
        editor.insert_str("名前");
        editor.move_to_char(1);
        editor.insert_char('の');
        assert_eq!(editor.content(), "名の前");
        assert_eq!(editor.cursor().char_pos, 2);
    }

    #[test]
    fn newline_moves_cursor_to_next_line() {
        let mut editor = EditorState::new("ab");
        editor.move_to_char(1);
        editor.insert_newline();
        assert_eq!(editor.content(), "a\nb");
        assert_eq!((editor.cursor().line, editor.cursor().column), (1, 0));
    }

    #[test]
    fn delete_forward_at_end_is_noop() {
        let mut editor = EditorState::new("x");
        editor.move_to_char(1);
        assert!(!editor.delete_forward());
        editor.move_to_char(0);
        assert!(editor.delete_forward());
        assert_eq!(editor.content(), "");
    }

    #[test]
    fn replace_content_clamps_cursor_but_keeps_saved_base() {
        let mut editor = EditorState::new("0123456789");
        editor.move_to_char(10);
        editor.replace_content("abc");
        assert_eq!(editor.cursor().char_pos, 3);
        // 保存済みは元の内容のままなので差分あり
        assert!(editor.is_modified());
    }

    #[test]
    fn mark_saved_clears_modified_flag() {
        let mut editor = EditorState::new("{}");
        editor.insert_char(' ');
        assert!(editor.is_modified());
        editor.mark_saved();
        assert!(!editor.is_modified());
    }
}
