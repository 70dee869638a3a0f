//! カーソル位置管理
//!
//! テキスト内容に対するカーソル位置（文字位置・行・列）を管理する。
//! 位置はすべて文字単位（バイトではない）で数える。

/// カーソル位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPosition {
    /// 文字位置（0ベース）
    pub char_pos: usize,
    /// 行番号（0ベース）
    pub line: usize,
    /// 列番号（0ベース、文字単位）
    pub column: usize,
}

impl CursorPosition {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内容に収まるよう位置を丸める
    pub fn clamp_to(&mut self, text: &str) {
        let total = text.chars().count();
        if self.char_pos > total {
            self.char_pos = total;
        }
        let (line, column) = line_column_at(text, self.char_pos);
        self.line = line;
        self.column = column;
    }
}

/// カーソル移動の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMovement {
    Forward,
    Backward,
    Up,
    Down,
    LineStart,
    LineEnd,
    BufferStart,
    BufferEnd,
}

/// 文字位置から (行, 列) を計算する
pub fn line_column_at(text: &str, char_pos: usize) -> (usize, usize) {
    let mut line = 0;
    let mut column = 0;
    for ch in text.chars().take(char_pos) {
        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// (行, 列) から文字位置を計算する（列は行長に丸める）
pub fn char_position_at(text: &str, line: usize, column: usize) -> usize {
    let mut char_pos = 0;
    for (idx, text_line) in text.split('\n').enumerate() {
        if idx == line {
            char_pos += column.min(text_line.chars().count());
            return char_pos;
        }
        char_pos += text_line.chars().count() + 1;
    }
    text.chars().count()
}

/// 指定行の文字数
pub fn line_length(text: &str, line: usize) -> usize {
    text.split('\n')
        .nth(line)
        .map(|l| l.chars().count())
        .unwrap_or(0)
}

/// 行数（空文字列は 1 行）
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// テキスト内容を考慮してカーソルを移動する
pub fn move_cursor(cursor: &mut CursorPosition, text: &str, movement: CursorMovement) -> bool {
    match movement {
        CursorMovement::Forward => {
            if cursor.char_pos < text.chars().count() {
                cursor.char_pos += 1;
                let (line, column) = line_column_at(text, cursor.char_pos);
                cursor.line = line;
                cursor.column = column;
                true
            } else {
                false
            }
        }
        CursorMovement::Backward => {
            if cursor.char_pos > 0 {
                cursor.char_pos -= 1;
                let (line, column) = line_column_at(text, cursor.char_pos);
                cursor.line = line;
                cursor.column = column;
                true
            } else {
                false
            }
        }
        CursorMovement::Up => {
            if cursor.line > 0 {
                cursor.line -= 1;
                cursor.column = cursor.column.min(line_length(text, cursor.line));
                cursor.char_pos = char_position_at(text, cursor.line, cursor.column);
                true
            } else {
                false
            }
        }
        CursorMovement::Down => {
            if cursor.line + 1 < line_count(text) {
                cursor.line += 1;
                cursor.column = cursor.column.min(line_length(text, cursor.line));
                cursor.char_pos = char_position_at(text, cursor.line, cursor.column);
                true
            } else {
                false
            }
        }
        CursorMovement::LineStart => {
            cursor.column = 0;
            cursor.char_pos = char_position_at(text, cursor.line, 0);
            true
        }
        CursorMovement::LineEnd => {
            cursor.column = line_length(text, cursor.line);
            cursor.char_pos = char_position_at(text, cursor.line, cursor.column);
            true
        }
        CursorMovement::BufferStart => {
            *cursor = CursorPosition::new();
            true
        }
        CursorMovement::BufferEnd => {
            cursor.char_pos = text.chars().count();
            let (line, column) = line_column_at(text, cursor.char_pos);
            cursor.line = line;
            cursor.column = column;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_crosses_newline() {
        let text = "ab\ncd";
        let mut cursor = CursorPosition::new();
        for _ in 0..3 {
            assert!(move_cursor(&mut cursor, text, CursorMovement::Forward));
        }
        assert_eq!((cursor.line, cursor.column), (1, 0));
        assert_eq!(cursor.char_pos, 3);
    }

    #[test]
    fn vertical_motion_clamps_column() {
        let text = "long line\nab\nlonger line";
        let mut cursor = CursorPosition {
            char_pos: 7,
            line: 0,
            column: 7,
        };
        assert!(move_cursor(&mut cursor, text, CursorMovement::Down));
        assert_eq!((cursor.line, cursor.column), (1, 2));
        assert!(move_cursor(&mut cursor, text, CursorMovement::Down));
        assert_eq!((cursor.line, cursor.column), (2, 2));
    }

    #[test]
    fn movement_stops_at_boundaries() {
        let text = "a";
        let mut cursor = CursorPosition::new();
        assert!(!move_cursor(&mut cursor, text, CursorMovement::Backward));
        assert!(!move_cursor(&mut cursor, text, CursorMovement::Up));
        assert!(move_cursor(&mut cursor, text, CursorMovement::BufferEnd));
        assert!(!move_cursor(&mut cursor, text, CursorMovement::Forward));
    }

    #[test]
    fn line_helpers_count_characters_not_bytes() {
        let text = "あい\nうえお";
        assert_eq!(line_length(text, 0), 2);
        assert_eq!(line_length(text, 1), 3);
        assert_eq!(char_position_at(text, 1, 1), 4);
        assert_eq!(line_column_at(text, 4), (1, 1));
    }

    #[test]
    fn clamp_handles_shrunken_content() {
        let mut cursor = CursorPosition {
            char_pos: 100,
            line: 9,
            column: 9,
        };
        cursor.clamp_to("ab\nc");
        assert_eq!(cursor.char_pos, 4);
        assert_eq!((cursor.line, cursor.column), (1, 1));
    }
}
