//! 検索モジュール
//!
//! ドキュメント内の部分文字列マッチ（大文字小文字無視）を列挙し、
//! 循環する次／前ナビゲーションを提供する。インデックス計算のみで、
//! スクロールやハイライトの描画は呼び出し側の責務。

/// 1 件のマッチ（文字インデックスの半開区間）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    pub start: usize,
    pub end: usize,
}

/// すべてのマッチを返す
///
/// 大文字小文字を無視したリテラルスキャン。マッチ後は同じスパンの途中から
/// 再開しない（非重複スキャン）。空のクエリ・空のテキストは空の結果。
pub fn find_matches(text: &str, query: &str) -> Vec<SearchMatch> {
    if text.is_empty() || query.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = query.chars().collect();
    if pattern.len() > chars.len() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    let mut start = 0usize;
    while start + pattern.len() <= chars.len() {
        let hit = pattern
            .iter()
            .enumerate()
            .all(|(offset, pat_ch)| chars_equal(chars[start + offset], *pat_ch));
        if hit {
            matches.push(SearchMatch {
                start,
                end: start + pattern.len(),
            });
            start += pattern.len();
        } else {
            start += 1;
        }
    }
    matches
}

// Unicode ケースフォールディング（簡易）
fn chars_equal(a: char, b: char) -> bool {
    if a == b {
        return true;
    }
    a.to_lowercase().eq(b.to_lowercase())
}

/// 検索状態
///
/// マッチ列はクエリ変更のたびに丸ごと再計算する（差分更新しない）。
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    query: String,
    matches: Vec<SearchMatch>,
    current: Option<usize>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// 現在のマッチ
    pub fn current_match(&self) -> Option<SearchMatch> {
        self.current.and_then(|idx| self.matches.get(idx).copied())
    }

    /// クエリを設定してマッチ列を再計算する
    pub fn update(&mut self, text: &str, query: &str) {
        self.query = query.to_string();
        self.matches = find_matches(text, query);
        self.current = if self.matches.is_empty() { None } else { Some(0) };
    }

    /// 次のマッチへ（末尾からは先頭へ折り返す）
    pub fn next(&mut self) -> Option<SearchMatch> {
        if self.matches.is_empty() {
            self.current = None;
            return None;
        }
        let next = match self.current {
            Some(idx) => (idx + 1) % self.matches.len(),
            None => 0,
        };
        self.current = Some(next);
        self.matches.get(next).copied()
    }

    /// 前のマッチへ（先頭からは末尾へ折り返す）
    pub fn previous(&mut self) -> Option<SearchMatch> {
        if self.matches.is_empty() {
            self.current = None;
            return None;
        }
        let len = self.matches.len();
        let prev = match self.current {
            Some(idx) => (idx + len - 1) % len,
            None => len - 1,
        };
        self.current = Some(prev);
        self.matches.get(prev).copied()
    }

    /// 状態を破棄する
    pub fn clear(&mut self) {
        self.query.clear();
        self.matches.clear();
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_non_overlapping_spans() {
        let matches = find_matches("abcabcabc", "abc");
        assert_eq!(
            matches,
            vec![
                SearchMatch { start: 0, end: 3 },
                SearchMatch { start: 3, end: 6 },
                SearchMatch { start: 6, end: 9 },
            ]
        );
    }

    #[test]
    fn overlapping_candidates_are_skipped() {
        // "aaaa" 内の "aa" は 2 件（0..2, 2..4）。重複スキャンなら 3 件になる
        assert_eq!(find_matches("aaaa", "aa").len(), 2);
    }

    #[test]
    fn search_is_case_insensitive() {
        let matches = find_matches("Hello HELLO hello", "hello");
        assert_eq!(matches.len(), 3);
    }

    #[test]
    fn empty_inputs_yield_no_matches() {
        assert!(find_matches("", "abc").is_empty());
        assert!(find_matches("abc", "").is_empty());
    }

    #[test]
    fn next_wraps_around() {
        let mut state = SearchState::new();
        state.update("abcabcabc", "abc");
        assert_eq!(state.current_index(), Some(0));

        state.next();
        state.next();
        assert_eq!(state.current_index(), Some(2));
        state.next();
        assert_eq!(state.current_index(), Some(0));
    }

    #[test]
    fn previous_wraps_to_end() {
        let mut state = SearchState::new();
        state.update("abcabc", "abc");
        state.previous();
        assert_eq!(state.current_index(), Some(1));
    }

    #[test]
    fn no_matches_keeps_index_none() {
        let mut state = SearchState::new();
        state.update("abc", "zzz");
        assert_eq!(state.current_index(), None);
        assert_eq!(state.next(), None);
        assert_eq!(state.previous(), None);
    }

    #[test]
    fn multibyte_text_uses_char_indices() {
        let matches = find_matches("月と月", "月");
        assert_eq!(
            matches,
            vec![
                SearchMatch { start: 0, end: 1 },
                SearchMatch { start: 2, end: 3 },
            ]
        );
    }
}
