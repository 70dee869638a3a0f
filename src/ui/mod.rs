//! TUI 描画モジュール
//!
//! ratatui によるレイアウトと描画。状態は一切持たず、毎フレーム
//! アプリ層から渡される [`Screen`] ビューモデルを描く。
//! 行・列は文字単位、画面上の X 座標だけ表示幅（全角 2 桁）で数える。

mod theme;

pub use theme::{ColorScheme, ComponentType, Theme, ThemeType};

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::editor::CursorPosition;
use crate::search::SearchState;

/// 行内ハイライト（列は文字単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub line: usize,
    pub start_column: usize,
    pub end_column: usize,
    pub is_current: bool,
}

/// 検索マッチを行内ハイライトへ変換する
///
/// マッチが改行をまたぐ場合は行ごとに分割する。
pub fn highlight_lines(text: &str, search: &SearchState) -> Vec<Highlight> {
    let mut highlights = Vec::new();
    if search.matches().is_empty() {
        return highlights;
    }

    // 各文字位置の (行, 列) を一度だけ前計算する
    let mut positions = Vec::with_capacity(text.chars().count() + 1);
    let mut line = 0usize;
    let mut column = 0usize;
    for ch in text.chars() {
        positions.push((line, column));
        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    positions.push((line, column));

    let current = search.current_index();
    for (idx, m) in search.matches().iter().enumerate() {
        let is_current = current == Some(idx);
        let (start_line, start_column) = positions[m.start.min(positions.len() - 1)];
        let (end_line, end_column) = positions[m.end.min(positions.len() - 1)];

        if start_line == end_line {
            highlights.push(Highlight {
                line: start_line,
                start_column,
                end_column,
                is_current,
            });
        } else {
            for l in start_line..=end_line {
                let (from, to) = if l == start_line {
                    (start_column, usize::MAX)
                } else if l == end_line {
                    (0, end_column)
                } else {
                    (0, usize::MAX)
                };
                highlights.push(Highlight {
                    line: l,
                    start_column: from,
                    end_column: to,
                    is_current,
                });
            }
        }
    }
    highlights
}

/// エコー行に出すメッセージの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoKind {
    Info,
    Warning,
    Error,
}

/// 画面最下段の 1 行
#[derive(Debug, Clone, PartialEq)]
pub enum EchoLine {
    Empty,
    Message { kind: EchoKind, text: String },
    Prompt { label: String, input: String },
}

/// サイドパネル（ファイル一覧・編集履歴）
#[derive(Debug, Clone, PartialEq)]
pub struct SidePanel {
    pub title: String,
    pub items: Vec<String>,
    pub selected: Option<usize>,
}

/// ステータスラインに出す情報
#[derive(Debug, Clone, PartialEq)]
pub struct StatusInfo {
    pub file_name: String,
    pub repo: String,
    pub modified: bool,
    pub validation: String,
    pub connected: bool,
}

/// 1 フレーム分のビューモデル
#[derive(Debug)]
pub struct Screen<'a> {
    pub content: &'a str,
    pub cursor: CursorPosition,
    pub highlights: Vec<Highlight>,
    pub panel: Option<SidePanel>,
    pub status: StatusInfo,
    pub echo: EchoLine,
}

/// 画面全体を描画する
pub fn draw(frame: &mut Frame<'_>, screen: &Screen<'_>, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let main = rows[0];
    let (editor_area, panel_area) = if screen.panel.is_some() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(32)])
            .split(main);
        (cols[0], Some(cols[1]))
    } else {
        (main, None)
    };

    render_editor(frame, editor_area, screen, theme);
    if let (Some(area), Some(panel)) = (panel_area, screen.panel.as_ref()) {
        render_panel(frame, area, panel, theme);
    }
    render_status(frame, rows[1], &screen.status, screen.cursor, theme);
    render_echo(frame, rows[2], &screen.echo, theme);
}

fn render_editor(frame: &mut Frame<'_>, area: Rect, screen: &Screen<'_>, theme: &Theme) {
    let text_lines: Vec<&str> = if screen.content.is_empty() {
        vec![""]
    } else {
        screen.content.split('\n').collect()
    };
    let total = text_lines.len();
    let gutter_width = total.to_string().len().max(3) + 1;

    // カーソル行が見えるようにスクロールする
    let height = area.height as usize;
    let offset = if height == 0 || screen.cursor.line < height {
        0
    } else {
        screen.cursor.line + 1 - height
    };

    let mut lines: Vec<Line<'static>> = Vec::with_capacity(height.min(total));
    for (idx, text) in text_lines.iter().enumerate().skip(offset).take(height) {
        let mut spans = vec![Span::styled(
            format!("{:>width$} ", idx + 1, width = gutter_width - 1),
            theme.style(&ComponentType::LineNumber),
        )];
        spans.extend(content_spans(text, idx, &screen.highlights, theme));
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).style(theme.style(&ComponentType::TextArea));
    frame.render_widget(paragraph, area);

    // 画面上のカーソル座標（全角は 2 桁で数える）
    let screen_line = screen.cursor.line.saturating_sub(offset);
    if screen_line < height {
        let prefix: String = text_lines
            .get(screen.cursor.line)
            .map(|l| l.chars().take(screen.cursor.column).collect())
            .unwrap_or_default();
        let x = area.x + gutter_width as u16 + prefix.width() as u16;
        let y = area.y + screen_line as u16;
        if x < area.x + area.width {
            frame.set_cursor_position((x, y));
        }
    }
}

fn content_spans(
    line_text: &str,
    line_idx: usize,
    highlights: &[Highlight],
    theme: &Theme,
) -> Vec<Span<'static>> {
    let mut on_line: Vec<&Highlight> = highlights.iter().filter(|h| h.line == line_idx).collect();
    if on_line.is_empty() {
        return vec![Span::raw(line_text.to_string())];
    }
    on_line.sort_by_key(|h| h.start_column);

    let line_len = line_text.chars().count();
    let mut spans = Vec::new();
    let mut cursor = 0usize;
    for highlight in on_line {
        let start = highlight.start_column.min(line_len);
        let end = highlight.end_column.min(line_len);
        if start > cursor {
            spans.push(Span::raw(substring_by_char(line_text, cursor, start)));
        }
        if end > start {
            let component = if highlight.is_current {
                ComponentType::SearchCurrent
            } else {
                ComponentType::SearchMatch
            };
            spans.push(Span::styled(
                substring_by_char(line_text, start, end),
                theme.style(&component),
            ));
        }
        cursor = cursor.max(end);
    }
    if cursor < line_len {
        spans.push(Span::raw(substring_by_char(line_text, cursor, line_len)));
    }
    spans
}

fn substring_by_char(text: &str, start: usize, end: usize) -> String {
    text.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}

fn render_panel(frame: &mut Frame<'_>, area: Rect, panel: &SidePanel, theme: &Theme) {
    let items: Vec<ListItem> = panel
        .items
        .iter()
        .map(|item| ListItem::new(item.clone()))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::LEFT)
                .title(panel.title.clone()),
        )
        .style(theme.style(&ComponentType::Panel))
        .highlight_style(theme.style(&ComponentType::PanelSelected));

    let mut state = ListState::default();
    state.select(panel.selected);
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_status(
    frame: &mut Frame<'_>,
    area: Rect,
    status: &StatusInfo,
    cursor: CursorPosition,
    theme: &Theme,
) {
    let modified = if status.modified { "*" } else { " " };
    let connection = if status.connected {
        status.repo.as_str()
    } else {
        "未接続"
    };
    let text = format!(
        " {}{}  {}  {}:{}  {}",
        modified,
        status.file_name,
        connection,
        cursor.line + 1,
        cursor.column + 1,
        status.validation,
    );
    let paragraph = Paragraph::new(text).style(theme.style(&ComponentType::StatusLine));
    frame.render_widget(paragraph, area);
}

fn render_echo(frame: &mut Frame<'_>, area: Rect, echo: &EchoLine, theme: &Theme) {
    let (text, style) = match echo {
        EchoLine::Empty => (String::new(), theme.default_style()),
        EchoLine::Message { kind, text } => {
            let component = match kind {
                EchoKind::Info => ComponentType::Info,
                EchoKind::Warning => ComponentType::Warning,
                EchoKind::Error => ComponentType::Error,
            };
            (text.clone(), theme.style(&component))
        }
        EchoLine::Prompt { label, input } => (
            format!("{label}: {input}"),
            theme.style(&ComponentType::Prompt),
        ),
    };
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, area);
}

/// 相対時刻の表示（履歴パネル用）
pub fn relative_time(now_ms: i64, then_ms: i64) -> String {
    let seconds = (now_ms - then_ms).max(0) / 1000;
    if seconds < 60 {
        "たった今".to_string()
    } else if seconds < 60 * 60 {
        format!("{}分前", seconds / 60)
    } else if seconds < 24 * 60 * 60 {
        format!("{}時間前", seconds / 3600)
    } else {
        format!("{}日前", seconds / 86_400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_time_bucketing() {
        let now = 10_000_000_000i64;
        assert_eq!(relative_time(now, now - 30 * 1000), "たった今");
        assert_eq!(relative_time(now, now - 5 * 60 * 1000), "5分前");
        assert_eq!(relative_time(now, now - 3 * 3600 * 1000), "3時間前");
        assert_eq!(relative_time(now, now - 2 * 86_400 * 1000), "2日前");
        // 未来のタイムスタンプは「たった今」に丸める
        assert_eq!(relative_time(now, now + 1000), "たった今");
    }

    #[test]
    fn highlights_map_to_line_columns() {
        let text = "key: a\nkey: b";
        let mut search = SearchState::new();
        search.update(text, "key");
        let highlights = highlight_lines(text, &search);
        assert_eq!(
            highlights,
            vec![
                Highlight {
                    line: 0,
                    start_column: 0,
                    end_column: 3,
                    is_current: true,
                },
                Highlight {
                    line: 1,
                    start_column: 0,
                    end_column: 3,
                    is_current: false,
                },
            ]
        );
    }

    #[test]
    fn highlight_split_across_newline() {
        let text = "ab\ncd";
        let mut search = SearchState::new();
        search.update(text, "b\nc");
        let highlights = highlight_lines(text, &search);
        assert_eq!(highlights.len(), 2);
        assert_eq!(highlights[0].line, 0);
        assert_eq!(highlights[0].start_column, 1);
        assert_eq!(highlights[1].line, 1);
        assert_eq!(highlights[1].end_column, 1);
    }

    #[test]
    fn no_query_means_no_highlights() {
        let search = SearchState::new();
        assert!(highlight_lines("abc", &search).is_empty());
    }
}
