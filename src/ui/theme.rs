//! テーマシステム
//!
//! カラー設定の管理とダーク / ライト / ハイコントラストの切り替え

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

/// テーマの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeType {
    Dark,
    Light,
    HighContrast,
}

impl ThemeType {
    /// 次のテーマへ巡回する
    pub fn next(self) -> Self {
        match self {
            ThemeType::Dark => ThemeType::Light,
            ThemeType::Light => ThemeType::HighContrast,
            ThemeType::HighContrast => ThemeType::Dark,
        }
    }

    /// 設定ファイルで使う識別子
    pub fn id(self) -> &'static str {
        match self {
            ThemeType::Dark => "dark",
            ThemeType::Light => "light",
            ThemeType::HighContrast => "high-contrast",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "dark" => Some(ThemeType::Dark),
            "light" => Some(ThemeType::Light),
            "high-contrast" => Some(ThemeType::HighContrast),
            _ => None,
        }
    }
}

/// UIコンポーネントの種類
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// テキストエリア
    TextArea,
    /// 行番号
    LineNumber,
    /// ステータスライン
    StatusLine,
    /// サイドパネル
    Panel,
    /// パネルの選択行
    PanelSelected,
    /// 検索マッチ
    SearchMatch,
    /// 現在の検索マッチ
    SearchCurrent,
    /// エラーメッセージ
    Error,
    /// 警告メッセージ
    Warning,
    /// 情報メッセージ
    Info,
    /// プロンプト
    Prompt,
}

/// カラー設定
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub foreground: Color,
    pub background: Color,
    pub modifiers: Modifier,
}

impl ColorScheme {
    pub fn new(foreground: Color, background: Color) -> Self {
        Self {
            foreground,
            background,
            modifiers: Modifier::empty(),
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers = modifier;
        self
    }

    pub fn to_style(&self) -> Style {
        Style::default()
            .fg(self.foreground)
            .bg(self.background)
            .add_modifier(self.modifiers)
    }
}

/// テーマ設定
#[derive(Debug, Clone)]
pub struct Theme {
    pub theme_type: ThemeType,
    colors: HashMap<ComponentType, ColorScheme>,
}

impl Theme {
    pub fn new(theme_type: ThemeType) -> Self {
        let mut theme = Self {
            theme_type,
            colors: HashMap::new(),
        };
        theme.set_default_colors();
        theme
    }

    /// 特定のコンポーネントのスタイルを取得
    pub fn style(&self, component: &ComponentType) -> Style {
        self.colors
            .get(component)
            .map(|cs| cs.to_style())
            .unwrap_or_else(|| self.default_style())
    }

    pub fn default_style(&self) -> Style {
        match self.theme_type {
            ThemeType::Light => Style::default().fg(Color::Black).bg(Color::White),
            ThemeType::Dark | ThemeType::HighContrast => {
                Style::default().fg(Color::White).bg(Color::Black)
            }
        }
    }

    fn set_default_colors(&mut self) {
        use ComponentType::*;
        match self.theme_type {
            ThemeType::Dark => {
                self.set(TextArea, ColorScheme::new(Color::White, Color::Black));
                self.set(LineNumber, ColorScheme::new(Color::DarkGray, Color::Black));
                self.set(StatusLine, ColorScheme::new(Color::Black, Color::Gray));
                self.set(Panel, ColorScheme::new(Color::Gray, Color::Black));
                self.set(
                    PanelSelected,
                    ColorScheme::new(Color::Black, Color::Cyan).with_modifier(Modifier::BOLD),
                );
                self.set(SearchMatch, ColorScheme::new(Color::White, Color::Rgb(0, 80, 80)));
                self.set(
                    SearchCurrent,
                    ColorScheme::new(Color::Black, Color::Cyan).with_modifier(Modifier::BOLD),
                );
                self.set(Error, ColorScheme::new(Color::Red, Color::Black));
                self.set(Warning, ColorScheme::new(Color::Yellow, Color::Black));
                self.set(Info, ColorScheme::new(Color::Green, Color::Black));
                self.set(Prompt, ColorScheme::new(Color::Cyan, Color::Black));
            }
            ThemeType::Light => {
                self.set(TextArea, ColorScheme::new(Color::Black, Color::White));
                self.set(LineNumber, ColorScheme::new(Color::Gray, Color::White));
                self.set(StatusLine, ColorScheme::new(Color::White, Color::DarkGray));
                self.set(Panel, ColorScheme::new(Color::DarkGray, Color::White));
                self.set(
                    PanelSelected,
                    ColorScheme::new(Color::White, Color::Blue).with_modifier(Modifier::BOLD),
                );
                self.set(SearchMatch, ColorScheme::new(Color::Black, Color::Rgb(180, 230, 230)));
                self.set(
                    SearchCurrent,
                    ColorScheme::new(Color::White, Color::Blue).with_modifier(Modifier::BOLD),
                );
                self.set(Error, ColorScheme::new(Color::Red, Color::White));
                self.set(Warning, ColorScheme::new(Color::Magenta, Color::White));
                self.set(Info, ColorScheme::new(Color::Green, Color::White));
                self.set(Prompt, ColorScheme::new(Color::Blue, Color::White));
            }
            ThemeType::HighContrast => {
                self.set(
                    TextArea,
                    ColorScheme::new(Color::White, Color::Black).with_modifier(Modifier::BOLD),
                );
                self.set(LineNumber, ColorScheme::new(Color::Yellow, Color::Black));
                self.set(
                    StatusLine,
                    ColorScheme::new(Color::Black, Color::Yellow).with_modifier(Modifier::BOLD),
                );
                self.set(Panel, ColorScheme::new(Color::White, Color::Black));
                self.set(
                    PanelSelected,
                    ColorScheme::new(Color::Black, Color::Yellow).with_modifier(Modifier::BOLD),
                );
                self.set(SearchMatch, ColorScheme::new(Color::Black, Color::White));
                self.set(
                    SearchCurrent,
                    ColorScheme::new(Color::Black, Color::Yellow).with_modifier(Modifier::BOLD),
                );
                self.set(
                    Error,
                    ColorScheme::new(Color::Red, Color::Black).with_modifier(Modifier::BOLD),
                );
                self.set(
                    Warning,
                    ColorScheme::new(Color::Yellow, Color::Black).with_modifier(Modifier::BOLD),
                );
                self.set(
                    Info,
                    ColorScheme::new(Color::White, Color::Black).with_modifier(Modifier::BOLD),
                );
                self.set(
                    Prompt,
                    ColorScheme::new(Color::White, Color::Black).with_modifier(Modifier::BOLD),
                );
            }
        }
    }

    fn set(&mut self, component: ComponentType, color_scheme: ColorScheme) {
        self.colors.insert(component, color_scheme);
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeType::Dark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_cycle_visits_all_variants() {
        let start = ThemeType::Dark;
        assert_eq!(start.next(), ThemeType::Light);
        assert_eq!(start.next().next(), ThemeType::HighContrast);
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn theme_ids_round_trip() {
        for theme in [ThemeType::Dark, ThemeType::Light, ThemeType::HighContrast] {
            assert_eq!(ThemeType::from_id(theme.id()), Some(theme));
        }
        assert_eq!(ThemeType::from_id("sepia"), None);
    }

    #[test]
    fn every_component_has_a_style() {
        let theme = Theme::new(ThemeType::Light);
        // 未設定コンポーネントでもデフォルトスタイルへフォールバック
        let style = theme.style(&ComponentType::StatusLine);
        assert!(style.fg.is_some());
    }
}
