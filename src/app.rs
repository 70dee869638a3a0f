//! メインアプリケーション構造体
//!
//! 全コンポーネント（エディタ・履歴・検索・GitHub ゲートウェイ・ストレージ）を
//! 明示的に束ね、単一スレッドのイベントループを回す。すべての部品の生存期間は
//! この構造体が管理し、グローバル状態は持たない。

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::{self, Settings, AUTO_SAVE_DELAY_MS, VALIDATE_DEBOUNCE_MS};
use crate::convert::{self, ExportFormat};
use crate::editor::{AutoSaveBuffer, CursorMovement, Debouncer, EditorState};
use crate::error::{GithubError, Result, TsukiError, UiError};
use crate::file;
use crate::github::{CredentialStore, FileSummary, GithubClient};
use crate::history::HistoryManager;
use crate::search::SearchState;
use crate::storage::{now_millis, StorageAdapter};
use crate::ui::{self, EchoKind, EchoLine, Screen, SidePanel, StatusInfo, Theme, ThemeType};
use crate::validate;

const POLL_INTERVAL_MS: u64 = 50;

/// 入力プロンプトの種類
#[derive(Debug, Clone, PartialEq, Eq)]
enum PromptKind {
    /// アクセストークン入力
    Token,
    /// 検索クエリ入力
    Search,
    /// コミットメッセージ入力
    CommitMessage,
    /// リポジトリ座標（owner/repo）入力
    Repository,
    /// ローカル読み込みパス
    ImportPath,
    /// ローカル書き出しパス（拡張子で形式を決める）
    ExportPath,
    /// 履歴エクスポートの書き出し先
    HistoryExportPath,
    /// 履歴インポートの読み込み元
    HistoryImportPath,
    /// 自動保存バッファからの復元確認（y / n）
    RecoveryRestore,
}

/// サイドパネルの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanelKind {
    Files,
    History,
}

/// 入力のフォーカス先
#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Edit,
    Prompt { kind: PromptKind, input: String },
    Panel(PanelKind),
}

/// メインアプリケーション構造体
pub struct App {
    running: bool,
    storage: StorageAdapter,
    settings: Settings,
    theme: Theme,
    editor: EditorState,
    history: HistoryManager,
    search: SearchState,
    client: GithubClient,
    credentials: CredentialStore,
    autosave: AutoSaveBuffer,
    validate_debounce: Debouncer,
    autosave_debounce: Debouncer,
    validation_status: String,
    mode: Mode,
    echo: EchoLine,
    /// 開いているリモートファイル（名前と直近の SHA）
    current_file: Option<(String, String)>,
    file_list: Vec<FileSummary>,
    panel_selected: usize,
}

impl App {
    /// 永続状態を復元してアプリケーションを初期化する
    pub fn new() -> Result<Self> {
        let storage = StorageAdapter::open_default()?;
        Self::with_storage(storage)
    }

    /// 指定ストレージで初期化する（テスト用）
    pub fn with_storage(storage: StorageAdapter) -> Result<Self> {
        let settings = Settings::load(&storage);

        let theme_type = storage
            .get::<String>(config::keys::THEME)
            .and_then(|id| ThemeType::from_id(&id))
            .unwrap_or(ThemeType::Dark);

        let credentials = CredentialStore::new(storage.clone());
        let mut client = GithubClient::new(&settings.owner, &settings.repo, &settings.branch);
        client.set_token(credentials.load());

        let history = HistoryManager::new(storage.clone(), settings.history_limit);
        let autosave = AutoSaveBuffer::new(storage.clone());

        // 起動時の内容: 履歴の現在版、なければ既定ドキュメント
        let initial = history
            .history()
            .current()
            .map(|snapshot| snapshot.content.clone())
            .unwrap_or_else(validate::schema::default_document);
        let editor = EditorState::new(&initial);

        let mut app = Self {
            running: true,
            storage,
            settings,
            theme: Theme::new(theme_type),
            editor,
            history,
            search: SearchState::new(),
            client,
            credentials,
            autosave,
            validate_debounce: Debouncer::new(Duration::from_millis(VALIDATE_DEBOUNCE_MS)),
            autosave_debounce: Debouncer::new(Duration::from_millis(AUTO_SAVE_DELAY_MS)),
            validation_status: String::new(),
            mode: Mode::Edit,
            echo: EchoLine::Empty,
            current_file: None,
            file_list: Vec::new(),
            panel_selected: 0,
        };
        app.refresh_validation();

        // 24 時間以内の自動保存があれば復元を提案する
        if let Some(candidate) = app.autosave.recent() {
            if candidate.content != app.editor.content() {
                let when = ui::relative_time(now_millis(), candidate.saved_at);
                app.mode = Mode::Prompt {
                    kind: PromptKind::RecoveryRestore,
                    input: String::new(),
                };
                app.echo = EchoLine::Message {
                    kind: EchoKind::Warning,
                    text: format!("{when}の未保存の変更があります。復元しますか? (y/n)"),
                };
            }
        }

        // 前回終了時のビューを復元する（復元の確認が優先）
        if app.mode == Mode::Edit {
            match app
                .storage
                .get::<String>(config::keys::VIEW_MODE)
                .as_deref()
            {
                Some("history") if !app.history.is_empty() => {
                    app.panel_selected = app.history.cursor().unwrap_or(0);
                    app.mode = Mode::Panel(PanelKind::History);
                }
                Some("files") if app.client.has_token() => app.open_file_panel(),
                _ => {}
            }
        }

        Ok(app)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn shutdown(&mut self) {
        self.running = false;
    }

    /// メインイベントループを実行する
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        while self.running {
            terminal
                .draw(|frame| {
                    let screen = self.build_screen();
                    ui::draw(frame, &screen, &self.theme);
                })
                .map_err(|e| {
                    TsukiError::Ui(UiError::RenderingFailed {
                        component: e.to_string(),
                    })
                })?;

            if event::poll(Duration::from_millis(POLL_INTERVAL_MS)).map_err(io_to_ui)? {
                if let Event::Key(key) = event::read().map_err(io_to_ui)? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
            self.tick();
        }
        Ok(())
    }

    /// デバウンスタイマーの発火を処理する
    fn tick(&mut self) {
        if self.validate_debounce.poll() {
            self.refresh_validation();
            self.history.record(self.editor.content());
        }
        if self.autosave_debounce.poll() {
            self.autosave.save(self.editor.content());
        }
    }

    fn build_screen(&self) -> Screen<'_> {
        let panel = self.panel_view();
        let echo = match &self.mode {
            Mode::Prompt { kind, input } => {
                let shown = if *kind == PromptKind::Token {
                    "*".repeat(input.chars().count())
                } else {
                    input.clone()
                };
                EchoLine::Prompt {
                    label: prompt_label(kind).to_string(),
                    input: shown,
                }
            }
            _ => self.echo.clone(),
        };

        Screen {
            content: self.editor.content(),
            cursor: self.editor.cursor(),
            highlights: ui::highlight_lines(self.editor.content(), &self.search),
            panel,
            status: StatusInfo {
                file_name: self
                    .current_file
                    .as_ref()
                    .map(|(name, _)| name.clone())
                    .unwrap_or_else(|| "(新規)".to_string()),
                repo: self.client.repo_slug(),
                modified: self.editor.is_modified(),
                validation: self.validation_status.clone(),
                connected: self.client.has_token(),
            },
            echo,
        }
    }

    /// JSON 構文と設定スキーマを検証し、ステータスを更新する
    fn refresh_validation(&mut self) {
        let content = self.editor.content();
        match validate::validate(content) {
            validate::ValidationResult::Valid => {
                match validate::schema::validate_config(content) {
                    Ok(config) => {
                        self.validation_status = format!("OK ({} サイト)", config.sites.len());
                    }
                    Err(err) => {
                        self.validation_status = format!("スキーマ: {err}");
                    }
                }
            }
            validate::ValidationResult::Invalid { line, column, .. } => {
                self.validation_status = match (line, column) {
                    (Some(line), Some(column)) => format!("JSON エラー {line}:{column}"),
                    _ => "JSON エラー".to_string(),
                };
            }
        }
    }

    fn info(&mut self, text: impl Into<String>) {
        self.echo = EchoLine::Message {
            kind: EchoKind::Info,
            text: text.into(),
        };
    }

    fn warn(&mut self, text: impl Into<String>) {
        self.echo = EchoLine::Message {
            kind: EchoKind::Warning,
            text: text.into(),
        };
    }

    fn error(&mut self, text: impl Into<String>) {
        self.echo = EchoLine::Message {
            kind: EchoKind::Error,
            text: text.into(),
        };
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.mode.clone() {
            Mode::Edit => self.handle_edit_key(key),
            Mode::Prompt { kind, input } => self.handle_prompt_key(key, kind, input),
            Mode::Panel(kind) => self.handle_panel_key(key, kind),
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match (ctrl, key.code) {
            (true, KeyCode::Char('q')) => self.running = false,
            (true, KeyCode::Char('s')) => self.begin_save(),
            (true, KeyCode::Char('z')) => self.undo(),
            (true, KeyCode::Char('y')) => self.redo(),
            (true, KeyCode::Char('f')) => self.open_prompt(PromptKind::Search),
            (true, KeyCode::Char('n')) => self.search_next(),
            (true, KeyCode::Char('p')) => self.search_previous(),
            (true, KeyCode::Char('o')) => self.open_file_panel(),
            (true, KeyCode::Char('h')) => self.open_history_panel(),
            (true, KeyCode::Char('g')) => self.open_prompt(PromptKind::Token),
            (true, KeyCode::Char('b')) => self.open_prompt(PromptKind::Repository),
            (true, KeyCode::Char('t')) => self.cycle_theme(),
            (true, KeyCode::Char('l')) => self.format_document(),
            (true, KeyCode::Char('j')) => self.compress_document(),
            (true, KeyCode::Char('e')) => self.open_prompt(PromptKind::ExportPath),
            (true, KeyCode::Char('r')) => self.open_prompt(PromptKind::ImportPath),
            (false, KeyCode::Char(ch)) => self.edit(|editor| editor.insert_char(ch)),
            (false, KeyCode::Enter) => self.edit(EditorState::insert_newline),
            (false, KeyCode::Backspace) => self.edit(|editor| {
                editor.backspace();
            }),
            (false, KeyCode::Delete) => self.edit(|editor| {
                editor.delete_forward();
            }),
            (false, KeyCode::Left) => {
                self.editor.move_cursor(CursorMovement::Backward);
            }
            (false, KeyCode::Right) => {
                self.editor.move_cursor(CursorMovement::Forward);
            }
            (false, KeyCode::Up) => {
                self.editor.move_cursor(CursorMovement::Up);
            }
            (false, KeyCode::Down) => {
                self.editor.move_cursor(CursorMovement::Down);
            }
            (false, KeyCode::Home) => {
                self.editor.move_cursor(CursorMovement::LineStart);
            }
            (false, KeyCode::End) => {
                self.editor.move_cursor(CursorMovement::LineEnd);
            }
            (false, KeyCode::PageUp) => {
                self.editor.move_cursor(CursorMovement::BufferStart);
            }
            (false, KeyCode::PageDown) => {
                self.editor.move_cursor(CursorMovement::BufferEnd);
            }
            (false, KeyCode::Esc) => {
                self.search.clear();
                self.echo = EchoLine::Empty;
            }
            _ => {}
        }
    }

    /// 編集操作を実行し、検証と自動保存を再スケジュールする
    fn edit(&mut self, operation: impl FnOnce(&mut EditorState)) {
        operation(&mut self.editor);
        let query = self.search.query().to_string();
        self.search.update(self.editor.content(), &query);
        self.validate_debounce.schedule();
        self.autosave_debounce.schedule();
    }

    fn undo(&mut self) {
        match self.history.undo() {
            Some(content) => {
                self.editor.replace_content(&content);
                self.refresh_validation();
                self.info("元に戻しました");
            }
            None => self.warn("これ以上戻れません"),
        }
    }

    fn redo(&mut self) {
        match self.history.redo() {
            Some(content) => {
                self.editor.replace_content(&content);
                self.refresh_validation();
                self.info("やり直しました");
            }
            None => self.warn("これ以上やり直せません"),
        }
    }

    fn cycle_theme(&mut self) {
        let next = self.theme.theme_type.next();
        self.theme = Theme::new(next);
        if let Err(err) = self.storage.set(config::keys::THEME, &next.id()) {
            log::warn!("failed to persist theme: {err}");
        }
        self.info(format!("テーマ: {}", next.id()));
    }

    fn format_document(&mut self) {
        match convert::format_json(self.editor.content(), self.settings.indent_width) {
            Ok(formatted) => {
                self.editor.replace_content(&formatted);
                self.edit(|_| {});
                self.info("整形しました");
            }
            Err(err) => self.error(err.to_string()),
        }
    }

    fn compress_document(&mut self) {
        match convert::compress_json(self.editor.content()) {
            Ok(compressed) => {
                self.editor.replace_content(&compressed);
                self.edit(|_| {});
                self.info("圧縮しました");
            }
            Err(err) => self.error(err.to_string()),
        }
    }

    // --- 検索 ---

    fn search_next(&mut self) {
        if let Some(found) = self.search.next() {
            self.editor.move_to_char(found.start);
            self.echo_search_position();
        }
    }

    fn search_previous(&mut self) {
        if let Some(found) = self.search.previous() {
            self.editor.move_to_char(found.start);
            self.echo_search_position();
        }
    }

    fn echo_search_position(&mut self) {
        if let Some(idx) = self.search.current_index() {
            let total = self.search.matches().len();
            self.info(format!("{} / {total} 件", idx + 1));
        }
    }

    // --- GitHub 連携 ---

    fn open_file_panel(&mut self) {
        match self.client.list_json_files() {
            Ok(files) => {
                if files.is_empty() {
                    self.warn("リポジトリ直下に JSON ファイルがありません");
                    return;
                }
                self.file_list = files;
                self.panel_selected = 0;
                self.mode = Mode::Panel(PanelKind::Files);
                self.persist_view_mode("files");
            }
            Err(err) => self.handle_github_error(err),
        }
    }

    fn open_history_panel(&mut self) {
        if self.history.is_empty() {
            self.warn("編集履歴がまだありません");
            return;
        }
        self.panel_selected = self.history.cursor().unwrap_or(0);
        self.mode = Mode::Panel(PanelKind::History);
        self.persist_view_mode("history");
    }

    fn persist_view_mode(&self, mode: &str) {
        if let Err(err) = self.storage.set(config::keys::VIEW_MODE, &mode) {
            log::warn!("failed to persist view mode: {err}");
        }
    }

    fn begin_save(&mut self) {
        if !self.client.has_token() {
            self.warn("未接続です。Ctrl+G でトークンを設定してください");
            return;
        }
        self.refresh_validation();
        if let Some(report) = validate::diagnose(self.editor.content()) {
            log::info!("save rejected:\n{report}");
            self.error("JSON が不正なため保存できません");
            return;
        }
        if let Err(err) = validate::schema::validate_config(self.editor.content()) {
            log::info!("save rejected: {err}");
            self.error(format!("保存できません: {err}"));
            return;
        }
        self.open_prompt(PromptKind::CommitMessage);
    }

    fn save_to_github(&mut self, message: &str) {
        let Some((path, sha)) = self.current_file.clone() else {
            self.warn("保存先ファイルがありません。Ctrl+O で開いてください");
            return;
        };
        let message = if message.trim().is_empty() {
            format!("update {path}")
        } else {
            message.to_string()
        };

        match self
            .client
            .put_file(&path, self.editor.content(), &message, Some(&sha))
        {
            Ok(result) => {
                self.current_file = Some((path, result.content_sha));
                self.editor.mark_saved();
                self.autosave.clear();
                self.info(format!(
                    "保存しました ({}, {})",
                    &result.commit_sha[..result.commit_sha.len().min(7)],
                    file::format_size(result.size),
                ));
            }
            Err(err) => self.handle_github_error(err),
        }
    }

    fn load_file(&mut self, index: usize) {
        let Some(summary) = self.file_list.get(index).cloned() else {
            return;
        };
        match self.client.get_file(&summary.path) {
            Ok(remote) => {
                self.editor.load_content(&remote.content);
                self.current_file = Some((remote.path, remote.sha));
                self.history.record(self.editor.content());
                self.refresh_validation();
                self.info(format!(
                    "{} を開きました ({})",
                    remote.name,
                    file::format_size(remote.size),
                ));
            }
            Err(err) => self.handle_github_error(err),
        }
    }

    fn connect(&mut self, token: &str) {
        match self.client.validate_token(token) {
            Ok(login) => {
                self.credentials.store(token);
                self.client.set_token(Some(token.to_string()));
                match self.client.rate_limit() {
                    Ok(limit) => self.info(format!(
                        "{login} として接続しました (API 残り {}/{})",
                        limit.remaining, limit.limit,
                    )),
                    Err(_) => self.info(format!("{login} として接続しました")),
                }
            }
            Err(err) => self.handle_github_error(err),
        }
    }

    /// リポジトリ座標を更新する（`owner/repo` または `owner/repo@branch`）
    fn set_repository(&mut self, input: &str) {
        let Some((owner, rest)) = input.trim().split_once('/') else {
            self.warn("owner/repo の形式で入力してください");
            return;
        };
        let (repo, branch) = match rest.split_once('@') {
            Some((repo, branch)) if !branch.is_empty() => (repo, branch.to_string()),
            _ => (rest, self.settings.branch.clone()),
        };
        if owner.is_empty() || repo.is_empty() {
            self.warn("owner/repo の形式で入力してください");
            return;
        }

        self.settings.owner = owner.to_string();
        self.settings.repo = repo.to_string();
        self.settings.branch = branch;
        self.settings.save(&self.storage);

        let mut client = GithubClient::new(
            &self.settings.owner,
            &self.settings.repo,
            &self.settings.branch,
        );
        client.set_token(self.credentials.load());
        self.client = client;
        self.file_list.clear();
        self.current_file = None;
        self.info(format!("リポジトリ: {}", self.client.repo_slug()));
    }

    /// 認証エラー時は保存済みトークンを破棄する
    fn handle_github_error(&mut self, err: GithubError) {
        if crate::github::is_auth_failure(&err) {
            self.credentials.clear();
            self.client.set_token(None);
        }
        self.error(err.to_string());
    }

    // --- ローカル入出力 ---

    fn import_from(&mut self, raw_path: &str) {
        let path = file::expand_path(raw_path);
        match file::import_text(&path) {
            Ok(content) => {
                self.editor.replace_content(&content);
                self.edit(|_| {});
                self.info(format!("{} を読み込みました", path.display()));
            }
            Err(err) => self.error(err.to_string()),
        }
    }

    fn export_to(&mut self, raw_path: &str) {
        let path = file::expand_path(raw_path);
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(format_for_extension)
            .unwrap_or(ExportFormat::Json);

        let result = match format {
            ExportFormat::Json => {
                convert::format_json(self.editor.content(), self.settings.indent_width).map(
                    |content| crate::convert::ConvertedDocument {
                        format: ExportFormat::Json,
                        content,
                    },
                )
            }
            ExportFormat::Xml => convert::to_xml(self.editor.content()),
            ExportFormat::Csv => convert::to_csv(self.editor.content()),
            ExportFormat::Yaml => convert::to_yaml(self.editor.content()),
        };

        match result {
            Ok(document) => match file::export_text(&path, &document.content) {
                Ok(()) => self.info(format!("{} へ書き出しました", path.display())),
                Err(err) => self.error(err.to_string()),
            },
            Err(err) => self.error(err.to_string()),
        }
    }

    // --- プロンプト ---

    fn open_prompt(&mut self, kind: PromptKind) {
        let input = match kind {
            PromptKind::Search => self.search.query().to_string(),
            PromptKind::Repository if !self.settings.owner.is_empty() => self.client.repo_slug(),
            _ => String::new(),
        };
        self.mode = Mode::Prompt { kind, input };
    }

    fn handle_prompt_key(&mut self, key: KeyEvent, kind: PromptKind, mut input: String) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Edit;
                if kind == PromptKind::RecoveryRestore {
                    self.autosave.clear();
                }
                self.echo = EchoLine::Empty;
            }
            KeyCode::Enter => {
                self.mode = Mode::Edit;
                self.echo = EchoLine::Empty;
                self.submit_prompt(kind, &input);
            }
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::Prompt { kind, input };
            }
            KeyCode::Char(ch) => {
                // 検索はインクリメンタルに反映する
                input.push(ch);
                if kind == PromptKind::Search {
                    self.search.update(self.editor.content(), &input);
                }
                self.mode = Mode::Prompt { kind, input };
            }
            _ => {
                self.mode = Mode::Prompt { kind, input };
            }
        }
    }

    fn submit_prompt(&mut self, kind: PromptKind, input: &str) {
        match kind {
            PromptKind::Token => {
                if input.is_empty() {
                    self.credentials.clear();
                    self.client.set_token(None);
                    self.info("トークンを破棄しました");
                } else {
                    self.connect(input);
                }
            }
            PromptKind::Search => {
                self.search.update(self.editor.content(), input);
                if let Some(found) = self.search.current_match() {
                    self.editor.move_to_char(found.start);
                    self.echo_search_position();
                } else if !input.is_empty() {
                    self.warn(format!("「{input}」は見つかりません"));
                }
            }
            PromptKind::Repository => self.set_repository(input),
            PromptKind::CommitMessage => self.save_to_github(input),
            PromptKind::ImportPath => self.import_from(input),
            PromptKind::ExportPath => self.export_to(input),
            PromptKind::HistoryExportPath => self.export_history_to(input),
            PromptKind::HistoryImportPath => self.import_history_from(input),
            PromptKind::RecoveryRestore => {
                if input.eq_ignore_ascii_case("y") {
                    if let Some(candidate) = self.autosave.recent() {
                        self.editor.replace_content(&candidate.content);
                        self.refresh_validation();
                        self.info("未保存の変更を復元しました");
                    }
                } else {
                    self.autosave.clear();
                    self.info("復元せずに続行します");
                }
            }
        }
    }

    // --- パネル ---

    fn panel_len(&self, kind: PanelKind) -> usize {
        match kind {
            PanelKind::Files => self.file_list.len(),
            PanelKind::History => self.history.len(),
        }
    }

    fn handle_panel_key(&mut self, key: KeyEvent, kind: PanelKind) {
        let len = self.panel_len(kind);
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Edit;
                self.persist_view_mode("none");
            }
            KeyCode::Up => {
                if self.panel_selected > 0 {
                    self.panel_selected -= 1;
                }
            }
            KeyCode::Down => {
                if len > 0 && self.panel_selected + 1 < len {
                    self.panel_selected += 1;
                }
            }
            KeyCode::Enter => {
                let selected = self.panel_selected;
                self.mode = Mode::Edit;
                self.persist_view_mode("none");
                match kind {
                    PanelKind::Files => self.load_file(selected),
                    PanelKind::History => {
                        if let Some(content) = self.history.jump_to(selected) {
                            self.editor.replace_content(&content);
                            self.refresh_validation();
                            self.info(format!("バージョン {} に移動しました", selected + 1));
                        }
                    }
                }
            }
            KeyCode::Char('e') if kind == PanelKind::History => {
                self.open_prompt(PromptKind::HistoryExportPath);
            }
            KeyCode::Char('i') if kind == PanelKind::History => {
                self.open_prompt(PromptKind::HistoryImportPath);
            }
            KeyCode::Char('d') if kind == PanelKind::History => {
                self.history.clear();
                self.mode = Mode::Edit;
                self.info("編集履歴を消去しました");
            }
            _ => {}
        }
    }

    fn export_history_to(&mut self, raw_path: &str) {
        let path = file::expand_path(raw_path);
        let export = self.history.export();
        match serde_json::to_string_pretty(&export) {
            Ok(json) => match file::export_text(&path, &json) {
                Ok(()) => self.info(format!(
                    "履歴 {} 件を {} へ書き出しました",
                    export.total,
                    path.display(),
                )),
                Err(err) => self.error(err.to_string()),
            },
            Err(err) => self.error(err.to_string()),
        }
    }

    fn import_history_from(&mut self, raw_path: &str) {
        let path = file::expand_path(raw_path);
        match file::import_text(&path) {
            Ok(raw) => match self.history.import_json(&raw) {
                Ok(()) => {
                    if let Some(content) = self
                        .history
                        .history()
                        .current()
                        .map(|snapshot| snapshot.content.clone())
                    {
                        self.editor.replace_content(&content);
                        self.refresh_validation();
                    }
                    self.info(format!("履歴 {} 件を取り込みました", self.history.len()));
                }
                Err(err) => self.error(err.to_string()),
            },
            Err(err) => self.error(err.to_string()),
        }
    }

    /// 現在のパネル内容を描画用に組み立てる
    fn panel_view(&self) -> Option<SidePanel> {
        let Mode::Panel(kind) = &self.mode else {
            return None;
        };
        match *kind {
            PanelKind::Files => Some(SidePanel {
                title: "ファイル".to_string(),
                items: self
                    .file_list
                    .iter()
                    .map(|f| format!("{} ({})", f.name, file::format_size(f.size)))
                    .collect(),
                selected: Some(self.panel_selected.min(self.file_list.len().saturating_sub(1))),
            }),
            PanelKind::History => {
                let now = now_millis();
                Some(SidePanel {
                    title: "編集履歴".to_string(),
                    items: self
                        .history
                        .history()
                        .iter()
                        .enumerate()
                        .map(|(idx, snapshot)| {
                            let marker = if self.history.cursor() == Some(idx) {
                                "●"
                            } else {
                                " "
                            };
                            format!(
                                "{marker} v{} {} ({})",
                                idx + 1,
                                ui::relative_time(now, snapshot.timestamp),
                                file::format_size(snapshot.content.len() as u64),
                            )
                        })
                        .collect(),
                    selected: Some(self.panel_selected.min(self.history.len().saturating_sub(1))),
                })
            }
        }
    }
}

fn prompt_label(kind: &PromptKind) -> &'static str {
    match kind {
        PromptKind::Token => "アクセストークン",
        PromptKind::Repository => "リポジトリ (owner/repo)",
        PromptKind::Search => "検索",
        PromptKind::CommitMessage => "コミットメッセージ",
        PromptKind::ImportPath => "読み込むファイル",
        PromptKind::ExportPath => "書き出し先",
        PromptKind::HistoryExportPath => "履歴の書き出し先",
        PromptKind::HistoryImportPath => "履歴の読み込み元",
        PromptKind::RecoveryRestore => "復元しますか? (y/n)",
    }
}

fn format_for_extension(ext: &str) -> Option<ExportFormat> {
    match ext.to_lowercase().as_str() {
        "json" => Some(ExportFormat::Json),
        "xml" => Some(ExportFormat::Xml),
        "csv" => Some(ExportFormat::Csv),
        "yaml" | "yml" => Some(ExportFormat::Yaml),
        _ => None,
    }
}

fn io_to_ui(err: io::Error) -> TsukiError {
    TsukiError::Ui(UiError::TerminalInit {
        message: err.to_string(),
    })
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().map_err(io_to_ui)?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen).map_err(io_to_ui)?;
    Terminal::new(CrosstermBackend::new(stdout)).map_err(io_to_ui)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().map_err(io_to_ui)?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen).map_err(io_to_ui)?;
    terminal.show_cursor().map_err(io_to_ui)?;
    Ok(())
}
