//! ロギングシステム
//!
//! `log` ファサードの背後で stderr と状態ディレクトリ内のログファイルへ出力する。
//! 開発者向けの詳細ログが目的で、UI には一切描画しない。

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use log::{Level, LevelFilter, Metadata, Record};

/// stderr + 任意のファイルへ書き出すロガー
pub struct FileLogger {
    level: LevelFilter,
    output_stderr: bool,
    output_file: Option<Mutex<PathBuf>>,
}

impl FileLogger {
    /// デフォルト構築
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            output_stderr: true,
            output_file: None,
        }
    }

    /// 開発者向けロガー
    pub fn for_development() -> Self {
        Self::new(LevelFilter::Debug)
    }

    /// ファイル出力を設定
    pub fn with_file_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_file = Some(Mutex::new(path.into()));
        self
    }

    /// 標準エラー出力を無効化（TUI 動作中の画面崩れ防止）
    pub fn without_stderr(mut self) -> Self {
        self.output_stderr = false;
        self
    }

    /// グローバルロガーとして登録する
    pub fn install(self) -> std::result::Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    fn write_line(&self, message: &str) {
        if self.output_stderr {
            eprintln!("{}", message);
        }

        if let Some(path) = &self.output_file {
            if let Ok(path) = path.lock() {
                if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&*path) {
                    let _ = writeln!(file, "{}", message);
                }
            }
        }
    }
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let tag = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARNING",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };

        self.write_line(&format!("{}: {}: {}", tag, record.target(), record.args()));
    }

    fn flush(&self) {}
}
