//! エラーハンドリングシステム
//!
//! tsuki 全体で使用される統一されたエラー型を定義する。
//! 各コンポーネントは失敗を Result で返し、UI 境界を越える panic は発生させない。

use thiserror::Error;

/// アプリケーション全体のエラー型
#[derive(Error, Debug)]
pub enum TsukiError {
    /// ローカルストレージエラー
    #[error("Storage operation failed")]
    Storage(#[from] StorageError),

    /// GitHub ゲートウェイエラー
    #[error("GitHub request failed")]
    Github(#[from] GithubError),

    /// 履歴操作エラー
    #[error("History operation failed")]
    History(#[from] HistoryError),

    /// 変換エラー
    #[error("Conversion failed")]
    Convert(#[from] ConvertError),

    /// ファイル操作エラー
    #[error("File operation failed")]
    File(#[from] FileError),

    /// UI 操作エラー
    #[error("UI operation failed")]
    Ui(#[from] UiError),

    /// アプリケーション論理エラー
    #[error("Application error: {0}")]
    Application(String),
}

/// ローカルストレージ固有のエラー
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Corrupt entry for key: {key}")]
    Corrupt { key: String },

    #[error("Serialization failed: {message}")]
    Serialize { message: String },

    #[error("No writable state directory")]
    NoStateDir,
}

/// GitHub API 固有のエラー
///
/// HTTP ステータスに基づくエラー分類。
/// Auth は呼び出し側で保存済みトークンの破棄を伴う。
#[derive(Error, Debug)]
pub enum GithubError {
    #[error("Authentication failed (token rejected)")]
    Auth,

    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Concurrent modification detected: {path} (refresh and retry)")]
    Conflict { path: String },

    #[error("Remote validation failed: {message}")]
    Validation { message: String },

    #[error("API rate limit exceeded")]
    RateLimited,

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response body: {message}")]
    Decode { message: String },

    #[error("Not connected (no token)")]
    NotConnected,
}

/// 履歴固有のエラー
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Unrecognized history format: {message}")]
    Format { message: String },
}

/// フォーマット変換固有のエラー
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    #[error("CSV conversion failed: {message}")]
    Csv { message: String },

    #[error("YAML conversion failed: {message}")]
    Yaml { message: String },
}

/// ローカルファイル操作固有のエラー
#[derive(Error, Debug)]
pub enum FileError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("File too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    #[error("Encoding error: {message}")]
    Encoding { message: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

/// UI 固有のエラー
#[derive(Error, Debug)]
pub enum UiError {
    #[error("Terminal initialization failed: {message}")]
    TerminalInit { message: String },

    #[error("Rendering failed: {component}")]
    RenderingFailed { component: String },
}

// std::io::Error から TsukiError への変換
impl From<std::io::Error> for TsukiError {
    fn from(error: std::io::Error) -> Self {
        TsukiError::File(FileError::Io {
            message: error.to_string(),
        })
    }
}

/// プロジェクト標準の Result 型
pub type Result<T> = std::result::Result<T, TsukiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts_to_file_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: TsukiError = io.into();
        match err {
            TsukiError::File(FileError::Io { message }) => assert!(message.contains("denied")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn github_error_messages_are_actionable() {
        let err = GithubError::Conflict {
            path: "config.json".to_string(),
        };
        assert!(err.to_string().contains("refresh and retry"));
    }
}
