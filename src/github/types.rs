//! GitHub API レスポンス型

use serde::Deserialize;

/// `GET /repos/{owner}/{repo}/contents/{path}` のレスポンス
#[derive(Debug, Clone, Deserialize)]
pub struct ContentsResponse {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub size: u64,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(rename = "type", default)]
    pub entry_type: String,
}

/// `PUT /contents/{path}` のレスポンス
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateResponse {
    pub content: UpdatedContent,
    pub commit: CommitInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatedContent {
    pub sha: String,
    pub size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// `GET /user` のレスポンス（必要な部分のみ）
#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub login: String,
}

/// `GET /rate_limit` のレスポンス
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitResponse {
    pub rate: RateLimit,
}

/// API 残量
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: i64,
}

/// エラーレスポンスのボディ
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

/// 取得したリモートファイル（内容はデコード済み）
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFile {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub size: u64,
    pub content: String,
}

/// ディレクトリ一覧の 1 エントリ
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub size: u64,
}

/// 保存（コミット）結果
#[derive(Debug, Clone, PartialEq)]
pub struct CommitResult {
    pub content_sha: String,
    pub size: u64,
    pub commit_sha: String,
}
