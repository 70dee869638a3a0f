//! GitHub コンテンツゲートウェイ
//!
//! 単一リポジトリのコンテンツ API を包む薄い同期クライアント。
//! ファイル取得（Base64 デコード込み）、SHA つき更新（楽観的並行性制御）、
//! ルート直下の JSON 一覧、トークン検証、レート制限照会を提供する。
//! HTTP ステータスはエラー種別へ分類して返す。

mod token;
pub mod types;

pub use token::CredentialStore;
pub use types::{CommitResult, FileSummary, RateLimit, RemoteFile};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::json;

use crate::config::COMMIT_MESSAGE_PREFIX;
use crate::error::GithubError;
use types::{ApiErrorBody, ContentsResponse, RateLimitResponse, UpdateResponse, UserResponse};

const API_BASE: &str = "https://api.github.com";
const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("tsuki/", env!("CARGO_PKG_VERSION"));

/// GitHub API クライアント
///
/// 完全に同期・ブロッキング。タイムアウトはこの層では設けない
/// （ホストのネットワークスタックに委ねる）。
#[derive(Debug, Clone)]
pub struct GithubClient {
    agent: ureq::Agent,
    api_base: String,
    owner: String,
    repo: String,
    branch: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(owner: &str, repo: &str, branch: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            api_base: API_BASE.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
            token: None,
        }
    }

    /// API ベース URL を差し替える（テスト・GHE 向け）
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    fn contents_url(&self, path: &str) -> String {
        if path.is_empty() {
            format!("{}/repos/{}/{}/contents/", self.api_base, self.owner, self.repo)
        } else {
            format!(
                "{}/repos/{}/{}/contents/{}",
                self.api_base, self.owner, self.repo, path
            )
        }
    }

    fn authorized(&self, request: ureq::Request) -> Result<ureq::Request, GithubError> {
        let token = self.token.as_ref().ok_or(GithubError::NotConnected)?;
        Ok(request
            .set("Authorization", &format!("Bearer {token}"))
            .set("Accept", ACCEPT_HEADER)
            .set("User-Agent", USER_AGENT))
    }

    /// トークンが受理されるか確認し、ログイン名を返す
    pub fn validate_token(&self, token: &str) -> Result<String, GithubError> {
        let response = self
            .agent
            .get(&format!("{}/user", self.api_base))
            .set("Authorization", &format!("Bearer {token}"))
            .set("Accept", ACCEPT_HEADER)
            .set("User-Agent", USER_AGENT)
            .call()
            .map_err(|err| classify_error(err, "user"))?;
        let user: UserResponse = response.into_json().map_err(decode_error)?;
        Ok(user.login)
    }

    /// ファイルを取得する（内容は Base64 からデコード済み）
    pub fn get_file(&self, path: &str) -> Result<RemoteFile, GithubError> {
        let request = self.authorized(self.agent.get(&self.contents_url(path)))?;
        let response = request.call().map_err(|err| classify_error(err, path))?;
        let contents: ContentsResponse = response.into_json().map_err(decode_error)?;

        let encoded = contents.content.ok_or_else(|| GithubError::Decode {
            message: format!("no content field for {path}"),
        })?;
        let content = decode_content(&encoded)?;

        Ok(RemoteFile {
            name: contents.name,
            path: contents.path,
            sha: contents.sha,
            size: contents.size,
            content,
        })
    }

    /// ファイルを更新（または作成）する
    ///
    /// `sha` は直近に取得したファイルの SHA。古い SHA はリモートが 409 で
    /// 拒否する（楽観的並行性制御）。新規作成時は None。
    pub fn put_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: Option<&str>,
    ) -> Result<CommitResult, GithubError> {
        let mut body = json!({
            "message": format!("{COMMIT_MESSAGE_PREFIX} {message}"),
            "content": STANDARD.encode(content.as_bytes()),
            "branch": self.branch,
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }

        let request = self.authorized(self.agent.put(&self.contents_url(path)))?;
        let response = request
            .send_json(body)
            .map_err(|err| classify_error(err, path))?;
        let update: UpdateResponse = response.into_json().map_err(decode_error)?;

        Ok(CommitResult {
            content_sha: update.content.sha,
            size: update.content.size,
            commit_sha: update.commit.sha,
        })
    }

    /// ルート直下の JSON ファイル一覧（名前順）
    pub fn list_json_files(&self) -> Result<Vec<FileSummary>, GithubError> {
        let request = self.authorized(self.agent.get(&self.contents_url("")))?;
        let response = request.call().map_err(|err| classify_error(err, ""))?;
        let entries: Vec<ContentsResponse> = response.into_json().map_err(decode_error)?;

        let mut files: Vec<FileSummary> = entries
            .into_iter()
            .filter(|entry| {
                entry.entry_type == "file" && entry.name.to_lowercase().ends_with(".json")
            })
            .map(|entry| FileSummary {
                name: entry.name,
                path: entry.path,
                sha: entry.sha,
                size: entry.size,
            })
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// API レート制限の残量を照会する
    pub fn rate_limit(&self) -> Result<RateLimit, GithubError> {
        let mut request = self
            .agent
            .get(&format!("{}/rate_limit", self.api_base))
            .set("Accept", ACCEPT_HEADER)
            .set("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        let response = request
            .call()
            .map_err(|err| classify_error(err, "rate_limit"))?;
        let limits: RateLimitResponse = response.into_json().map_err(decode_error)?;
        Ok(limits.rate)
    }
}

/// Base64（改行入り）をデコードして UTF-8 文字列へ
fn decode_content(encoded: &str) -> Result<String, GithubError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact).map_err(|e| GithubError::Decode {
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| GithubError::Decode {
        message: e.to_string(),
    })
}

fn decode_error(err: std::io::Error) -> GithubError {
    GithubError::Decode {
        message: err.to_string(),
    }
}

fn classify_error(err: ureq::Error, path: &str) -> GithubError {
    match err {
        ureq::Error::Status(code, response) => {
            let body: ApiErrorBody = response.into_json().ok().unwrap_or_default();
            classify_status(code, &body.message, path)
        }
        ureq::Error::Transport(transport) => GithubError::Network {
            message: transport.to_string(),
        },
    }
}

/// HTTP ステータスをエラー種別へ分類する
fn classify_status(status: u16, message: &str, path: &str) -> GithubError {
    match status {
        401 => GithubError::Auth,
        403 => {
            if message.to_lowercase().contains("rate limit") {
                GithubError::RateLimited
            } else {
                GithubError::Auth
            }
        }
        404 => GithubError::NotFound {
            path: path.to_string(),
        },
        409 => GithubError::Conflict {
            path: path.to_string(),
        },
        422 => GithubError::Validation {
            message: message.to_string(),
        },
        429 => GithubError::RateLimited,
        other => GithubError::Api {
            status: other,
            message: message.to_string(),
        },
    }
}

/// 認証系エラーか（呼び出し側が保存トークンを破棄すべきか）
pub fn is_auth_failure(err: &GithubError) -> bool {
    matches!(err, GithubError::Auth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_codes_per_taxonomy() {
        assert!(matches!(classify_status(401, "", "a"), GithubError::Auth));
        assert!(matches!(classify_status(403, "bad", "a"), GithubError::Auth));
        assert!(matches!(
            classify_status(403, "API rate limit exceeded", "a"),
            GithubError::RateLimited
        ));
        assert!(matches!(
            classify_status(404, "", "config.json"),
            GithubError::NotFound { .. }
        ));
        assert!(matches!(
            classify_status(409, "", "config.json"),
            GithubError::Conflict { .. }
        ));
        assert!(matches!(
            classify_status(422, "invalid", "a"),
            GithubError::Validation { .. }
        ));
        assert!(matches!(
            classify_status(500, "boom", "a"),
            GithubError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn decodes_base64_with_newlines() {
        // "{}\n" を 76 桁改行入り風に
        let encoded = "e30=\n";
        assert_eq!(decode_content(encoded).unwrap(), "{}");
    }

    #[test]
    fn rejects_invalid_base64_content() {
        assert!(matches!(
            decode_content("!!!"),
            Err(GithubError::Decode { .. })
        ));
    }

    #[test]
    fn contents_url_handles_root_listing() {
        let client = GithubClient::new("hafrey1", "LunaTV-config", "main");
        assert_eq!(
            client.contents_url(""),
            "https://api.github.com/repos/hafrey1/LunaTV-config/contents/"
        );
        assert_eq!(
            client.contents_url("luna-tv-config.json"),
            "https://api.github.com/repos/hafrey1/LunaTV-config/contents/luna-tv-config.json"
        );
    }

    #[test]
    fn requests_require_a_token() {
        let client = GithubClient::new("o", "r", "main");
        assert!(matches!(
            client.get_file("config.json"),
            Err(GithubError::NotConnected)
        ));
    }

    #[test]
    fn auth_failure_detection() {
        assert!(is_auth_failure(&GithubError::Auth));
        assert!(!is_auth_failure(&GithubError::RateLimited));
    }
}
