//! GitHub REST client
//!
//! Thin wrapper over the GitHub v3 API covering the handful of calls the
//! pipeline needs: PR metadata, diff, file listing, commit file listing,
//! and contents reads/writes.

use base64::Engine;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "DocuSync-Agent";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("github request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("github returned {status} for {path}")]
    Status { status: StatusCode, path: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// PR details, trimmed to what the pipeline actually consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct PrDetails {
    pub number: u64,
    pub title: Option<String>,
    pub head: PrRef,
    pub base: PrRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrRef {
    #[serde(rename = "ref")]
    pub branch: String,
    pub sha: String,
}

/// One commit from the PR commit listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub commit: CommitMeta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitMeta {
    pub message: String,
}

/// One entry from the PR or commit file listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub patch: Option<String>,
}

/// Contents of a file fetched via the contents API, with the blob sha
/// needed to update it.
#[derive(Debug, Clone)]
pub struct FileContent {
    pub content: String,
    pub sha: String,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

/// Comment created through the issues API, echoed back by GitHub.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    files: Vec<ChangedFile>,
}

#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: String, timeout: Duration) -> Result<Self, GitHubError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            token,
            base_url: API_BASE.to_string(),
        })
    }

    /// Test constructor pointing at a local mock server.
    #[cfg(test)]
    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            base_url,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT)
    }

    async fn check(
        resp: reqwest::Response,
        path: &str,
    ) -> Result<reqwest::Response, GitHubError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(GitHubError::Status {
                status: resp.status(),
                path: path.to_string(),
            })
        }
    }

    pub async fn get_pr_details(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> Result<PrDetails, GitHubError> {
        let path = format!("/repos/{repo}/pulls/{pr_number}");
        let resp = self.request(reqwest::Method::GET, &path).send().await?;
        let resp = Self::check(resp, &path).await?;
        Ok(resp.json().await?)
    }

    /// Fetch the unified diff for a PR via the diff media type.
    pub async fn get_pr_diff(&self, repo: &str, pr_number: u64) -> Result<String, GitHubError> {
        let path = format!("/repos/{repo}/pulls/{pr_number}");
        let resp = self
            .request(reqwest::Method::GET, &path)
            .header("Accept", "application/vnd.github.v3.diff")
            .send()
            .await?;
        let resp = Self::check(resp, &path).await?;
        Ok(resp.text().await?)
    }

    pub async fn get_pr_files(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<ChangedFile>, GitHubError> {
        let path = format!("/repos/{repo}/pulls/{pr_number}/files");
        let resp = self.request(reqwest::Method::GET, &path).send().await?;
        let resp = Self::check(resp, &path).await?;
        Ok(resp.json().await?)
    }

    pub async fn get_pr_commits(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<CommitInfo>, GitHubError> {
        let path = format!("/repos/{repo}/pulls/{pr_number}/commits");
        let resp = self.request(reqwest::Method::GET, &path).send().await?;
        let resp = Self::check(resp, &path).await?;
        Ok(resp.json().await?)
    }

    /// File listing for a single commit. Used by the loop guard to decide
    /// whether a synchronize event only touched documentation.
    pub async fn get_commit_files(
        &self,
        repo: &str,
        sha: &str,
    ) -> Result<Vec<ChangedFile>, GitHubError> {
        let path = format!("/repos/{repo}/commits/{sha}");
        let resp = self.request(reqwest::Method::GET, &path).send().await?;
        let resp = Self::check(resp, &path).await?;
        let commit: CommitResponse = resp.json().await?;
        Ok(commit.files)
    }

    /// Read a file from a branch. Returns `None` on 404 so callers can
    /// create the file fresh.
    pub async fn get_file_content(
        &self,
        repo: &str,
        file_path: &str,
        branch: &str,
    ) -> Result<Option<FileContent>, GitHubError> {
        let path = format!("/repos/{repo}/contents/{file_path}?ref={branch}");
        let resp = self.request(reqwest::Method::GET, &path).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!(repo, file_path, branch, "file not found");
            return Ok(None);
        }
        let resp = Self::check(resp, &path).await?;
        let body: ContentsResponse = resp.json().await?;
        // The contents API wraps base64 at 60 columns.
        let cleaned: String = body.content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(cleaned.as_bytes())
            .map_err(|e| GitHubError::Decode(e.to_string()))?;
        let content =
            String::from_utf8(bytes).map_err(|e| GitHubError::Decode(e.to_string()))?;
        Ok(Some(FileContent {
            content,
            sha: body.sha,
        }))
    }

    /// Create or update a file on a branch. Pass the current blob sha for
    /// updates, `None` for creation.
    pub async fn put_file_content(
        &self,
        repo: &str,
        file_path: &str,
        branch: &str,
        message: &str,
        content: &str,
        sha: Option<&str>,
    ) -> Result<(), GitHubError> {
        let path = format!("/repos/{repo}/contents/{file_path}");
        let encoded = base64::engine::general_purpose::STANDARD.encode(content.as_bytes());
        let mut body = json!({
            "message": message,
            "content": encoded,
            "branch": branch,
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }
        let resp = self
            .request(reqwest::Method::PUT, &path)
            .json(&body)
            .send()
            .await?;
        Self::check(resp, &path).await?;
        Ok(())
    }

    pub async fn create_issue_comment(
        &self,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<IssueComment, GitHubError> {
        let path = format!("/repos/{repo}/issues/{issue_number}/comments");
        let resp = self
            .request(reqwest::Method::POST, &path)
            .json(&json!({ "body": body }))
            .send()
            .await?;
        let resp = Self::check(resp, &path).await?;
        let comment: IssueComment = resp.json().await?;
        debug!(comment_id = comment.id, "comment created");
        Ok(comment)
    }
}
