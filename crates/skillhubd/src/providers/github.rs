//! GitHub REST API (version 2022-11-28).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skillhub_core::Provider;

use super::{bearer, execute, ProviderError};

pub const API_VERSION: &str = "2022-11-28";
const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

// --- Parameters ---

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ListReposParams {
    pub per_page: u32,
    pub sort: String,
}

impl Default for ListReposParams {
    fn default() -> Self {
        Self {
            per_page: 30,
            sort: "updated".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRepoParams {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default = "default_true")]
    pub auto_init: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoParams {
    pub owner: String,
    pub repo: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateFileParams {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub content: String,
    pub message: String,
    #[serde(default = "default_branch")]
    pub branch: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateFileParams {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub content: String,
    pub message: String,
    pub sha: String,
    #[serde(default = "default_branch")]
    pub branch: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateIssueParams {
    pub owner: String,
    pub repo: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListIssuesParams {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_issue_state")]
    pub state: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_true() -> bool {
    true
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_issue_state() -> String {
    "open".to_string()
}

fn default_per_page() -> u32 {
    30
}

// --- Bodies ---

#[derive(Debug, Serialize)]
struct CreateRepoBody<'a> {
    name: &'a str,
    description: &'a str,
    private: bool,
    auto_init: bool,
}

#[derive(Debug, Serialize)]
struct PutContentsBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    branch: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateIssueBody<'a> {
    title: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<&'a [String]>,
}

/// Standard base64 of the UTF-8 bytes, as the contents API expects.
pub fn encode_content(content: &str) -> String {
    STANDARD.encode(content.as_bytes())
}

impl GitHubClient {
    pub fn new(http: reqwest::Client, base_url: &str, token: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn headers(&self) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer(Provider::GitHub, &self.token)?);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_GITHUB_JSON));
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(API_VERSION),
        );
        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /user/repos
    pub async fn list_repos(&self, params: ListReposParams) -> Result<Value, ProviderError> {
        let query = [
            ("per_page", params.per_page.to_string()),
            ("sort", params.sort),
        ];
        let request = self
            .http
            .get(self.url("/user/repos"))
            .headers(self.headers()?)
            .query(&query);
        execute(Provider::GitHub, request).await
    }

    /// POST /user/repos
    pub async fn create_repo(&self, params: CreateRepoParams) -> Result<Value, ProviderError> {
        let body = CreateRepoBody {
            name: &params.name,
            description: &params.description,
            private: params.private,
            auto_init: params.auto_init,
        };
        let request = self
            .http
            .post(self.url("/user/repos"))
            .headers(self.headers()?)
            .json(&body);
        execute(Provider::GitHub, request).await
    }

    /// GET /repos/{owner}/{repo}
    pub async fn get_repo(&self, params: RepoParams) -> Result<Value, ProviderError> {
        let path = format!("/repos/{}/{}", params.owner, params.repo);
        let request = self.http.get(self.url(&path)).headers(self.headers()?);
        execute(Provider::GitHub, request).await
    }

    /// PUT /repos/{owner}/{repo}/contents/{path}
    pub async fn create_file(&self, params: CreateFileParams) -> Result<Value, ProviderError> {
        let body = PutContentsBody {
            message: &params.message,
            content: encode_content(&params.content),
            sha: None,
            branch: &params.branch,
        };
        self.put_contents(&params.owner, &params.repo, &params.path, &body)
            .await
    }

    /// PUT /repos/{owner}/{repo}/contents/{path} with the blob sha being replaced.
    pub async fn update_file(&self, params: UpdateFileParams) -> Result<Value, ProviderError> {
        let body = PutContentsBody {
            message: &params.message,
            content: encode_content(&params.content),
            sha: Some(&params.sha),
            branch: &params.branch,
        };
        self.put_contents(&params.owner, &params.repo, &params.path, &body)
            .await
    }

    async fn put_contents(
        &self,
        owner: &str,
        repo: &str,
        file_path: &str,
        body: &PutContentsBody<'_>,
    ) -> Result<Value, ProviderError> {
        // The file path keeps its slashes; it is not percent-encoded.
        let path = format!("/repos/{owner}/{repo}/contents/{file_path}");
        let request = self
            .http
            .put(self.url(&path))
            .headers(self.headers()?)
            .json(body);
        execute(Provider::GitHub, request).await
    }

    /// POST /repos/{owner}/{repo}/issues
    pub async fn create_issue(&self, params: CreateIssueParams) -> Result<Value, ProviderError> {
        let body = CreateIssueBody {
            title: &params.title,
            body: &params.body,
            labels: params.labels.as_deref().filter(|l| !l.is_empty()),
        };
        let path = format!("/repos/{}/{}/issues", params.owner, params.repo);
        let request = self
            .http
            .post(self.url(&path))
            .headers(self.headers()?)
            .json(&body);
        execute(Provider::GitHub, request).await
    }

    /// GET /repos/{owner}/{repo}/issues
    pub async fn list_issues(&self, params: ListIssuesParams) -> Result<Value, ProviderError> {
        let path = format!("/repos/{}/{}/issues", params.owner, params.repo);
        let query = [
            ("state", params.state),
            ("per_page", params.per_page.to_string()),
        ];
        let request = self
            .http
            .get(self.url(&path))
            .headers(self.headers()?)
            .query(&query);
        execute(Provider::GitHub, request).await
    }
}
