//! Vercel REST API (v6 deployments, v9 projects, v10 env).

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skillhub_core::Provider;

use super::{bearer, execute, push_opt, ProviderError};

/// Targets an env var is created for when the caller names none.
pub const DEFAULT_ENV_TARGETS: [&str; 3] = ["production", "preview", "development"];

#[derive(Debug, Clone)]
pub struct VercelClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

// --- Parameters ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListProjectsParams {
    #[serde(default)]
    pub team_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProjectParams {
    pub name: String,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListEnvVarsParams {
    pub project_id: String,
    #[serde(default)]
    pub team_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEnvVarParams {
    pub project_id: String,
    pub key: String,
    pub value: String,
    /// `None` means all targets; an explicit empty list is sent as-is.
    #[serde(default)]
    pub target: Option<Vec<String>>,
    #[serde(rename = "type", default = "default_env_type")]
    pub kind: String,
    #[serde(default)]
    pub team_id: Option<String>,
}

fn default_env_type() -> String {
    "encrypted".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListDeploymentsParams {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for ListDeploymentsParams {
    fn default() -> Self {
        Self {
            project_id: None,
            team_id: None,
            limit: default_limit(),
        }
    }
}

fn default_limit() -> u32 {
    20
}

// --- Bodies ---

#[derive(Debug, Serialize)]
struct CreateProjectBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    framework: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CreateEnvVarBody<'a> {
    key: &'a str,
    value: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    target: Vec<String>,
}

fn team_query(team_id: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    push_opt(&mut query, "teamId", team_id);
    query
}

impl VercelClient {
    pub fn new(http: reqwest::Client, base_url: &str, token: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn headers(&self) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer(Provider::Vercel, &self.token)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /v9/projects
    pub async fn list_projects(&self, params: ListProjectsParams) -> Result<Value, ProviderError> {
        let request = self
            .http
            .get(self.url("/v9/projects"))
            .headers(self.headers()?)
            .query(&team_query(params.team_id.as_deref()));
        execute(Provider::Vercel, request).await
    }

    /// POST /v9/projects
    pub async fn create_project(
        &self,
        params: CreateProjectParams,
    ) -> Result<Value, ProviderError> {
        let body = CreateProjectBody {
            name: &params.name,
            framework: params.framework.as_deref().filter(|f| !f.is_empty()),
        };
        let request = self
            .http
            .post(self.url("/v9/projects"))
            .headers(self.headers()?)
            .query(&team_query(params.team_id.as_deref()))
            .json(&body);
        execute(Provider::Vercel, request).await
    }

    /// GET /v10/projects/{project_id}/env
    pub async fn list_env_vars(&self, params: ListEnvVarsParams) -> Result<Value, ProviderError> {
        let path = format!("/v10/projects/{}/env", params.project_id);
        let request = self
            .http
            .get(self.url(&path))
            .headers(self.headers()?)
            .query(&team_query(params.team_id.as_deref()));
        execute(Provider::Vercel, request).await
    }

    /// POST /v10/projects/{project_id}/env
    pub async fn create_env_var(&self, params: CreateEnvVarParams) -> Result<Value, ProviderError> {
        let target = params
            .target
            .unwrap_or_else(|| DEFAULT_ENV_TARGETS.map(String::from).to_vec());
        let body = CreateEnvVarBody {
            key: &params.key,
            value: &params.value,
            kind: &params.kind,
            target,
        };
        let path = format!("/v10/projects/{}/env", params.project_id);
        let request = self
            .http
            .post(self.url(&path))
            .headers(self.headers()?)
            .query(&team_query(params.team_id.as_deref()))
            .json(&body);
        execute(Provider::Vercel, request).await
    }

    /// GET /v6/deployments
    pub async fn list_deployments(
        &self,
        params: ListDeploymentsParams,
    ) -> Result<Value, ProviderError> {
        let mut query = vec![("limit", params.limit.to_string())];
        push_opt(&mut query, "projectId", params.project_id.as_deref());
        push_opt(&mut query, "teamId", params.team_id.as_deref());

        let request = self
            .http
            .get(self.url("/v6/deployments"))
            .headers(self.headers()?)
            .query(&query);
        execute(Provider::Vercel, request).await
    }
}
