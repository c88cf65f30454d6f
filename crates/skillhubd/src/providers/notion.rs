//! Notion API (version 2022-06-28).

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{Map, Value};
use skillhub_core::Provider;

use super::{bearer, execute, truthy, ProviderError};

pub const NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

// --- Parameters ---

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryDatabaseParams {
    pub database_id: String,
    #[serde(default)]
    pub filter_obj: Option<Value>,
    #[serde(default)]
    pub sorts: Option<Value>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    100
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePageParams {
    pub parent: Value,
    pub properties: Value,
    #[serde(default)]
    pub children: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePageParams {
    pub page_id: String,
    pub properties: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageParams {
    pub page_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppendBlocksParams {
    pub block_id: String,
    pub children: Value,
}

/// Insert `value` under `key` only when it is a non-empty argument.
fn insert_given(body: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value.filter(truthy) {
        body.insert(key.to_string(), value);
    }
}

impl NotionClient {
    pub fn new(http: reqwest::Client, base_url: &str, token: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn headers(&self) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer(Provider::Notion, &self.token)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("notion-version"),
            HeaderValue::from_static(NOTION_VERSION),
        );
        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST /databases/{database_id}/query
    pub async fn query_database(
        &self,
        params: QueryDatabaseParams,
    ) -> Result<Value, ProviderError> {
        let mut body = Map::new();
        body.insert("page_size".to_string(), Value::from(params.page_size));
        insert_given(&mut body, "filter", params.filter_obj);
        insert_given(&mut body, "sorts", params.sorts);

        let path = format!("/databases/{}/query", params.database_id);
        let request = self
            .http
            .post(self.url(&path))
            .headers(self.headers()?)
            .json(&body);
        execute(Provider::Notion, request).await
    }

    /// POST /pages
    pub async fn create_page(&self, params: CreatePageParams) -> Result<Value, ProviderError> {
        let mut body = Map::new();
        body.insert("parent".to_string(), params.parent);
        body.insert("properties".to_string(), params.properties);
        insert_given(&mut body, "children", params.children);

        let request = self
            .http
            .post(self.url("/pages"))
            .headers(self.headers()?)
            .json(&body);
        execute(Provider::Notion, request).await
    }

    /// PATCH /pages/{page_id}
    pub async fn update_page(&self, params: UpdatePageParams) -> Result<Value, ProviderError> {
        let body = serde_json::json!({ "properties": params.properties });
        let path = format!("/pages/{}", params.page_id);
        let request = self
            .http
            .patch(self.url(&path))
            .headers(self.headers()?)
            .json(&body);
        execute(Provider::Notion, request).await
    }

    /// GET /pages/{page_id}
    pub async fn get_page(&self, params: PageParams) -> Result<Value, ProviderError> {
        let path = format!("/pages/{}", params.page_id);
        let request = self.http.get(self.url(&path)).headers(self.headers()?);
        execute(Provider::Notion, request).await
    }

    /// PATCH /blocks/{block_id}/children
    pub async fn append_blocks(&self, params: AppendBlocksParams) -> Result<Value, ProviderError> {
        let body = serde_json::json!({ "children": params.children });
        let path = format!("/blocks/{}/children", params.block_id);
        let request = self
            .http
            .patch(self.url(&path))
            .headers(self.headers()?)
            .json(&body);
        execute(Provider::Notion, request).await
    }
}
