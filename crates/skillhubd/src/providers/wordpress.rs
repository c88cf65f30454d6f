//! WordPress REST API (`wp-json/wp/v2`), HTTP basic auth.

use serde::Deserialize;
use serde_json::{Map, Value};
use skillhub_core::{ErrorRecord, Provider};

use super::{execute, truthy, PathId, ProviderError};

/// Returned for every media upload: the hub has no local file access.
pub const UPLOAD_MEDIA_UNSUPPORTED: &str = "File uploads require different handling in serverless";

#[derive(Debug, Clone)]
pub struct WordPressClient {
    http: reqwest::Client,
    site_url: String,
    username: String,
    password: String,
}

// --- Parameters ---

/// Keys other than the named ones are forwarded as extra post fields.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostParams {
    pub title: Value,
    pub content: Value,
    #[serde(default = "default_create_status")]
    pub status: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_create_status() -> Value {
    Value::from("draft")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GetPostsParams {
    pub per_page: u32,
    pub page: u32,
    pub status: String,
}

impl Default for GetPostsParams {
    fn default() -> Self {
        Self {
            per_page: 10,
            page: 1,
            status: "publish".to_string(),
        }
    }
}

/// Keys other than the named ones are forwarded as extra post fields.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePostParams {
    pub post_id: PathId,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeletePostParams {
    pub post_id: PathId,
}

impl WordPressClient {
    pub fn new(http: reqwest::Client, site_url: &str, username: &str, password: &str) -> Self {
        Self {
            http,
            site_url: site_url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// `<site>/wp-json/wp/v2`, with any trailing slash on the site removed.
    pub fn api_base(&self) -> String {
        format!("{}/wp-json/wp/v2", self.site_url.trim_end_matches('/'))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base(), path)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.basic_auth(&self.username, Some(&self.password))
    }

    /// POST /posts
    pub async fn create_post(&self, params: CreatePostParams) -> Result<Value, ProviderError> {
        let mut body = Map::new();
        body.insert("title".to_string(), params.title);
        body.insert("content".to_string(), params.content);
        body.insert("status".to_string(), params.status);
        body.extend(params.extra);

        let request = self.authed(self.http.post(self.url("/posts"))).json(&body);
        execute(Provider::WordPress, request).await
    }

    /// GET /posts
    pub async fn get_posts(&self, params: GetPostsParams) -> Result<Value, ProviderError> {
        let query = [
            ("per_page", params.per_page.to_string()),
            ("page", params.page.to_string()),
            ("status", params.status),
        ];
        let request = self
            .authed(self.http.get(self.url("/posts")))
            .query(&query);
        execute(Provider::WordPress, request).await
    }

    /// POST /posts/{post_id}
    pub async fn update_post(&self, params: UpdatePostParams) -> Result<Value, ProviderError> {
        let mut body = Map::new();
        if let Some(title) = params.title.filter(truthy) {
            body.insert("title".to_string(), title);
        }
        if let Some(content) = params.content.filter(truthy) {
            body.insert("content".to_string(), content);
        }
        body.extend(params.extra);

        let path = format!("/posts/{}", params.post_id);
        let request = self.authed(self.http.post(self.url(&path))).json(&body);
        execute(Provider::WordPress, request).await
    }

    /// DELETE /posts/{post_id}
    pub async fn delete_post(&self, params: DeletePostParams) -> Result<Value, ProviderError> {
        let path = format!("/posts/{}", params.post_id);
        let request = self.authed(self.http.delete(self.url(&path)));
        execute(Provider::WordPress, request).await
    }

    /// Media upload is not available; no request is made.
    pub fn upload_media(&self) -> Value {
        ErrorRecord::new(UPLOAD_MEDIA_UNSUPPORTED).into_value()
    }
}
