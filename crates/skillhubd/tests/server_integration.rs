//! Integration tests for the HTTP surface.
//!
//! Drives the router with `tower::ServiceExt::oneshot` while a wiremock
//! server stands in for all four provider APIs.

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use skillhub_core::Config;
use skillhubd::dispatch::Dispatcher;
use skillhubd::providers::github::encode_content;
use skillhubd::providers::Providers;
use skillhubd::registry::{Skill, SkillRegistry};
use skillhubd::server::{create_router, AppState};
use tower::ServiceExt;
use wiremock::matchers::{basic_auth, bearer_token, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    Config {
        github_token: "gh-token".to_string(),
        notion_token: "notion-token".to_string(),
        vercel_token: "vercel-token".to_string(),
        wordpress_url: server.uri(),
        wordpress_username: "admin".to_string(),
        wordpress_password: "app-pass".to_string(),
        github_api_url: server.uri(),
        notion_api_url: format!("{}/v1", server.uri()),
        vercel_api_url: server.uri(),
    }
}

fn create_test_app(config: &Config) -> axum::Router {
    let providers = Providers::new(config).unwrap();
    let state = Arc::new(AppState {
        dispatcher: Dispatcher::new(SkillRegistry::new(), providers),
    });
    create_router(state)
}

async fn body_to_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_skill_call(app: axum::Router, payload: &Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/skill-call")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(payload).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

// --- Info and health ---

#[tokio::test]
async fn root_reports_every_registered_skill_once() {
    let app = create_test_app(&Config::default());

    let response: Response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response).await;
    assert_eq!(json["name"], "Skills Hub");
    assert_eq!(json["status"], "operational");
    assert_eq!(json["total_skills"], 22);

    let listed: Vec<&str> = json["available_skills"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    let unique: HashSet<&str> = listed.iter().copied().collect();
    assert_eq!(unique.len(), listed.len());

    let expected: HashSet<&str> = Skill::ALL.iter().map(Skill::name).collect();
    assert_eq!(unique, expected);
}

#[tokio::test]
async fn health_needs_no_credentials() {
    let app = create_test_app(&Config::default());

    let response: Response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response).await, json!({ "status": "healthy" }));
}

// --- Local dispatch errors ---

#[tokio::test]
async fn missing_skill_is_400() {
    let app = create_test_app(&Config::default());

    for payload in [json!({ "params": {} }), json!({ "skill": "" })] {
        let response = post_skill_call(app.clone(), &payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_to_json(response).await,
            json!({ "detail": "Missing 'skill' parameter" })
        );
    }
}

#[tokio::test]
async fn unknown_skill_is_404_listing_registry() {
    let app = create_test_app(&Config::default());

    for name in ["slack_post_message", "GITHUB_LIST_REPOS", "github_list_repo"] {
        let response = post_skill_call(app.clone(), &json!({ "skill": name })).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_to_json(response).await;
        let detail = json["detail"].as_str().unwrap();
        let prefix = format!("Skill '{name}' not found. Available: [");
        assert!(detail.starts_with(&prefix), "{detail}");

        let list = detail
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap();
        let listed: HashSet<&str> = list
            .split(", ")
            .map(|item| item.trim_matches('\''))
            .collect();
        let expected: HashSet<&str> = Skill::ALL.iter().map(Skill::name).collect();
        assert_eq!(listed, expected);
    }
}

#[tokio::test]
async fn unknown_param_is_500_without_upstream_call() {
    let server = MockServer::start().await;
    let app = create_test_app(&config_for(&server));

    let response = post_skill_call(
        app,
        &json!({
            "skill": "github_create_issue",
            "params": { "owner": "o", "repo": "r", "title": "t", "assignee": "me" }
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response).await;
    let detail = json["detail"].as_str().unwrap();
    assert!(detail.contains("github_create_issue"), "{detail}");
    assert!(detail.contains("assignee"), "{detail}");
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

// --- Provider pass-through and error normalization ---

#[tokio::test]
async fn successful_upstream_body_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .and(bearer_token("gh-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 42 })))
        .expect(1)
        .mount(&server)
        .await;
    let app = create_test_app(&config_for(&server));

    let response = post_skill_call(
        app,
        &json!({ "skill": "github_create_repo", "params": { "name": "demo" } }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response).await, json!({ "id": 42 }));
}

#[tokio::test]
async fn upstream_error_is_200_with_error_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v9/projects"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/pages/p1"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/wp-json/wp/v2/posts/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;
    let app = create_test_app(&config_for(&server));

    let cases = [
        (
            json!({ "skill": "github_get_repo", "params": { "owner": "octo", "repo": "missing" } }),
            "GitHub",
        ),
        (json!({ "skill": "vercel_list_projects" }), "Vercel"),
        (
            json!({ "skill": "notion_get_page", "params": { "page_id": "p1" } }),
            "Notion",
        ),
        (
            json!({ "skill": "wordpress_delete_post", "params": { "post_id": 9 } }),
            "WordPress",
        ),
    ];

    for (payload, provider) in cases {
        let response = post_skill_call(app.clone(), &payload).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_to_json(response).await,
            json!({ "error": format!("{provider} API Error 404: not found") })
        );
    }
}

#[tokio::test]
async fn github_create_file_sends_base64_content() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/octo/demo/contents/hello.txt"))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("x-github-api-version", "2022-11-28"))
        .and(body_json(json!({
            "message": "add hello",
            "content": "aGVsbG8=",
            "branch": "main"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "content": { "sha": "s1" } })))
        .expect(1)
        .mount(&server)
        .await;
    let app = create_test_app(&config_for(&server));

    let response = post_skill_call(
        app,
        &json!({
            "skill": "github_create_file",
            "params": {
                "owner": "octo",
                "repo": "demo",
                "path": "hello.txt",
                "content": "hello",
                "message": "add hello"
            }
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_to_json(response).await,
        json!({ "content": { "sha": "s1" } })
    );
}

#[tokio::test]
async fn large_file_content_is_forwarded() {
    let content = "a".repeat(3 * 1024 * 1024);
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/octo/demo/contents/big.txt"))
        .and(body_json(json!({
            "message": "add big file",
            "content": encode_content(&content),
            "branch": "main"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "content": { "sha": "s2" } })))
        .expect(1)
        .mount(&server)
        .await;
    let app = create_test_app(&config_for(&server));

    let response = post_skill_call(
        app,
        &json!({
            "skill": "github_create_file",
            "params": {
                "owner": "octo",
                "repo": "demo",
                "path": "big.txt",
                "content": content,
                "message": "add big file"
            }
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_to_json(response).await,
        json!({ "content": { "sha": "s2" } })
    );
}

#[tokio::test]
async fn invalid_token_is_local_failure() {
    let server = MockServer::start().await;
    let mut config = config_for(&server);
    config.vercel_token = "bad\ntoken".to_string();
    let app = create_test_app(&config);

    let response = post_skill_call(app, &json!({ "skill": "vercel_list_projects" })).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_to_json(response).await,
        json!({ "detail": "Vercel token is not a valid header value" })
    );
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn wordpress_create_post_uses_basic_auth_and_extra_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(basic_auth("admin", "app-pass"))
        .and(body_json(json!({
            "title": "Launch",
            "content": "We shipped.",
            "status": "publish",
            "tags": [1, 2]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 101 })))
        .expect(1)
        .mount(&server)
        .await;
    let app = create_test_app(&config_for(&server));

    let response = post_skill_call(
        app,
        &json!({
            "skill": "wordpress_create_post",
            "params": {
                "title": "Launch",
                "content": "We shipped.",
                "status": "publish",
                "tags": [1, 2]
            }
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response).await, json!({ "id": 101 }));
}

#[tokio::test]
async fn upload_media_never_calls_out() {
    let server = MockServer::start().await;
    let app = create_test_app(&config_for(&server));

    for params in [
        json!({}),
        json!({ "file_path": "/tmp/cat.png" }),
        json!({ "file_path": "/tmp/cat.png", "title": "Cat", "alt": "x" }),
    ] {
        let response = post_skill_call(
            app.clone(),
            &json!({ "skill": "wordpress_upload_media", "params": params }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_to_json(response).await,
            json!({ "error": "File uploads require different handling in serverless" })
        );
    }

    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn unconfigured_wordpress_is_local_failure() {
    let app = create_test_app(&Config::default());

    let response = post_skill_call(
        app,
        &json!({ "skill": "wordpress_get_posts", "params": { "per_page": 5 } }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response).await;
    assert!(json["detail"].as_str().unwrap().starts_with("WordPress request failed"));
}
