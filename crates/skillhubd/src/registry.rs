//! Skill registry.
//!
//! Maps the public skill names to provider operations. The names are a wire
//! contract and are matched exactly (case-sensitive).

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use skillhub_core::Provider;

use crate::dispatch::DispatchError;
use crate::providers::Providers;

/// Every operation the hub exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Skill {
    // WordPress
    WordPressCreatePost,
    WordPressGetPosts,
    WordPressUpdatePost,
    WordPressDeletePost,
    WordPressUploadMedia,

    // Notion
    NotionQueryDatabase,
    NotionCreatePage,
    NotionUpdatePage,
    NotionGetPage,
    NotionAppendBlocks,

    // GitHub
    GitHubListRepos,
    GitHubCreateRepo,
    GitHubGetRepo,
    GitHubCreateFile,
    GitHubUpdateFile,
    GitHubCreateIssue,
    GitHubListIssues,

    // Vercel
    VercelListProjects,
    VercelCreateProject,
    VercelCreateEnvVar,
    VercelListEnvVars,
    VercelListDeployments,
}

impl Skill {
    /// Registration order.
    pub const ALL: [Skill; 22] = [
        Skill::WordPressCreatePost,
        Skill::WordPressGetPosts,
        Skill::WordPressUpdatePost,
        Skill::WordPressDeletePost,
        Skill::WordPressUploadMedia,
        Skill::NotionQueryDatabase,
        Skill::NotionCreatePage,
        Skill::NotionUpdatePage,
        Skill::NotionGetPage,
        Skill::NotionAppendBlocks,
        Skill::GitHubListRepos,
        Skill::GitHubCreateRepo,
        Skill::GitHubGetRepo,
        Skill::GitHubCreateFile,
        Skill::GitHubUpdateFile,
        Skill::GitHubCreateIssue,
        Skill::GitHubListIssues,
        Skill::VercelListProjects,
        Skill::VercelCreateProject,
        Skill::VercelCreateEnvVar,
        Skill::VercelListEnvVars,
        Skill::VercelListDeployments,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::WordPressCreatePost => "wordpress_create_post",
            Self::WordPressGetPosts => "wordpress_get_posts",
            Self::WordPressUpdatePost => "wordpress_update_post",
            Self::WordPressDeletePost => "wordpress_delete_post",
            Self::WordPressUploadMedia => "wordpress_upload_media",
            Self::NotionQueryDatabase => "notion_query_database",
            Self::NotionCreatePage => "notion_create_page",
            Self::NotionUpdatePage => "notion_update_page",
            Self::NotionGetPage => "notion_get_page",
            Self::NotionAppendBlocks => "notion_append_blocks",
            Self::GitHubListRepos => "github_list_repos",
            Self::GitHubCreateRepo => "github_create_repo",
            Self::GitHubGetRepo => "github_get_repo",
            Self::GitHubCreateFile => "github_create_file",
            Self::GitHubUpdateFile => "github_update_file",
            Self::GitHubCreateIssue => "github_create_issue",
            Self::GitHubListIssues => "github_list_issues",
            Self::VercelListProjects => "vercel_list_projects",
            Self::VercelCreateProject => "vercel_create_project",
            Self::VercelCreateEnvVar => "vercel_create_env_var",
            Self::VercelListEnvVars => "vercel_list_env_vars",
            Self::VercelListDeployments => "vercel_list_deployments",
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            Self::WordPressCreatePost
            | Self::WordPressGetPosts
            | Self::WordPressUpdatePost
            | Self::WordPressDeletePost
            | Self::WordPressUploadMedia => Provider::WordPress,
            Self::NotionQueryDatabase
            | Self::NotionCreatePage
            | Self::NotionUpdatePage
            | Self::NotionGetPage
            | Self::NotionAppendBlocks => Provider::Notion,
            Self::GitHubListRepos
            | Self::GitHubCreateRepo
            | Self::GitHubGetRepo
            | Self::GitHubCreateFile
            | Self::GitHubUpdateFile
            | Self::GitHubCreateIssue
            | Self::GitHubListIssues => Provider::GitHub,
            Self::VercelListProjects
            | Self::VercelCreateProject
            | Self::VercelCreateEnvVar
            | Self::VercelListEnvVars
            | Self::VercelListDeployments => Provider::Vercel,
        }
    }

    /// Bind the params bag to this skill's parameters and run it.
    pub async fn invoke(
        self,
        providers: &Providers,
        params: Map<String, Value>,
    ) -> Result<Value, DispatchError> {
        let result = match self {
            Self::WordPressCreatePost => {
                providers.wordpress.create_post(self.bind(params)?).await
            }
            Self::WordPressGetPosts => providers.wordpress.get_posts(self.bind(params)?).await,
            Self::WordPressUpdatePost => {
                providers.wordpress.update_post(self.bind(params)?).await
            }
            Self::WordPressDeletePost => {
                providers.wordpress.delete_post(self.bind(params)?).await
            }
            // Answers the same for any input.
            Self::WordPressUploadMedia => Ok(providers.wordpress.upload_media()),
            Self::NotionQueryDatabase => providers.notion.query_database(self.bind(params)?).await,
            Self::NotionCreatePage => providers.notion.create_page(self.bind(params)?).await,
            Self::NotionUpdatePage => providers.notion.update_page(self.bind(params)?).await,
            Self::NotionGetPage => providers.notion.get_page(self.bind(params)?).await,
            Self::NotionAppendBlocks => providers.notion.append_blocks(self.bind(params)?).await,
            Self::GitHubListRepos => providers.github.list_repos(self.bind(params)?).await,
            Self::GitHubCreateRepo => providers.github.create_repo(self.bind(params)?).await,
            Self::GitHubGetRepo => providers.github.get_repo(self.bind(params)?).await,
            Self::GitHubCreateFile => providers.github.create_file(self.bind(params)?).await,
            Self::GitHubUpdateFile => providers.github.update_file(self.bind(params)?).await,
            Self::GitHubCreateIssue => providers.github.create_issue(self.bind(params)?).await,
            Self::GitHubListIssues => providers.github.list_issues(self.bind(params)?).await,
            Self::VercelListProjects => providers.vercel.list_projects(self.bind(params)?).await,
            Self::VercelCreateProject => providers.vercel.create_project(self.bind(params)?).await,
            Self::VercelCreateEnvVar => providers.vercel.create_env_var(self.bind(params)?).await,
            Self::VercelListEnvVars => providers.vercel.list_env_vars(self.bind(params)?).await,
            Self::VercelListDeployments => {
                providers.vercel.list_deployments(self.bind(params)?).await
            }
        };
        result.map_err(DispatchError::from)
    }

    /// Whether keys beyond the named parameters are forwarded upstream.
    pub fn forwards_extra_fields(self) -> bool {
        matches!(self, Self::WordPressCreatePost | Self::WordPressUpdatePost)
    }

    /// Deserialize the params bag into a parameter struct.
    ///
    /// A `null` value counts as not given, so the parameter's default
    /// applies. Skills that forward extra fields keep nulls as-is.
    fn bind<T: DeserializeOwned>(self, mut params: Map<String, Value>) -> Result<T, DispatchError> {
        if !self.forwards_extra_fields() {
            params.retain(|_, value| !value.is_null());
        }
        serde_json::from_value(Value::Object(params)).map_err(|e| DispatchError::InvalidParams {
            skill: self.name().to_string(),
            message: e.to_string(),
        })
    }
}

impl std::fmt::Display for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable name -> skill table, built once at startup.
#[derive(Debug, Clone)]
pub struct SkillRegistry {
    by_name: HashMap<&'static str, Skill>,
    order: Vec<Skill>,
}

impl Default for SkillRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::with_skills(&Skill::ALL)
    }

    /// Registry limited to the given skills, in the given order.
    pub fn with_skills(skills: &[Skill]) -> Self {
        let mut by_name = HashMap::with_capacity(skills.len());
        let mut order = Vec::with_capacity(skills.len());
        for &skill in skills {
            if by_name.insert(skill.name(), skill).is_none() {
                order.push(skill);
            }
        }
        Self { by_name, order }
    }

    pub fn lookup(&self, name: &str) -> Option<Skill> {
        self.by_name.get(name).copied()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.order.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn skills(&self) -> &[Skill] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::config_for;
    use serde_json::json;
    use std::collections::HashSet;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn registry_has_all_reference_skills() {
        let registry = SkillRegistry::new();
        assert_eq!(registry.len(), 22);

        let names = registry.names();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());

        let count = |p: Provider| Skill::ALL.iter().filter(|s| s.provider() == p).count();
        assert_eq!(count(Provider::WordPress), 5);
        assert_eq!(count(Provider::Notion), 5);
        assert_eq!(count(Provider::GitHub), 7);
        assert_eq!(count(Provider::Vercel), 5);
    }

    #[test]
    fn names_keep_registration_order() {
        let names = SkillRegistry::new().names();
        assert_eq!(names.first().map(String::as_str), Some("wordpress_create_post"));
        assert_eq!(names.last().map(String::as_str), Some("vercel_list_deployments"));
    }

    #[test]
    fn skill_name_prefix_matches_provider() {
        for skill in Skill::ALL {
            assert_eq!(Provider::for_skill(skill.name()), Some(skill.provider()));
        }
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let registry = SkillRegistry::new();
        assert_eq!(
            registry.lookup("github_create_issue"),
            Some(Skill::GitHubCreateIssue)
        );
        assert_eq!(registry.lookup("GitHub_create_issue"), None);
        assert_eq!(registry.lookup("github_create_issue "), None);
        assert_eq!(registry.lookup(""), None);
    }

    #[test]
    fn with_skills_ignores_duplicates() {
        let registry = SkillRegistry::with_skills(&[
            Skill::GitHubGetRepo,
            Skill::GitHubGetRepo,
            Skill::NotionGetPage,
        ]);
        assert_eq!(registry.names(), vec!["github_get_repo", "notion_get_page"]);
    }

    #[tokio::test]
    async fn upload_media_ignores_params_and_makes_no_request() {
        let server = MockServer::start().await;
        let providers = Providers::new(&config_for(&server)).unwrap();

        let params = json!({ "file_path": "/tmp/a.png", "anything": true });
        let Value::Object(params) = params else {
            unreachable!()
        };
        let result = Skill::WordPressUploadMedia
            .invoke(&providers, params)
            .await
            .unwrap();
        assert_eq!(
            result,
            json!({ "error": "File uploads require different handling in serverless" })
        );
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn unknown_param_is_invalid_params() {
        let server = MockServer::start().await;
        let providers = Providers::new(&config_for(&server)).unwrap();

        let Value::Object(params) = json!({ "owner": "o", "repo": "r", "colour": "red" }) else {
            unreachable!()
        };
        let err = Skill::GitHubGetRepo
            .invoke(&providers, params)
            .await
            .unwrap_err();
        match err {
            DispatchError::InvalidParams { skill, message } => {
                assert_eq!(skill, "github_get_repo");
                assert!(message.contains("unknown field `colour`"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn null_params_fall_back_to_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/o/r/issues"))
            .and(body_json(json!({ "title": "Bug", "body": "" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "number": 1 })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/issues"))
            .and(query_param("state", "open"))
            .and(query_param("per_page", "30"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;
        let providers = Providers::new(&config_for(&server)).unwrap();

        let Value::Object(params) =
            json!({ "owner": "o", "repo": "r", "title": "Bug", "body": null, "labels": null })
        else {
            unreachable!()
        };
        let result = Skill::GitHubCreateIssue
            .invoke(&providers, params)
            .await
            .unwrap();
        assert_eq!(result, json!({ "number": 1 }));

        let Value::Object(params) =
            json!({ "owner": "o", "repo": "r", "state": null, "per_page": null })
        else {
            unreachable!()
        };
        let result = Skill::GitHubListIssues
            .invoke(&providers, params)
            .await
            .unwrap();
        assert_eq!(result, json!([]));
    }

    #[tokio::test]
    async fn null_required_param_is_still_missing() {
        let server = MockServer::start().await;
        let providers = Providers::new(&config_for(&server)).unwrap();

        let Value::Object(params) = json!({ "owner": null, "repo": "r" }) else {
            unreachable!()
        };
        let err = Skill::GitHubGetRepo
            .invoke(&providers, params)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing field `owner`"), "{err}");
    }

    #[tokio::test]
    async fn forwarded_extra_fields_keep_nulls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wp-json/wp/v2/posts"))
            .and(body_json(json!({
                "title": "T",
                "content": "C",
                "status": null,
                "excerpt": null
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 3 })))
            .expect(1)
            .mount(&server)
            .await;
        let providers = Providers::new(&config_for(&server)).unwrap();

        let Value::Object(params) =
            json!({ "title": "T", "content": "C", "status": null, "excerpt": null })
        else {
            unreachable!()
        };
        let result = Skill::WordPressCreatePost
            .invoke(&providers, params)
            .await
            .unwrap();
        assert_eq!(result, json!({ "id": 3 }));
    }

    #[tokio::test]
    async fn missing_required_param_is_invalid_params() {
        let server = MockServer::start().await;
        let providers = Providers::new(&config_for(&server)).unwrap();

        let err = Skill::VercelCreateProject
            .invoke(&providers, Map::new())
            .await
            .unwrap_err();
        assert!(
            err.to_string().contains("missing field `name`"),
            "{err}"
        );
    }
}
