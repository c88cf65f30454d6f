//! Wire types shared by the hub and its clients.
//!
//! Everything here is request-scoped; the hub persists nothing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name reported by `GET /`.
pub const HUB_NAME: &str = "Skills Hub";

/// Status reported by `GET /` while the process is serving.
pub const HUB_STATUS_OPERATIONAL: &str = "operational";

/// Status reported by `GET /health`.
pub const HEALTH_STATUS_HEALTHY: &str = "healthy";

/// Detail returned when a skill call names no skill.
pub const MISSING_SKILL_DETAIL: &str = "Missing 'skill' parameter";

// --- Providers ---

/// External service a skill forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    WordPress,
    Notion,
    GitHub,
    Vercel,
}

impl Provider {
    /// Registration order, which is also the order skills are listed in.
    pub const ALL: [Provider; 4] = [
        Provider::WordPress,
        Provider::Notion,
        Provider::GitHub,
        Provider::Vercel,
    ];

    /// Skill-name prefix (`github_create_issue` -> `github`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WordPress => "wordpress",
            Self::Notion => "notion",
            Self::GitHub => "github",
            Self::Vercel => "vercel",
        }
    }

    /// Name used in upstream error records.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::WordPress => "WordPress",
            Self::Notion => "Notion",
            Self::GitHub => "GitHub",
            Self::Vercel => "Vercel",
        }
    }

    /// Resolve the provider owning a skill name by its prefix.
    pub fn for_skill(skill: &str) -> Option<Self> {
        let (prefix, _) = skill.split_once('_')?;
        Self::ALL.into_iter().find(|p| p.as_str() == prefix)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

// --- Request/Response types ---

/// Body of `POST /skill-call`.
///
/// Both members are kept as raw JSON so the dispatcher can decide how a
/// malformed shape is reported instead of the extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillRequest {
    #[serde(default)]
    pub skill: Value,
    #[serde(default)]
    pub params: Value,
}

impl SkillRequest {
    pub fn new(skill: impl Into<String>, params: serde_json::Map<String, Value>) -> Self {
        Self {
            skill: Value::String(skill.into()),
            params: Value::Object(params),
        }
    }
}

/// In-band error returned with status 200 when a provider answers >= 400,
/// or when a skill cannot run in this deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub error: String,
}

impl ErrorRecord {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// `"<Provider> API Error <status>: <body>"`, with the body verbatim.
    pub fn upstream(provider: Provider, status: u16, body: &str) -> Self {
        Self::new(format!(
            "{} API Error {}: {}",
            provider.display_name(),
            status,
            body
        ))
    }

    /// Recognize an error record inside an arbitrary skill result.
    ///
    /// A provider payload that happens to carry a string `error` member is
    /// indistinguishable from one synthesized by the hub.
    pub fn from_value(value: &Value) -> Option<Self> {
        value
            .as_object()?
            .get("error")?
            .as_str()
            .map(Self::new)
    }

    pub fn into_value(self) -> Value {
        serde_json::json!({ "error": self.error })
    }
}

/// Response for `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubInfo {
    pub name: String,
    pub status: String,
    pub available_skills: Vec<String>,
    pub total_skills: usize,
}

impl HubInfo {
    pub fn operational(available_skills: Vec<String>) -> Self {
        Self {
            name: HUB_NAME.to_string(),
            status: HUB_STATUS_OPERATIONAL.to_string(),
            total_skills: available_skills.len(),
            available_skills,
        }
    }
}

/// Response for `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: HEALTH_STATUS_HEALTHY.to_string(),
        }
    }
}

/// Body of every non-200 hub response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}
