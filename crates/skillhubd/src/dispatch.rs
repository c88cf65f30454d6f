//! Skill-call dispatcher.
//!
//! Two error channels stay separate here. Local failures (bad request body,
//! missing or unknown skill, unbindable params, transport faults) are
//! `DispatchError`s and map to non-200 statuses. Provider failures arrive as
//! in-band error records inside an `Ok` value and are returned with 200.

use axum::http::StatusCode;
use serde_json::{Map, Value};
use skillhub_core::{ErrorRecord, SkillRequest};
use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::providers::{truthy, ProviderError, Providers};
use crate::registry::SkillRegistry;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid request body: {0}")]
    MalformedBody(String),

    #[error("Missing 'skill' parameter")]
    MissingSkill,

    #[error("Skill '{name}' not found. Available: {}", format_names(.available))]
    UnknownSkill {
        name: String,
        available: Vec<String>,
    },

    #[error("invalid params for skill '{skill}': {message}")]
    InvalidParams { skill: String, message: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl DispatchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingSkill => StatusCode::BAD_REQUEST,
            Self::UnknownSkill { .. } => StatusCode::NOT_FOUND,
            Self::MalformedBody(_) | Self::InvalidParams { .. } | Self::Provider(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text for the `detail` member of the error response.
    pub fn detail(&self) -> String {
        self.to_string()
    }
}

/// Render names as a bracketed, single-quoted list: `['a', 'b']`.
fn format_names(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    format!("[{}]", quoted.join(", "))
}

/// Routes skill calls to provider clients.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: SkillRegistry,
    providers: Providers,
}

impl Dispatcher {
    pub fn new(registry: SkillRegistry, providers: Providers) -> Self {
        Self {
            registry,
            providers,
        }
    }

    pub fn registry(&self) -> &SkillRegistry {
        &self.registry
    }

    /// Dispatch a raw `POST /skill-call` body.
    pub async fn dispatch(&self, body: &[u8]) -> Result<Value, DispatchError> {
        let payload: Value = serde_json::from_slice(body)
            .map_err(|e| DispatchError::MalformedBody(e.to_string()))?;
        if !payload.is_object() {
            return Err(DispatchError::MalformedBody(
                "expected a JSON object".to_string(),
            ));
        }
        let request: SkillRequest = serde_json::from_value(payload)
            .map_err(|e| DispatchError::MalformedBody(e.to_string()))?;
        self.call(request).await
    }

    /// Resolve and run one skill request.
    ///
    /// A falsy `skill` is [`DispatchError::MissingSkill`]. Any other
    /// non-string value is looked up by its JSON text (`true`, `["x"]`),
    /// which never names a skill, so it ends as [`DispatchError::UnknownSkill`].
    pub async fn call(&self, request: SkillRequest) -> Result<Value, DispatchError> {
        let name = match request.skill {
            Value::String(name) if !name.is_empty() => name,
            ref other if !truthy(other) => return Err(DispatchError::MissingSkill),
            // Non-string names can never match a registered skill.
            other => other.to_string(),
        };

        let Some(skill) = self.registry.lookup(&name) else {
            warn!(skill = %name, "unknown skill");
            return Err(DispatchError::UnknownSkill {
                name,
                available: self.registry.names(),
            });
        };

        let params = match request.params {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(DispatchError::InvalidParams {
                    skill: name,
                    message: format!("params must be an object, got {other}"),
                })
            }
        };

        let span = info_span!(
            "skill_call",
            call_id = %Uuid::now_v7(),
            skill = skill.name(),
            provider = %skill.provider(),
        );

        async move {
            info!(params = params.len(), "dispatching");
            match skill.invoke(&self.providers, params).await {
                Ok(value) => {
                    if let Some(record) = ErrorRecord::from_value(&value) {
                        warn!(error = %record.error, "skill returned an error record");
                    } else {
                        info!("skill completed");
                    }
                    Ok(value)
                }
                Err(e) => {
                    error!(error = %e, "skill failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}
