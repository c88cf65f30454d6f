//! Provider credentials and endpoints.
//!
//! Read once at process start and never mutated afterwards.
//! Precedence: process environment > env file > defaults.
//! Missing credentials stay empty; the provider then rejects the call.

use crate::types::Provider;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com/v1";
pub const DEFAULT_VERCEL_API_URL: &str = "https://api.vercel.com";

/// Every key the hub reads, in the order they are documented.
pub const CONFIG_KEYS: [&str; 9] = [
    "GITHUB_TOKEN",
    "NOTION_TOKEN",
    "VERCEL_TOKEN",
    "WORDPRESS_URL",
    "WORDPRESS_USERNAME",
    "WORDPRESS_PASSWORD",
    "GITHUB_API_URL",
    "NOTION_API_URL",
    "VERCEL_API_URL",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read env file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid env file line {line_no} in {source_name}: {line}")]
    InvalidLine {
        source_name: String,
        line_no: usize,
        line: String,
    },
}

/// Hub configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub github_token: String,
    pub notion_token: String,
    pub vercel_token: String,

    pub wordpress_url: String,
    pub wordpress_username: String,
    pub wordpress_password: String,

    // Provider base URLs (overridable for tests and self-hosted installs)
    pub github_api_url: String,
    pub notion_api_url: String,
    pub vercel_api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: String::new(),
            notion_token: String::new(),
            vercel_token: String::new(),
            wordpress_url: String::new(),
            wordpress_username: String::new(),
            wordpress_password: String::new(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            notion_api_url: DEFAULT_NOTION_API_URL.to_string(),
            vercel_api_url: DEFAULT_VERCEL_API_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &redact(&self.github_token))
            .field("notion_token", &redact(&self.notion_token))
            .field("vercel_token", &redact(&self.vercel_token))
            .field("wordpress_url", &self.wordpress_url)
            .field("wordpress_username", &self.wordpress_username)
            .field("wordpress_password", &redact(&self.wordpress_password))
            .field("github_api_url", &self.github_api_url)
            .field("notion_api_url", &self.notion_api_url)
            .field("vercel_api_url", &self.vercel_api_url)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl Config {
    /// Build config from the process environment only.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_lookup(lookup);
        config
    }

    /// Load an env file, then let the process environment override it.
    pub fn load(env_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = env_file {
            config.load_file(path)?;
        }
        config.apply_lookup(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Merge values from a dotenv-style file.
    pub fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_content(&content, &path.display().to_string())
    }

    /// Overlay every key the lookup knows about.
    fn apply_lookup<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in CONFIG_KEYS {
            if let Some(value) = lookup(key) {
                self.apply_value(key, &value);
            }
        }
    }

    /// Parse `KEY=value` lines.
    fn parse_content(&mut self, content: &str, source: &str) -> Result<(), ConfigError> {
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);

            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ConfigError::InvalidLine {
                    source_name: source.to_string(),
                    line_no: idx + 1,
                    line: line.to_string(),
                });
            };

            let value = Self::unquote(value.trim());
            self.apply_value(key.trim(), &value);
        }
        Ok(())
    }

    /// Remove surrounding quotes from a value.
    fn unquote(value: &str) -> String {
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            return value[1..value.len() - 1].to_string();
        }
        value.to_string()
    }

    /// Apply a single value. Keys the hub does not use are ignored, since
    /// env files are usually shared with other tools.
    fn apply_value(&mut self, key: &str, value: &str) {
        let value = value.to_string();
        match key {
            "GITHUB_TOKEN" => self.github_token = value,
            "NOTION_TOKEN" => self.notion_token = value,
            "VERCEL_TOKEN" => self.vercel_token = value,
            "WORDPRESS_URL" => self.wordpress_url = value,
            "WORDPRESS_USERNAME" => self.wordpress_username = value,
            "WORDPRESS_PASSWORD" => self.wordpress_password = value,
            "GITHUB_API_URL" => self.github_api_url = value,
            "NOTION_API_URL" => self.notion_api_url = value,
            "VERCEL_API_URL" => self.vercel_api_url = value,
            _ => {}
        }
    }

    /// Providers whose credentials are non-empty.
    ///
    /// Informational only: calls to unconfigured providers are still sent.
    pub fn configured_providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|provider| match provider {
                Provider::GitHub => !self.github_token.is_empty(),
                Provider::Notion => !self.notion_token.is_empty(),
                Provider::Vercel => !self.vercel_token.is_empty(),
                Provider::WordPress => {
                    !self.wordpress_url.is_empty()
                        && !self.wordpress_username.is_empty()
                        && !self.wordpress_password.is_empty()
                }
            })
            .collect()
    }
}

/// Default env file location (`~/.config/skillhub/env` on Linux).
pub fn default_env_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("skillhub").join("env"))
}
