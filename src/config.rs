// file: src/config.rs
// description: application configuration management with toml and environment support
// reference: https://docs.rs/config

use crate::error::{ApiError, Result};
use crate::utils::validation::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "ATLASSIAN_MCP";

/// Conventional variable names, applied on top of the prefixed ones.
const ENV_ALIASES: &[(&str, &str)] = &[
    ("CONFLUENCE_URL", "confluence.base_url"),
    ("CONFLUENCE_USERNAME", "confluence.username"),
    ("CONFLUENCE_API_TOKEN", "confluence.api_token"),
    ("JIRA_URL", "jira.base_url"),
    ("JIRA_USERNAME", "jira.username"),
    ("JIRA_API_TOKEN", "jira.api_token"),
];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub confluence: ServiceConfig,
    #[serde(default)]
    pub jira: ServiceConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub api_token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    pub timeout_secs: u64,
    pub default_limit: usize,
    pub max_limit: usize,
}

impl ServiceConfig {
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve a caller-supplied limit against the configured default and ceiling.
    pub fn effective_limit(&self, requested: Option<usize>) -> Result<usize> {
        let limit = requested.unwrap_or(self.default_limit);
        Validator::validate_limit(limit)?;
        Ok(limit.min(self.max_limit))
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = Self::default_config();
        let mut builder = config::Config::builder()
            .set_default("client.timeout_secs", defaults.client.timeout_secs)
            .and_then(|b| b.set_default("client.default_limit", defaults.client.default_limit as u64))
            .and_then(|b| b.set_default("client.max_limit", defaults.client.max_limit as u64))
            .map_err(|e| ApiError::Config(e.to_string()))?;

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path)),
            None => builder
                .add_source(config::File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false)),
        };

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in ENV_ALIASES {
            builder = builder
                .set_override_option(*key, std::env::var(var).ok())
                .map_err(|e| ApiError::Config(e.to_string()))?;
        }

        let settings = builder
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        config.confluence.base_url = Validator::normalize_base_url(&config.confluence.base_url);
        config.jira.base_url = Validator::normalize_base_url(&config.jira.base_url);

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            confluence: ServiceConfig::default(),
            jira: ServiceConfig::default(),
            client: ClientConfig {
                timeout_secs: 30,
                default_limit: 10,
                max_limit: 50,
            },
        }
    }

    pub fn config_path_or_default(path: Option<PathBuf>) -> PathBuf {
        path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Copy of the configuration that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for service in [&mut copy.confluence, &mut copy.jira] {
            if !service.api_token.is_empty() {
                service.api_token = "********".to_string();
            }
        }
        copy
    }

    fn validate(&self) -> Result<()> {
        if !self.confluence.is_configured() && !self.jira.is_configured() {
            return Err(ApiError::Config(
                "at least one of confluence.base_url or jira.base_url must be set".to_string(),
            ));
        }

        for (name, service) in [("confluence", &self.confluence), ("jira", &self.jira)] {
            if service.is_configured() {
                Validator::validate_url(&service.base_url)
                    .map_err(|e| ApiError::Config(format!("{name}.base_url: {e}")))?;
            }
        }

        if self.client.timeout_secs == 0 {
            return Err(ApiError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.client.default_limit == 0 || self.client.max_limit == 0 {
            return Err(ApiError::Config(
                "default_limit and max_limit must be greater than 0".to_string(),
            ));
        }

        if self.client.default_limit > self.client.max_limit {
            return Err(ApiError::Config(
                "default_limit must not exceed max_limit".to_string(),
            ));
        }

        Ok(())
    }
}
