//! Runtime configuration.
//!
//! Loaded from YAML. Every section has defaults, so an empty document is a
//! valid configuration. Secrets are never read from the file on their own:
//! the provider falls back to environment variables when the file omits them.
//!
//! ```yaml
//! provider:
//!   type: openai
//!   base_url: https://api.poe.com/v1
//! completion:
//!   model: GPT-5
//!   temperature: 0.7
//!   timeout: 30s
//!   deadline: 90s
//! retry:
//!   max_retries: 3
//!   initial_backoff: 1s
//! fallback:
//!   type: template
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::cache::CacheConfig;
use crate::providers::secrets::env_var;
use crate::providers::CompletionConfig;
use crate::resilience::{CircuitBreakerConfig, FallbackStrategy, RetryConfig};

/// Environment variable naming the model when the config omits it.
pub const MODEL_NAME_ENV: &str = "MODEL_NAME";

/// Model used when neither the config nor the environment names one.
pub const DEFAULT_MODEL: &str = "GPT-5";

/// Durations as human-readable strings: `"30s"`, `"1h 30m"`, `"250ms"`.
pub mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Which provider to build and how to reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    #[serde(rename = "type")]
    pub kind: String,

    /// Overrides `OPENAI_API_KEY`; prefer the environment
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Overrides `OPENAI_BASE_URL`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: "openai".to_string(),
            api_key: None,
            base_url: None,
        }
    }
}

impl ProviderSettings {
    /// Provider JSON for [`crate::providers::ProviderRegistry::create`].
    pub fn to_json(&self) -> JsonValue {
        let mut config = serde_json::Map::new();
        if let Some(key) = &self.api_key {
            config.insert("api_key".to_string(), JsonValue::String(key.clone()));
        }
        if let Some(url) = &self.base_url {
            config.insert("base_url".to_string(), JsonValue::String(url.clone()));
        }
        JsonValue::Object(config)
    }
}

/// Model call settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// Falls back to `MODEL_NAME`, then [`DEFAULT_MODEL`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    pub temperature: f32,

    pub max_tokens: u32,

    /// Bound on one provider call
    #[serde(with = "humantime_duration")]
    pub timeout: Duration,

    /// Bound on one field's message, retries included
    #[serde(with = "humantime_duration")]
    pub deadline: Duration,

    /// Ask the provider for a JSON object response
    pub json_mode: bool,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.7,
            max_tokens: 300,
            timeout: Duration::from_secs(30),
            deadline: Duration::from_secs(90),
            json_mode: false,
        }
    }
}

impl CompletionSettings {
    pub fn resolve_model(&self) -> String {
        self.model
            .clone()
            .or_else(|| env_var(MODEL_NAME_ENV))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }
}

/// How many fields are synthesized at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    pub max_in_flight: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self { max_in_flight: 4 }
    }
}

/// Full runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub provider: ProviderSettings,
    pub completion: CompletionSettings,
    pub retry: RetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub cache: CacheConfig,
    pub fallback: FallbackStrategy,
    pub concurrency: ConcurrencyConfig,
}

impl RuntimeConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Reject settings no provider call could honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.kind.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.type must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(ConfigError::Invalid(format!(
                "completion.temperature must be within 0.0..=2.0, got {}",
                self.completion.temperature
            )));
        }
        if self.completion.max_tokens == 0 {
            return Err(ConfigError::Invalid("completion.max_tokens must be positive".into()));
        }
        if self.completion.timeout.is_zero() || self.completion.deadline.is_zero() {
            return Err(ConfigError::Invalid(
                "completion.timeout and completion.deadline must be positive".into(),
            ));
        }
        if self.concurrency.max_in_flight == 0 {
            return Err(ConfigError::Invalid(
                "concurrency.max_in_flight must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Settings for one provider call.
    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            model: self.completion.resolve_model(),
            max_tokens: self.completion.max_tokens,
            temperature: self.completion.temperature,
            timeout: self.completion.timeout,
            json_response: self.completion.json_mode,
        }
    }
}
