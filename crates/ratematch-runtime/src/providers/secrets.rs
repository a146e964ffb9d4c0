//! Credential handling for LLM providers.
//!
//! API keys are wrapped in [`secrecy::SecretString`] as soon as they are read
//! and only exposed when the request header is built. `Debug` and `Display`
//! never print the key.
//!
//! Environment lookups are case-insensitive, so `OPENAI_API_KEY` and
//! `openai_api_key` both resolve.
//!
//! ```ignore
//! let key = ApiCredential::from_config_or_env(&config, "api_key", "OPENAI_API_KEY", "OpenAI API key")?;
//! request.bearer_auth(key.expose());
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

use super::ProviderError;

/// Where a credential was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Configuration file or provider JSON
    Config,
    /// Environment variable (including `.env`)
    Environment,
    /// Passed in by the caller
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Config => write!(f, "config"),
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// Read an environment variable, matching its name case-insensitively.
///
/// An exact match wins; otherwise the first variable whose name matches
/// ignoring ASCII case is used. Empty values count as unset.
pub fn env_var(name: &str) -> Option<String> {
    if let Ok(value) = std::env::var(name) {
        return (!value.is_empty()).then_some(value);
    }

    std::env::vars()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// An API key that never shows up in logs.
#[derive(Clone)]
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Wrap a key.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load from an environment variable.
    pub fn from_env(env: &str, name: &'static str) -> Result<Self, ProviderError> {
        env_var(env)
            .map(|v| Self::new(v, CredentialSource::Environment, name))
            .ok_or_else(|| {
                ProviderError::NotConfigured(format!(
                    "{} not set: configure '{}' environment variable",
                    name, env
                ))
            })
    }

    /// Load from `config[config_key]`, falling back to `env`.
    pub fn from_config_or_env(
        config: &JsonValue,
        config_key: &str,
        env: &str,
        name: &'static str,
    ) -> Result<Self, ProviderError> {
        if let Some(value) = config[config_key].as_str().filter(|v| !v.is_empty()) {
            return Ok(Self::new(value, CredentialSource::Config, name));
        }

        Self::from_env(env, name).map_err(|_| {
            ProviderError::NotConfigured(format!(
                "{} required: set '{}' in config or {} environment variable",
                name, config_key, env
            ))
        })
    }

    /// Whether a key could be loaded, without loading it.
    pub fn is_available(config: &JsonValue, config_key: &str, env: &str) -> bool {
        config[config_key].as_str().is_some_and(|v| !v.is_empty()) || env_var(env).is_some()
    }

    /// The raw key. Call only where the header is built.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}
