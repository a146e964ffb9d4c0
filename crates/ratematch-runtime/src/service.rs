//! Missing-fields service.
//!
//! Runs the deterministic completeness check, then asks the configured
//! [`MessageSynthesizer`] for one sentence per missing field:
//! - Fan-out is bounded by `concurrency.max_in_flight` and keeps rule-table order
//! - Model-written messages are cached per request
//! - Each field has a deadline and goes through the circuit breaker
//! - On failure the fallback strategy either fails the request or uses templates
//!
//! The set of missing fields never depends on the model. Synthesis only
//! decides the wording.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use ratematch_core::completeness::{
    FieldKey, FormCompletenessChecker, MissingFieldDescriptor, MortgageFormData, UiType,
};
use ratematch_core::{Catalog, FilterCriteria, ProductListing};

use crate::cache::MessageCache;
use crate::config::{ConfigError, RuntimeConfig};
use crate::messages::{
    complete_with_retry, LlmMessageSynthesizer, MessageRequest, MessageSource,
    MessageSynthesizer, SynthesisError, SynthesizedMessage, TemplateMessageSynthesizer,
};
use crate::providers::{ChatMessage, LlmProvider, ProviderError, ProviderRegistry, TokenUsage};
use crate::resilience::{CircuitBreaker, CircuitState, FallbackStrategy};
use crate::usage::LlmUsage;

/// Errors from the missing-fields service.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// Display stays generic; the cause is available through `source()`
    #[error("Failed to generate a message for field '{field}'")]
    Synthesis {
        field: FieldKey,
        #[source]
        source: SynthesisError,
    },

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Circuit open for provider '{0}'")]
    CircuitOpen(String),

    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// One missing field as the UI receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingFieldItem {
    pub key: FieldKey,

    pub message: String,

    #[serde(rename = "type")]
    pub ui_type: UiType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl MissingFieldItem {
    fn new(descriptor: MissingFieldDescriptor, message: String) -> Self {
        Self {
            key: descriptor.key,
            message,
            ui_type: descriptor.ui_type,
            options: descriptor.options,
        }
    }
}

/// `{ "missingFields": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckMissingFieldsResponse {
    pub missing_fields: Vec<MissingFieldItem>,
}

/// Response plus accounting for one check.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub response: CheckMissingFieldsResponse,
    pub usage: LlmUsage,
    pub completed_at: DateTime<Utc>,
}

impl CheckReport {
    pub fn is_complete(&self) -> bool {
        self.response.missing_fields.is_empty()
    }
}

/// `{ "response": "..." }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,

    #[serde(skip)]
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderHealth {
    pub name: String,
    pub healthy: bool,
    pub circuit: String,
}

/// `{ "status": "ok" }`, plus provider details when one is configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderHealth>,
}

pub struct MissingFieldsService {
    /// Needed for chat and health; absent when running offline
    provider: Option<Arc<dyn LlmProvider>>,

    synthesizer: Arc<dyn MessageSynthesizer>,

    template: TemplateMessageSynthesizer,

    checker: FormCompletenessChecker,

    cache: MessageCache,

    circuit_breaker: CircuitBreaker,

    config: RuntimeConfig,
}

impl MissingFieldsService {
    pub fn builder() -> MissingFieldsServiceBuilder {
        MissingFieldsServiceBuilder::new()
    }

    /// Build the provider named in `config` and synthesize with it.
    pub fn from_config(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        let provider = ProviderRegistry::with_defaults()
            .create(&config.provider.kind, &config.provider.to_json())?;

        Self::builder().provider(provider).config(config).build()
    }

    /// Template messages only; no provider, no credentials.
    pub fn offline(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        Self::builder()
            .synthesizer(Arc::new(TemplateMessageSynthesizer::new()))
            .config(config)
            .build()
    }

    /// Filter the catalog into `{ total, products }`.
    pub fn recommend(&self, catalog: &Catalog, criteria: Option<&FilterCriteria>) -> ProductListing {
        ratematch_core::recommend(catalog, criteria)
    }

    /// Check a form and phrase a message for every missing field.
    ///
    /// Fields come back in rule-table order regardless of which message
    /// finished first. A complete form makes no synthesis calls.
    pub async fn check(&self, form: &MortgageFormData) -> Result<CheckReport, RuntimeError> {
        let missing = self.checker.check(form);
        debug!(missing = missing.len(), "Completeness check finished");

        let messages: Vec<SynthesizedMessage> = stream::iter(missing.iter())
            .map(|descriptor| self.message_for(descriptor))
            .buffered(self.config.concurrency.max_in_flight)
            .try_collect()
            .await?;

        let mut usage = LlmUsage::default();
        let missing_fields = missing
            .into_iter()
            .zip(messages)
            .map(|(descriptor, message)| {
                usage.record(&message);
                MissingFieldItem::new(descriptor, message.text)
            })
            .collect();

        info!(
            llm_calls = usage.llm_calls,
            cache_hits = usage.cache_hits,
            fallbacks = usage.fallbacks,
            tokens = usage.total_tokens,
            "Missing-fields check complete"
        );

        Ok(CheckReport {
            response: CheckMissingFieldsResponse { missing_fields },
            usage,
            completed_at: Utc::now(),
        })
    }

    /// Message for one field: cache, then circuit, then synthesizer under a deadline.
    async fn message_for(
        &self,
        descriptor: &MissingFieldDescriptor,
    ) -> Result<SynthesizedMessage, RuntimeError> {
        let request = MessageRequest::from(descriptor);

        if let Some(text) = self.cache.get(&request).await {
            debug!(field = %request.key, "Message cache hit");
            return Ok(SynthesizedMessage::new(text, MessageSource::Cache));
        }

        let name = self.synthesizer.name();
        if self.circuit_breaker.is_open(name) {
            warn!(field = %request.key, provider = name, "Circuit open, skipping synthesis");
            return self.fallback(&request, SynthesisError::CircuitOpen(name.to_string()));
        }

        let deadline = self.config.completion.deadline;
        match tokio::time::timeout(deadline, self.synthesizer.synthesize(&request)).await {
            Ok(Ok(message)) => {
                self.circuit_breaker.record_success(name);
                if message.source == MessageSource::Llm {
                    self.cache.insert(request, message.text.clone()).await;
                }
                Ok(message)
            }
            Ok(Err(e)) => {
                warn!(field = %request.key, error = %e, "Message synthesis failed");
                self.circuit_breaker.record_failure(name);
                self.fallback(&request, e)
            }
            Err(_) => {
                warn!(field = %request.key, timeout = ?deadline, "Message synthesis timed out");
                self.circuit_breaker.record_failure(name);
                self.fallback(&request, SynthesisError::Timeout(deadline))
            }
        }
    }

    fn fallback(
        &self,
        request: &MessageRequest,
        error: SynthesisError,
    ) -> Result<SynthesizedMessage, RuntimeError> {
        match self.config.fallback {
            FallbackStrategy::Fail => Err(RuntimeError::Synthesis {
                field: request.key,
                source: error,
            }),
            FallbackStrategy::Template => {
                info!(field = %request.key, "Using template message");
                Ok(SynthesizedMessage::new(
                    self.template.render(request),
                    MessageSource::Template,
                ))
            }
        }
    }

    /// Forward a free-form message to the model and return its reply.
    pub async fn chat(&self, message: &str) -> Result<ChatReply, RuntimeError> {
        if message.trim().is_empty() {
            return Err(RuntimeError::EmptyMessage);
        }

        let provider = self.provider.as_ref().ok_or_else(|| {
            RuntimeError::ProviderNotConfigured("chat needs an LLM provider".to_string())
        })?;

        let name = provider.name();
        if self.circuit_breaker.is_open(name) {
            return Err(RuntimeError::CircuitOpen(name.to_string()));
        }

        let config = self.config.completion_config();
        match complete_with_retry(
            provider.as_ref(),
            vec![ChatMessage::user(message)],
            &config,
            &self.config.retry,
        )
        .await
        {
            Ok(response) => {
                self.circuit_breaker.record_success(name);
                Ok(ChatReply {
                    response: response.content,
                    usage: response.usage,
                })
            }
            Err(e) => {
                self.circuit_breaker.record_failure(name);
                Err(RuntimeError::Provider(e))
            }
        }
    }

    pub async fn health(&self) -> HealthReport {
        let provider = match &self.provider {
            Some(provider) => Some(ProviderHealth {
                name: provider.name().to_string(),
                healthy: provider.health_check().await,
                circuit: circuit_label(self.circuit_breaker.state(provider.name())).to_string(),
            }),
            None => None,
        };

        HealthReport {
            status: "ok".to_string(),
            provider,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Drop cached messages and close every circuit.
    pub fn reset(&self) {
        self.cache.invalidate_all();
        self.circuit_breaker.reset();
    }
}

fn circuit_label(state: CircuitState) -> &'static str {
    match state {
        CircuitState::Closed { .. } => "closed",
        CircuitState::Open { .. } => "open",
        CircuitState::HalfOpen { .. } => "half_open",
    }
}

/// Builder for [`MissingFieldsService`].
pub struct MissingFieldsServiceBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    synthesizer: Option<Arc<dyn MessageSynthesizer>>,
    config: RuntimeConfig,
}

impl MissingFieldsServiceBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            synthesizer: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the LLM provider. Without an explicit synthesizer, messages are
    /// written by an [`LlmMessageSynthesizer`] over this provider.
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn synthesizer(mut self, synthesizer: Arc<dyn MessageSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<MissingFieldsService, RuntimeError> {
        self.config.validate()?;

        let synthesizer: Arc<dyn MessageSynthesizer> = match (self.synthesizer, &self.provider) {
            (Some(synthesizer), _) => synthesizer,
            (None, Some(provider)) => Arc::new(
                LlmMessageSynthesizer::new(provider.clone(), self.config.completion_config())
                    .with_retry(self.config.retry.clone()),
            ),
            (None, None) => {
                return Err(RuntimeError::ProviderNotConfigured(
                    "No provider or synthesizer set".to_string(),
                ))
            }
        };

        Ok(MissingFieldsService {
            provider: self.provider,
            synthesizer,
            template: TemplateMessageSynthesizer::new(),
            checker: FormCompletenessChecker::new(),
            cache: MessageCache::from_config(&self.config.cache),
            circuit_breaker: CircuitBreaker::new(self.config.circuit_breaker.clone()),
            config: self.config,
        })
    }
}

impl Default for MissingFieldsServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{CompletionConfig, CompletionResponse};
    use crate::resilience::{CircuitBreakerConfig, RetryConfig};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Answers every field prompt with a valid message naming the field.
    struct FieldEchoProvider {
        calls: AtomicU32,
        fail: bool,
    }

    impl FieldEchoProvider {
        fn working() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail: false,
            })
        }

        fn broken() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail: true,
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for FieldEchoProvider {
        async fn complete(
            &self,
            messages: Vec<ChatMessage>,
            _config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::AuthError);
            }

            let last = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
            let content = match last.lines().next().and_then(|l| l.strip_prefix("Field: ")) {
                Some(field) => format!(r#"{{"message": "Could you share your {}?"}}"#, field),
                None => format!("You said: {}", last),
            };

            Ok(CompletionResponse {
                content,
                usage: TokenUsage {
                    prompt_tokens: 50,
                    completion_tokens: 10,
                },
                model: "mock".to_string(),
                stop_reason: Some("stop".to_string()),
            })
        }

        async fn health_check(&self) -> bool {
            !self.fail
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn test_config() -> RuntimeConfig {
        RuntimeConfig {
            retry: RetryConfig::disabled(),
            ..RuntimeConfig::default()
        }
    }

    fn service(provider: Arc<FieldEchoProvider>, config: RuntimeConfig) -> MissingFieldsService {
        MissingFieldsService::builder()
            .provider(provider)
            .config(config)
            .build()
            .unwrap()
    }

    fn complete_form() -> MortgageFormData {
        MortgageFormData::from_json(
            r#"{
                "mortgageType": "purchase",
                "zipCode": 94110,
                "purchasePrice": 900000,
                "downPayment": 180000,
                "creditScore": [740, 779],
                "loanTerm": 30,
                "armOrFixed": "fix",
                "showFhaLoans": false,
                "showVaLoans": false
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_form_lists_every_field_in_order() {
        let provider = FieldEchoProvider::working();
        let service = service(provider.clone(), test_config());

        let report = service.check(&MortgageFormData::default()).await.unwrap();
        let keys: Vec<FieldKey> = report.response.missing_fields.iter().map(|f| f.key).collect();
        assert_eq!(keys, FieldKey::ALL.to_vec());

        let first = &report.response.missing_fields[0];
        assert_eq!(first.message, "Could you share your mortgageType?");
        assert_eq!(first.ui_type, UiType::Select);
        assert_eq!(
            first.options,
            Some(vec!["purchase".to_string(), "refinance".to_string()])
        );

        assert_eq!(report.usage.llm_calls, 9);
        assert_eq!(report.usage.total_tokens, 540);
        assert_eq!(provider.calls(), 9);
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_complete_form_makes_no_calls() {
        let provider = FieldEchoProvider::working();
        let service = service(provider.clone(), test_config());

        let report = service.check(&complete_form()).await.unwrap();
        assert!(report.is_complete());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_repeat_check_is_served_from_cache() {
        let provider = FieldEchoProvider::working();
        let service = service(provider.clone(), test_config());
        let form = MortgageFormData::from_json(r#"{"zipCode": null}"#).unwrap();

        let first = service.check(&form).await.unwrap();
        let second = service.check(&form).await.unwrap();

        assert_eq!(first.response, second.response);
        assert_eq!(second.usage.cache_hits, 9);
        assert_eq!(second.usage.llm_calls, 0);
        assert_eq!(provider.calls(), 9);
    }

    #[tokio::test]
    async fn test_fail_strategy_surfaces_generic_error() {
        let service = service(FieldEchoProvider::broken(), test_config());

        let err = service.check(&MortgageFormData::default()).await.unwrap_err();
        match &err {
            RuntimeError::Synthesis { source, .. } => {
                assert!(matches!(source, SynthesisError::Provider(ProviderError::AuthError)))
            }
            other => panic!("expected synthesis error, got {:?}", other),
        }
        assert!(err.to_string().starts_with("Failed to generate a message"));
    }

    #[tokio::test]
    async fn test_template_fallback_and_circuit() {
        let provider = FieldEchoProvider::broken();
        let config = RuntimeConfig {
            fallback: FallbackStrategy::Template,
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: 1,
                ..CircuitBreakerConfig::default()
            },
            ..test_config()
        };
        let service = service(provider.clone(), config);

        let report = service.check(&MortgageFormData::default()).await.unwrap();
        assert_eq!(report.response.missing_fields.len(), 9);
        assert_eq!(report.usage.fallbacks, 9);
        assert_eq!(report.usage.llm_calls, 0);

        // The circuit is now open, so the provider is left alone
        let calls_after_first = provider.calls();
        service.check(&MortgageFormData::default()).await.unwrap();
        assert_eq!(provider.calls(), calls_after_first);

        let health = service.health().await;
        assert_eq!(health.status, "ok");
        let provider_health = health.provider.unwrap();
        assert!(!provider_health.healthy);
        assert_eq!(provider_health.circuit, "open");
    }

    #[tokio::test]
    async fn test_offline_service() {
        let service = MissingFieldsService::offline(RuntimeConfig::default()).unwrap();

        let report = service.check(&MortgageFormData::default()).await.unwrap();
        assert_eq!(report.response.missing_fields.len(), 9);
        assert_eq!(report.usage.total_tokens, 0);

        assert!(matches!(
            service.chat("hello").await,
            Err(RuntimeError::ProviderNotConfigured(_))
        ));
        assert_eq!(service.health().await.provider, None);
    }

    #[tokio::test]
    async fn test_chat_passthrough() {
        let service = service(FieldEchoProvider::working(), test_config());

        let reply = service.chat("What is an ARM?").await.unwrap();
        assert_eq!(reply.response, "You said: What is an ARM?");
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            serde_json::json!({"response": "You said: What is an ARM?"})
        );

        assert!(matches!(service.chat("   ").await, Err(RuntimeError::EmptyMessage)));
    }

    #[tokio::test]
    async fn test_response_wire_format() {
        let service = MissingFieldsService::offline(RuntimeConfig::default()).unwrap();
        let form = MortgageFormData::from_json(
            r#"{
                "mortgageType": "purchase",
                "zipCode": 94110,
                "purchasePrice": 900000,
                "downPayment": 180000,
                "creditScore": [740, 779],
                "armOrFixed": "fix",
                "showFhaLoans": false,
                "showVaLoans": false
            }"#,
        )
        .unwrap();

        let report = service.check(&form).await.unwrap();
        let value = serde_json::to_value(&report.response).unwrap();
        let fields = value["missingFields"].as_array().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0]["key"], "loanTerm");
        assert_eq!(fields[0]["type"], "input");
        assert!(fields[0].get("options").is_none());
        assert!(fields[0]["message"].as_str().unwrap().len() > 0);
    }

    #[test]
    fn test_builder_requires_provider_or_synthesizer() {
        assert!(matches!(
            MissingFieldsService::builder().build(),
            Err(RuntimeError::ProviderNotConfigured(_))
        ));
    }

    #[test]
    fn test_recommend_wraps_listing() {
        let service = MissingFieldsService::offline(RuntimeConfig::default()).unwrap();
        let catalog = Catalog::new(vec![]).unwrap();
        let listing = service.recommend(&catalog, None);
        assert_eq!(listing.total, 0);
    }
}
