//! Language-model message synthesis.

use async_trait::async_trait;
use backon::Retryable;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    MessageRequest, MessageSource, MessageSynthesizer, MessageValidator, SynthesisError,
    SynthesizedMessage,
};
use crate::prompts::{build_field_prompt, SYSTEM_PROMPT};
use crate::providers::{ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError};
use crate::resilience::RetryConfig;

/// Asks an [`LlmProvider`] to write each message.
///
/// Each attempt is bounded by the completion timeout; transient provider
/// errors are retried with exponential backoff. The reply must be a JSON
/// object `{"message": "..."}` and the message must pass the
/// [`MessageValidator`].
pub struct LlmMessageSynthesizer {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
    retry: RetryConfig,
    validator: MessageValidator,
}

impl LlmMessageSynthesizer {
    pub fn new(provider: Arc<dyn LlmProvider>, completion: CompletionConfig) -> Self {
        Self {
            provider,
            completion,
            retry: RetryConfig::default(),
            validator: MessageValidator::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_validator(mut self, validator: MessageValidator) -> Self {
        self.validator = validator;
        self
    }
}

#[async_trait]
impl MessageSynthesizer for LlmMessageSynthesizer {
    async fn synthesize(&self, request: &MessageRequest) -> Result<SynthesizedMessage, SynthesisError> {
        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT.trim()),
            ChatMessage::user(build_field_prompt(request)),
        ];

        let response =
            complete_with_retry(self.provider.as_ref(), messages, &self.completion, &self.retry)
                .await?;

        let raw = extract_message(&response.content)?;
        let text = self.validator.validate(&raw)?;

        debug!(
            field = %request.key,
            tokens = response.usage.total(),
            "Synthesized field message"
        );

        Ok(SynthesizedMessage {
            text,
            source: MessageSource::Llm,
            usage: response.usage,
        })
    }

    fn name(&self) -> &str {
        self.provider.name()
    }
}

/// One completion with a per-attempt timeout, retrying transient failures.
pub(crate) async fn complete_with_retry(
    provider: &dyn LlmProvider,
    messages: Vec<ChatMessage>,
    config: &CompletionConfig,
    retry: &RetryConfig,
) -> Result<CompletionResponse, ProviderError> {
    let messages = &messages;

    let attempt = move || async move {
        match tokio::time::timeout(config.timeout, provider.complete(messages.clone(), config)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(config.timeout)),
        }
    };

    attempt
        .retry(retry.backoff())
        .when(ProviderError::is_retryable)
        .notify(|err: &ProviderError, delay: Duration| {
            warn!(provider = provider.name(), error = %err, ?delay, "Retrying provider call");
        })
        .await
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

/// Pull the message out of a model reply.
///
/// Accepts a bare JSON object, one wrapped in a Markdown code fence, or a
/// JSON object surrounded by stray prose.
pub fn extract_message(content: &str) -> Result<String, SynthesisError> {
    let body = strip_code_fence(content.trim());

    if let Ok(parsed) = serde_json::from_str::<MessageBody>(body) {
        return Ok(parsed.message);
    }

    if let (Some(start), Some(end)) = (body.find('{'), body.rfind('}')) {
        if start < end {
            if let Ok(parsed) = serde_json::from_str::<MessageBody>(&body[start..=end]) {
                return Ok(parsed.message);
            }
        }
    }

    let preview: String = body.chars().take(80).collect();
    Err(SynthesisError::MalformedOutput(format!(
        "expected {{\"message\": ...}}, got '{}'",
        preview
    )))
}

fn strip_code_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };

    // Drop the info string ("json") on the opening line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
