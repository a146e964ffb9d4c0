//! Message synthesis for missing form fields.
//!
//! The completeness checker decides which fields to ask for. A
//! [`MessageSynthesizer`] turns each of those facts into one sentence for the
//! user. Implementations:
//!
//! - [`LlmMessageSynthesizer`]: asks a language model, validates the reply
//! - [`TemplateMessageSynthesizer`]: fixed English sentence per field
//! - [`FnSynthesizer`]: any closure, handy for tests and embedding

mod llm;
mod template;
mod validator;

pub use llm::{extract_message, LlmMessageSynthesizer};
pub(crate) use llm::complete_with_retry;
pub use template::TemplateMessageSynthesizer;
pub use validator::{MessageValidationError, MessageValidator, MAX_MESSAGE_CHARS};

use async_trait::async_trait;
use ratematch_core::completeness::{FieldKey, MissingFieldDescriptor, MissingReason, UiType};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::providers::{ProviderError, TokenUsage};

/// Errors from message synthesis.
#[derive(Error, Debug, Clone)]
pub enum SynthesisError {
    #[error("Provider call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Unusable message: {0}")]
    InvalidMessage(#[from] MessageValidationError),

    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Message synthesis timed out after {0:?}")]
    Timeout(Duration),

    #[error("Circuit open for provider '{0}'")]
    CircuitOpen(String),
}

/// Everything a synthesizer learns about one missing field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRequest {
    pub key: FieldKey,
    pub ui_type: UiType,
    pub options: Vec<String>,
    pub reason: MissingReason,
}

impl From<&MissingFieldDescriptor> for MessageRequest {
    fn from(descriptor: &MissingFieldDescriptor) -> Self {
        Self {
            key: descriptor.key,
            ui_type: descriptor.ui_type,
            options: descriptor.options.clone().unwrap_or_default(),
            reason: descriptor.reason.clone(),
        }
    }
}

/// Where a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    Llm,
    Cache,
    Template,
    Custom,
}

/// A user-facing message for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedMessage {
    pub text: String,
    pub source: MessageSource,

    /// Tokens spent producing the message; zero unless `source` is `Llm`
    pub usage: TokenUsage,
}

impl SynthesizedMessage {
    pub fn new(text: impl Into<String>, source: MessageSource) -> Self {
        Self {
            text: text.into(),
            source,
            usage: TokenUsage::default(),
        }
    }
}

/// Turns a missing-field fact into a sentence for the user.
#[async_trait]
pub trait MessageSynthesizer: Send + Sync {
    async fn synthesize(&self, request: &MessageRequest) -> Result<SynthesizedMessage, SynthesisError>;

    /// Name for logs.
    fn name(&self) -> &str;
}

/// Adapts a plain function into a [`MessageSynthesizer`].
pub struct FnSynthesizer<F> {
    f: F,
}

impl<F> FnSynthesizer<F>
where
    F: Fn(&MessageRequest) -> String + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> MessageSynthesizer for FnSynthesizer<F>
where
    F: Fn(&MessageRequest) -> String + Send + Sync,
{
    async fn synthesize(&self, request: &MessageRequest) -> Result<SynthesizedMessage, SynthesisError> {
        Ok(SynthesizedMessage::new((self.f)(request), MessageSource::Custom))
    }

    fn name(&self) -> &str {
        "fn"
    }
}
