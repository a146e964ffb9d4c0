//! Usage accounting for one completeness check.

use serde::{Deserialize, Serialize};

use crate::messages::{MessageSource, SynthesizedMessage};
use crate::providers::TokenUsage;

/// Accumulated LLM usage for a check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmUsage {
    /// Total tokens used
    pub total_tokens: u32,

    /// Prompt/input tokens
    pub prompt_tokens: u32,

    /// Completion/output tokens
    pub completion_tokens: u32,

    /// Number of messages the model wrote
    pub llm_calls: u32,

    /// Messages served from the cache
    pub cache_hits: u32,

    /// Messages written from templates, offline or as a fallback
    pub fallbacks: u32,
}

impl LlmUsage {
    /// Add token usage from a provider response.
    pub fn add(&mut self, usage: &TokenUsage) {
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
        self.total_tokens += usage.total();
        self.llm_calls += 1;
    }

    /// Account for one delivered message.
    pub fn record(&mut self, message: &SynthesizedMessage) {
        match message.source {
            MessageSource::Llm => self.add(&message.usage),
            MessageSource::Cache => self.cache_hits += 1,
            MessageSource::Template => self.fallbacks += 1,
            MessageSource::Custom => {}
        }
    }
}
