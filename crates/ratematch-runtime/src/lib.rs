//! # ratematch-runtime
//!
//! LLM-assisted wording for ratematch missing-field checks.
//!
//! `ratematch-core` decides which fields are missing and which products
//! match, without ever calling a model. This crate turns each missing field
//! into a short, friendly message for the user.
//!
//! ## Important
//!
//! The model only ever chooses wording. If it fails, times out, or writes an
//! unusable message, the configured fallback either fails the request or
//! substitutes a fixed template sentence. The set of missing fields is
//! identical either way.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ratematch_runtime::{MissingFieldsService, RuntimeConfig};
//! use ratematch_core::MortgageFormData;
//!
//! let config = RuntimeConfig::from_yaml_file("config/ratematch.yaml")?;
//! let service = MissingFieldsService::from_config(config)?;
//!
//! let form = MortgageFormData::from_json(r#"{"zipCode": 94110}"#)?;
//! let report = service.check(&form).await?;
//! for field in &report.response.missing_fields {
//!     println!("{}: {}", field.key, field.message);
//! }
//! ```

pub mod cache;
pub mod config;
pub mod messages;
pub mod prompts;
pub mod providers;
pub mod resilience;
pub mod service;
pub mod usage;

pub use cache::{CacheConfig, MessageCache};
pub use config::{ConfigError, RuntimeConfig};
pub use messages::{
    LlmMessageSynthesizer, MessageRequest, MessageSource, MessageSynthesizer, SynthesisError,
    SynthesizedMessage, TemplateMessageSynthesizer,
};
pub use providers::{LlmProvider, ProviderError, ProviderRegistry};
pub use resilience::{CircuitBreaker, FallbackStrategy, RetryConfig};
pub use service::{
    ChatReply, CheckMissingFieldsResponse, CheckReport, HealthReport, MissingFieldItem,
    MissingFieldsService, MissingFieldsServiceBuilder, RuntimeError,
};
pub use usage::LlmUsage;
