//! Resilience patterns for message synthesis.
//!
//! This module provides:
//! - Circuit breaker keyed by provider
//! - Retry with exponential backoff
//! - Fallback strategy when synthesis fails

mod circuit_breaker;
mod fallback;
mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use fallback::FallbackStrategy;
pub use retry::RetryConfig;
