//! Circuit breaker around LLM providers.
//!
//! When a provider fails repeatedly the circuit opens and message synthesis
//! stops calling it until the recovery timeout passes. Circuits are keyed by
//! provider name so independent backends recover independently.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::config::humantime_duration;

/// Circuit breaker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening the circuit
    pub failure_threshold: u32,

    /// How long an open circuit waits before a trial call
    #[serde(with = "humantime_duration")]
    pub recovery_timeout: Duration,

    /// Trial successes needed to close the circuit again
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

/// State of a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation
    Closed { failures: u32 },

    /// Calls are refused
    Open { opened_at: Instant },

    /// Trial calls allowed
    HalfOpen { successes: u32 },
}

pub struct CircuitBreaker {
    states: RwLock<HashMap<String, CircuitState>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Whether calls to `provider` should be refused right now.
    ///
    /// An open circuit whose recovery timeout has elapsed moves to half-open
    /// and lets the call through.
    pub fn is_open(&self, provider: &str) -> bool {
        let states = self.states.read();
        match states.get(provider) {
            Some(CircuitState::Open { opened_at }) => {
                if opened_at.elapsed() >= self.config.recovery_timeout {
                    drop(states);
                    self.transition_to_half_open(provider);
                    false
                } else {
                    true
                }
            }
            _ => false,
        }
    }

    pub fn record_success(&self, provider: &str) {
        let mut states = self.states.write();
        match states.get(provider).copied() {
            Some(CircuitState::HalfOpen { successes }) => {
                if successes + 1 >= self.config.success_threshold {
                    states.insert(provider.to_string(), CircuitState::Closed { failures: 0 });
                    tracing::info!(provider, "Circuit closed after successful recovery");
                } else {
                    states.insert(
                        provider.to_string(),
                        CircuitState::HalfOpen {
                            successes: successes + 1,
                        },
                    );
                }
            }
            Some(CircuitState::Closed { failures }) if failures > 0 => {
                states.insert(provider.to_string(), CircuitState::Closed { failures: 0 });
            }
            _ => {}
        }
    }

    pub fn record_failure(&self, provider: &str) {
        let mut states = self.states.write();
        let next = match states.get(provider).copied() {
            None => Some(0),
            Some(CircuitState::Closed { failures }) => Some(failures),
            Some(CircuitState::HalfOpen { .. }) => {
                states.insert(
                    provider.to_string(),
                    CircuitState::Open {
                        opened_at: Instant::now(),
                    },
                );
                tracing::warn!(provider, "Circuit reopened after failed recovery attempt");
                None
            }
            Some(CircuitState::Open { .. }) => None,
        };

        if let Some(failures) = next {
            let failures = failures + 1;
            if failures >= self.config.failure_threshold {
                states.insert(
                    provider.to_string(),
                    CircuitState::Open {
                        opened_at: Instant::now(),
                    },
                );
                tracing::warn!(provider, failures, "Circuit opened after repeated failures");
            } else {
                states.insert(provider.to_string(), CircuitState::Closed { failures });
            }
        }
    }

    fn transition_to_half_open(&self, provider: &str) {
        let mut states = self.states.write();
        if matches!(states.get(provider), Some(CircuitState::Open { .. })) {
            states.insert(provider.to_string(), CircuitState::HalfOpen { successes: 0 });
            tracing::info!(provider, "Circuit half-open, allowing trial call");
        }
    }

    /// Current state of the circuit for `provider`.
    pub fn state(&self, provider: &str) -> CircuitState {
        self.states
            .read()
            .get(provider)
            .copied()
            .unwrap_or(CircuitState::Closed { failures: 0 })
    }

    /// Close every circuit.
    pub fn reset(&self) {
        self.states.write().clear();
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}
