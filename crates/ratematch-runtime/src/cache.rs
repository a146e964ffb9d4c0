//! Caching layer for synthesized messages.
//!
//! Identical missing-field facts produce interchangeable messages, so a
//! model-written message is reused until its TTL runs out. Only model output
//! is cached; template fallbacks are cheap to rebuild.

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::humantime_duration;
use crate::messages::MessageRequest;

/// Cache sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,

    pub max_entries: u64,

    #[serde(with = "humantime_duration")]
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 1_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

/// Message cache using moka.
pub struct MessageCache {
    cache: Option<Cache<MessageRequest, String>>,
}

impl MessageCache {
    /// Create a new cache with the given limits.
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache: Some(cache) }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self { cache: None }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        if config.enabled {
            Self::new(config.max_entries, config.ttl)
        } else {
            Self::disabled()
        }
    }

    pub async fn get(&self, request: &MessageRequest) -> Option<String> {
        match &self.cache {
            Some(cache) => cache.get(request).await,
            None => None,
        }
    }

    pub async fn insert(&self, request: MessageRequest, message: String) {
        if let Some(cache) = &self.cache {
            cache.insert(request, message).await;
        }
    }

    /// Clear the cache.
    pub fn invalidate_all(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }

    /// Approximate entry count; moka updates it lazily.
    pub fn entry_count(&self) -> u64 {
        self.cache.as_ref().map(|c| c.entry_count()).unwrap_or(0)
    }
}

impl Default for MessageCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
