//! Configuration Module
//!
//! Handles loading proxy configuration from environment variables.

use std::env;

use crate::proxy::{EvictionPolicy, FailurePolicy};

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Maximum number of cached keys, None = unbounded
    pub max_entries: Option<usize>,
    /// Whether failed real-service outcomes are stored and replayed
    pub cache_failures: bool,
}

impl ProxyConfig {
    /// Creates a new ProxyConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PROXY_MAX_ENTRIES` - Maximum cached keys (default: unbounded, 0 also means unbounded)
    /// - `PROXY_CACHE_FAILURES` - `true`/`false`/`1`/`0` (default: true)
    pub fn from_env() -> Self {
        Self {
            max_entries: parse_max_entries(env::var("PROXY_MAX_ENTRIES").ok().as_deref()),
            cache_failures: parse_flag(env::var("PROXY_CACHE_FAILURES").ok().as_deref())
                .unwrap_or(true),
        }
    }

    /// Eviction policy implied by `max_entries`.
    pub fn eviction_policy(&self) -> EvictionPolicy {
        match self.max_entries {
            Some(max) => EvictionPolicy::MaxEntries(max),
            None => EvictionPolicy::Unbounded,
        }
    }

    /// Failure policy implied by `cache_failures`.
    pub fn failure_policy(&self) -> FailurePolicy {
        if self.cache_failures {
            FailurePolicy::CacheFailures
        } else {
            FailurePolicy::RetryFailures
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            max_entries: None,
            cache_failures: true,
        }
    }
}

fn parse_max_entries(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|max| *max > 0)
}

fn parse_flag(raw: Option<&str>) -> Option<bool> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
