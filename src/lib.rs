//! Memo Proxy - A memoizing proxy for expensive services
//!
//! Puts a cache in front of any [`Service`] and answers repeated requests
//! from it instead of redoing the expensive operation.

pub mod config;
pub mod error;
pub mod proxy;
pub mod service;
pub mod services;

pub use config::ProxyConfig;
pub use error::{Result, ServiceError};
pub use proxy::{CacheOutcome, CacheStats, EvictionPolicy, FailurePolicy, MemoizingProxy};
pub use service::{CacheKey, Service};
