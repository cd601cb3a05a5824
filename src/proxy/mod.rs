//! Proxy Module
//!
//! Provides the memoizing proxy and the pieces it is built from.

mod entry;
mod lru;
mod memoizing;
mod stats;


// Re-export public types
pub(crate) use entry::CacheEntry;
pub(crate) use lru::LruTracker;
pub use memoizing::MemoizingProxy;
pub use stats::CacheStats;

// == Policies ==
/// What the proxy does when the real service returns an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Store the error and replay it for every later call with the same key
    #[default]
    CacheFailures,
    /// Return the error without storing it; the next call delegates again
    RetryFailures,
}

/// How many keys the proxy may hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Grow without bound for the life of the proxy
    #[default]
    Unbounded,
    /// Keep at most this many keys, dropping the least recently used.
    /// A bound of 0 is treated as 1.
    MaxEntries(usize),
}

// == Cache Outcome ==
/// Whether a call was answered from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Answered from a stored outcome, or from another caller's in-flight computation
    Hit,
    /// The real service was invoked by this call
    Miss,
}
