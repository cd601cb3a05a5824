//! Service Capability Module
//!
//! The single capability shared by real services and the proxies in front of them.

use std::fmt::Debug;
use std::hash::Hash;

use async_trait::async_trait;

use crate::error::Result;

// == Cache Key ==
/// Derives a stable cache key from a request's arguments.
///
/// Two requests with equal arguments must produce equal keys, and distinct
/// argument combinations must not collide. Implementations should return a
/// structured value rather than joining fields into a string.
pub trait CacheKey {
    /// Key type stored in the proxy's mapping
    type Key: Hash + Eq + Clone + Debug + Send + Sync + 'static;

    /// Computes the key for this request.
    fn cache_key(&self) -> Self::Key;
}

/// Parameterless requests all share a single constant key.
impl CacheKey for () {
    type Key = ();

    fn cache_key(&self) -> Self::Key {}
}

/// String requests are their own key.
impl CacheKey for String {
    type Key = String;

    fn cache_key(&self) -> String {
        self.clone()
    }
}

// == Service ==
/// An operation that turns a request into a response, possibly at great cost.
///
/// Both real services and [`MemoizingProxy`](crate::proxy::MemoizingProxy)
/// implement this trait, so a proxy can stand in wherever a real service is
/// expected.
#[async_trait]
pub trait Service: Send + Sync {
    /// Arguments of a single call
    type Request: CacheKey + Send + Sync;
    /// Value produced by a successful call
    type Response: Clone + Send + Sync + 'static;

    /// Performs the operation for `request`.
    async fn perform(&self, request: &Self::Request) -> Result<Self::Response>;
}

