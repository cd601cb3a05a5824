//! Cache Entry Module
//!
//! A write-once slot holding the outcome stored for one cache key.

use std::future::Future;

use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;

use crate::error::Result;
use crate::proxy::FailurePolicy;

// == Cache Entry ==
/// Slot for a single key.
///
/// The slot is created empty when a key is first requested and filled at most
/// once. Callers that arrive while the slot is being filled wait for the same
/// outcome instead of starting their own computation.
#[derive(Debug)]
pub struct CacheEntry<R> {
    outcome: OnceCell<Result<R>>,
    created_at: DateTime<Utc>,
}

impl<R: Clone> CacheEntry<R> {
    // == Constructor ==
    /// Creates an empty slot stamped with the current time.
    pub fn new() -> Self {
        Self {
            outcome: OnceCell::new(),
            created_at: Utc::now(),
        }
    }

    /// Returns the stored outcome, if the slot has been filled.
    pub fn get(&self) -> Option<&Result<R>> {
        self.outcome.get()
    }

    // == Is Filled ==
    /// Returns true once an outcome has been stored.
    pub fn is_filled(&self) -> bool {
        self.outcome.initialized()
    }

    /// When the slot was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // == Get Or Fill ==
    /// Returns the stored outcome, running `init` if the slot is empty.
    ///
    /// Under [`FailurePolicy::RetryFailures`] an `Err` from `init` is returned
    /// but not stored, so the slot stays empty and the next caller runs its
    /// own `init`.
    pub async fn get_or_fill<F, Fut>(&self, policy: FailurePolicy, init: F) -> Result<R>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        match policy {
            FailurePolicy::CacheFailures => self.outcome.get_or_init(init).await.clone(),
            FailurePolicy::RetryFailures => self
                .outcome
                .get_or_try_init(|| async move { init().await.map(Ok) })
                .await
                .and_then(|stored| stored.clone()),
        }
    }
}

impl<R: Clone> Default for CacheEntry<R> {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;

    fn failed() -> ServiceError {
        ServiceError::OperationFailed("declined upstream".to_string())
    }

    #[tokio::test]
    async fn test_entry_starts_empty() {
        let entry: CacheEntry<bool> = CacheEntry::new();
        assert!(!entry.is_filled());
        assert!(entry.get().is_none());
        assert!(entry.created_at() <= Utc::now());
    }

    #[tokio::test]
    async fn test_entry_first_write_wins() {
        let entry = CacheEntry::new();

        let first = entry
            .get_or_fill(FailurePolicy::CacheFailures, || async { Ok(1u32) })
            .await;
        let second = entry
            .get_or_fill(FailurePolicy::CacheFailures, || async { Ok(2u32) })
            .await;

        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(1));
        assert!(entry.is_filled());
    }

    #[tokio::test]
    async fn test_entry_caches_failure() {
        let entry: CacheEntry<u32> = CacheEntry::new();

        let first = entry
            .get_or_fill(FailurePolicy::CacheFailures, || async { Err(failed()) })
            .await;
        let second = entry
            .get_or_fill(FailurePolicy::CacheFailures, || async { Ok(7) })
            .await;

        assert_eq!(first, Err(failed()));
        assert_eq!(second, Err(failed()));
    }

    #[tokio::test]
    async fn test_entry_retries_failure() {
        let entry: CacheEntry<u32> = CacheEntry::new();

        let first = entry
            .get_or_fill(FailurePolicy::RetryFailures, || async { Err(failed()) })
            .await;
        assert_eq!(first, Err(failed()));
        assert!(!entry.is_filled());

        let second = entry
            .get_or_fill(FailurePolicy::RetryFailures, || async { Ok(7) })
            .await;
        assert_eq!(second, Ok(7));
        assert_eq!(entry.get(), Some(&Ok(7)));
    }
}
