//! Memoizing Proxy Module
//!
//! Wraps a real service and answers repeated requests from a local cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::ProxyConfig;
use crate::error::Result;
use crate::proxy::stats::StatsCounters;
use crate::proxy::{
    CacheEntry, CacheOutcome, CacheStats, EvictionPolicy, FailurePolicy, LruTracker,
};
use crate::service::{CacheKey, Service};

type KeyOf<S> = <<S as Service>::Request as CacheKey>::Key;

// == Slot Table ==
/// Key to slot mapping plus access order for bounded proxies.
#[derive(Debug)]
struct SlotTable<K, R> {
    slots: HashMap<K, Arc<CacheEntry<R>>>,
    lru: LruTracker<K>,
}

// == Memoizing Proxy ==
/// Caching proxy in front of a real [`Service`].
///
/// Implements [`Service`] itself, so it can be used anywhere the wrapped
/// service can. The first call for a key delegates to the real service and
/// stores the outcome; every later call for that key is answered from the
/// stored outcome. Concurrent first calls for the same key share a single
/// real invocation.
pub struct MemoizingProxy<S: Service> {
    real: Arc<S>,
    table: RwLock<SlotTable<KeyOf<S>, S::Response>>,
    stats: StatsCounters,
    failure_policy: FailurePolicy,
    eviction_policy: EvictionPolicy,
}

impl<S: Service> MemoizingProxy<S> {
    // == Constructors ==
    /// Creates an unbounded proxy that caches failures.
    pub fn new(real: Arc<S>) -> Self {
        Self::with_policies(real, FailurePolicy::default(), EvictionPolicy::default())
    }

    /// Creates a proxy with policies taken from `config`.
    pub fn with_config(real: Arc<S>, config: &ProxyConfig) -> Self {
        Self::with_policies(real, config.failure_policy(), config.eviction_policy())
    }

    // == With Policies ==
    /// Creates a proxy with explicit failure and eviction policies.
    ///
    /// A `MaxEntries(0)` bound is raised to 1.
    pub fn with_policies(
        real: Arc<S>,
        failure_policy: FailurePolicy,
        eviction_policy: EvictionPolicy,
    ) -> Self {
        let eviction_policy = match eviction_policy {
            EvictionPolicy::MaxEntries(0) => EvictionPolicy::MaxEntries(1),
            other => other,
        };

        info!(?failure_policy, ?eviction_policy, "Memoizing proxy created");

        Self {
            real,
            table: RwLock::new(SlotTable {
                slots: HashMap::new(),
                lru: LruTracker::new(),
            }),
            stats: StatsCounters::default(),
            failure_policy,
            eviction_policy,
        }
    }

    /// The wrapped real service.
    pub fn inner(&self) -> &Arc<S> {
        &self.real
    }

    // == Policies ==
    /// How real-service errors are handled.
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// How many keys the proxy may hold, after normalization.
    pub fn eviction_policy(&self) -> EvictionPolicy {
        self.eviction_policy
    }

    // == Perform Traced ==
    /// Performs `request` and reports whether the cache answered it.
    ///
    /// The returned result has the same shape on a hit and on a miss.
    pub async fn perform_traced(
        &self,
        request: &S::Request,
    ) -> (Result<S::Response>, CacheOutcome) {
        let key = request.cache_key();
        let entry = self.entry_for(&key).await;

        if let Some(stored) = entry.get() {
            self.stats.record_hit();
            debug!(?key, outcome = "hit", "Proxy call");
            return (stored.clone(), CacheOutcome::Hit);
        }

        let invoked = AtomicBool::new(false);
        let flag = &invoked;
        let result = entry
            .get_or_fill(self.failure_policy, || async move {
                flag.store(true, Ordering::SeqCst);
                self.real.perform(request).await
            })
            .await;

        if !invoked.load(Ordering::SeqCst) {
            // Another caller filled the slot while we waited
            self.stats.record_hit();
            debug!(?key, outcome = "hit", coalesced = true, "Proxy call");
            return (result, CacheOutcome::Hit);
        }

        self.stats.record_miss();
        match &result {
            Ok(_) => debug!(?key, outcome = "miss", "Proxy call"),
            Err(err) => {
                self.stats.record_failure();
                warn!(?key, error = %err, policy = ?self.failure_policy, "Real service failed");
            }
        }

        if entry.is_filled() {
            self.enforce_bound(&key, &entry).await;
        } else {
            self.discard_empty(&key, &entry).await;
        }

        (result, CacheOutcome::Miss)
    }

    // == Inspection ==
    /// Number of keys holding a stored outcome.
    pub async fn len(&self) -> usize {
        self.table
            .read()
            .await
            .slots
            .values()
            .filter(|entry| entry.is_filled())
            .count()
    }

    /// Returns true if no key holds a stored outcome.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns true if `request`'s key already holds a stored outcome.
    pub async fn contains(&self, request: &S::Request) -> bool {
        self.table
            .read()
            .await
            .slots
            .get(&request.cache_key())
            .is_some_and(|entry| entry.is_filled())
    }

    /// When the slot for `request`'s key was created, if it holds an outcome.
    pub async fn cached_since(&self, request: &S::Request) -> Option<DateTime<Utc>> {
        self.table
            .read()
            .await
            .slots
            .get(&request.cache_key())
            .filter(|entry| entry.is_filled())
            .map(|entry| entry.created_at())
    }

    /// Returns current proxy statistics.
    pub async fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len().await)
    }

    // == Slot Lookup ==
    /// Returns the slot for `key`, creating an empty one on first use.
    ///
    /// The table lock is released before the caller touches the real service.
    /// New slots never trigger eviction; the bound is applied once they hold
    /// an outcome.
    async fn entry_for(&self, key: &KeyOf<S>) -> Arc<CacheEntry<S::Response>> {
        let bounded = matches!(self.eviction_policy, EvictionPolicy::MaxEntries(_));

        // Unbounded proxies never reorder, so a shared lock is enough for hits
        if !bounded {
            let table = self.table.read().await;
            if let Some(entry) = table.slots.get(key) {
                return Arc::clone(entry);
            }
        }

        let mut guard = self.table.write().await;
        let table = &mut *guard;

        if let Some(entry) = table.slots.get(key).cloned() {
            if bounded {
                table.lru.touch(key);
            }
            return entry;
        }

        let entry = Arc::new(CacheEntry::new());
        table.slots.insert(key.clone(), Arc::clone(&entry));
        if bounded {
            table.lru.touch(key);
        }

        entry
    }

    // == Enforce Bound ==
    /// Marks `key` as most recently used and evicts the coldest stored
    /// outcomes until the bound holds again.
    ///
    /// Slots still waiting for their first outcome are never evicted, so an
    /// in-flight computation always lands in the table.
    async fn enforce_bound(&self, key: &KeyOf<S>, entry: &Arc<CacheEntry<S::Response>>) {
        let EvictionPolicy::MaxEntries(max) = self.eviction_policy else {
            return;
        };

        let mut guard = self.table.write().await;
        let table = &mut *guard;

        if table
            .slots
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, entry))
        {
            table.lru.touch(key);
        }

        let mut filled = table.slots.values().filter(|slot| slot.is_filled()).count();
        while filled > max {
            let slots = &table.slots;
            let Some(victim) = table
                .lru
                .evict_oldest_where(|k| slots.get(k).is_some_and(|slot| slot.is_filled()))
            else {
                break;
            };
            table.slots.remove(&victim);
            filled -= 1;
            self.stats.record_eviction();
            info!(key = ?victim, "Evicted least recently used entry");
        }
    }

    // == Discard Empty ==
    /// Drops `key`'s slot if it is still `entry` and holds no outcome.
    ///
    /// Called after a failure that was not stored, so the key neither counts
    /// toward the bound nor lingers in the table.
    async fn discard_empty(&self, key: &KeyOf<S>, entry: &Arc<CacheEntry<S::Response>>) {
        let mut guard = self.table.write().await;
        let table = &mut *guard;

        let unchanged = table
            .slots
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, entry) && !current.is_filled());
        if unchanged {
            table.slots.remove(key);
            table.lru.remove(key);
            debug!(?key, "Discarded empty slot after failure");
        }
    }

    /// Number of slots in the table, including ones without an outcome.
    #[cfg(test)]
    pub(crate) async fn slot_count(&self) -> usize {
        self.table.read().await.slots.len()
    }
}

#[async_trait]
impl<S: Service> Service for MemoizingProxy<S> {
    type Request = S::Request;
    type Response = S::Response;

    async fn perform(&self, request: &S::Request) -> Result<S::Response> {
        self.perform_traced(request).await.0
    }
}
