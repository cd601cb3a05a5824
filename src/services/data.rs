//! Large data source service
//!
//! Fetches a dataset that does not depend on any request arguments.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::service::Service;

/// Records returned per fetch by default
pub const DEFAULT_RECORD_COUNT: usize = 1000;

/// One row of the fetched dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRecord {
    pub id: u64,
    pub label: String,
}

/// Result of a single fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPayload {
    /// Fetched rows
    pub records: Vec<DataRecord>,
    /// When the source produced this payload
    pub fetched_at: DateTime<Utc>,
}

/// Simulated remote data source.
///
/// Takes no arguments, so every request maps to the same cache key.
#[derive(Debug)]
pub struct LargeDataSource {
    record_count: usize,
    latency: Duration,
    calls: AtomicUsize,
}

impl LargeDataSource {
    pub fn new() -> Self {
        Self {
            record_count: DEFAULT_RECORD_COUNT,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_record_count(mut self, record_count: usize) -> Self {
        self.record_count = record_count;
        self
    }

    /// Sets a simulated transfer delay for every fetch.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of fetches performed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for LargeDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Service for LargeDataSource {
    type Request = ();
    type Response = Arc<DataPayload>;

    async fn perform(&self, _request: &()) -> Result<Arc<DataPayload>> {
        let fetch = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let records = (0..self.record_count as u64)
            .map(|id| DataRecord {
                id,
                label: format!("record-{}", id),
            })
            .collect::<Vec<_>>();

        info!(fetch, records = records.len(), "Large data fetched");

        Ok(Arc::new(DataPayload {
            records,
            fetched_at: Utc::now(),
        }))
    }
}
