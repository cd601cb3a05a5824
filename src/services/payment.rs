//! Payment gateway service
//!
//! Approves or declines a charge for an amount in a given currency.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, ServiceError};
use crate::service::{CacheKey, Service};

/// Largest amount approved by default
pub const DEFAULT_APPROVAL_LIMIT: f64 = 10_000.0;

/// Arguments of a single charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Amount to charge, in major units
    pub amount: f64,
    /// ISO 4217 currency code, e.g. "USD"
    pub currency: String,
}

impl PaymentRequest {
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

/// Cache key for a [`PaymentRequest`].
///
/// Keeps the amount and currency as separate fields so no two distinct
/// requests can map to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaymentKey {
    amount_bits: u64,
    currency: String,
}

impl CacheKey for PaymentRequest {
    type Key = PaymentKey;

    fn cache_key(&self) -> PaymentKey {
        // -0.0 and 0.0 compare equal but have different bit patterns
        let amount = if self.amount == 0.0 { 0.0 } else { self.amount };
        PaymentKey {
            amount_bits: amount.to_bits(),
            currency: self.currency.clone(),
        }
    }
}

/// Simulated payment gateway.
///
/// Approves charges of a positive amount up to the approval limit and
/// declines everything else with `Ok(false)`. Malformed requests fail with
/// [`ServiceError::OperationFailed`].
#[derive(Debug)]
pub struct PaymentGateway {
    approval_limit: f64,
    latency: Duration,
    calls: AtomicUsize,
}

impl PaymentGateway {
    pub fn new() -> Self {
        Self {
            approval_limit: DEFAULT_APPROVAL_LIMIT,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sets the largest amount that will be approved.
    pub fn with_approval_limit(mut self, limit: f64) -> Self {
        self.approval_limit = limit;
        self
    }

    /// Sets a simulated round-trip delay for every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of times the gateway has processed a request.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for PaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Service for PaymentGateway {
    type Request = PaymentRequest;
    type Response = bool;

    async fn perform(&self, request: &PaymentRequest) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if !request.amount.is_finite() {
            return Err(ServiceError::OperationFailed(format!(
                "Invalid amount: {}",
                request.amount
            )));
        }

        if !is_currency_code(&request.currency) {
            return Err(ServiceError::OperationFailed(format!(
                "Unsupported currency: {:?}",
                request.currency
            )));
        }

        let approved = request.amount > 0.0 && request.amount <= self.approval_limit;
        info!(
            amount = request.amount,
            currency = %request.currency,
            approved,
            "Payment processed"
        );

        Ok(approved)
    }
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_requests_share_key() {
        let a = PaymentRequest::new(50.0, "USD");
        let b = PaymentRequest::new(50.0, "USD");
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_key_has_no_delimiter_collision() {
        // "1" + "-" + "0-USD" and "10" + "-" + "USD" would collide as strings
        let a = PaymentRequest::new(1.0, "0-USD");
        let b = PaymentRequest::new(10.0, "USD");
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_signed_zero_shares_key() {
        let a = PaymentRequest::new(0.0, "EUR");
        let b = PaymentRequest::new(-0.0, "EUR");
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[tokio::test]
    async fn test_gateway_approves_within_limit() {
        let gateway = PaymentGateway::new();
        let approved = gateway
            .perform(&PaymentRequest::new(50.0, "USD"))
            .await
            .unwrap();
        assert!(approved);
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_gateway_declines_over_limit() {
        let gateway = PaymentGateway::new().with_approval_limit(75.0);

        assert!(!gateway.perform(&PaymentRequest::new(100.0, "USD")).await.unwrap());
        assert!(!gateway.perform(&PaymentRequest::new(-5.0, "USD")).await.unwrap());
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_gateway_rejects_malformed_requests() {
        let gateway = PaymentGateway::new();

        let bad_currency = gateway.perform(&PaymentRequest::new(10.0, "usd")).await;
        assert!(matches!(bad_currency, Err(ServiceError::OperationFailed(_))));

        let bad_amount = gateway.perform(&PaymentRequest::new(f64::NAN, "USD")).await;
        assert!(matches!(bad_amount, Err(ServiceError::OperationFailed(_))));

        // Failed calls still count as work done
        assert_eq!(gateway.calls(), 2);
    }
}
