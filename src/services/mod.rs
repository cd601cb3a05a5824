//! Real services that sit behind a memoizing proxy
//!
//! Both simulate an expensive call and count how often they are invoked, so
//! callers can tell whether a proxy actually short-circuited.

pub mod data;
pub mod payment;

// Re-export commonly used types
pub use data::{DataPayload, DataRecord, LargeDataSource};
pub use payment::{PaymentGateway, PaymentKey, PaymentRequest};
