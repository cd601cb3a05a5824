//! Error types for proxied services
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Service Error Enum ==
/// Failure reported by a real service.
///
/// The proxy never originates one of these itself. It forwards the error on a
/// miss and, depending on the failure policy, replays it on later hits, which
/// is why the type is `Clone`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The real operation could not produce a result
    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

// == Result Type Alias ==
/// Convenience Result type for service calls.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ServiceError::OperationFailed("gateway unreachable".to_string());
        assert_eq!(err.to_string(), "Operation failed: gateway unreachable");
    }

    #[test]
    fn test_error_clone_is_equal() {
        let err = ServiceError::OperationFailed("timeout".to_string());
        assert_eq!(err.clone(), err);
    }
}
