//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use std::fmt;

use crate::models::errors::ValidationErrors;

/// Failure cause reported by a record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique index rejected the write
    UniqueViolation { constraint: String, message: String },
    /// The filter expression could not be compiled
    Query(String),
    /// A stored or submitted document could not be (de)serialized
    Serialization(String),
    /// Any other persistence failure
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::UniqueViolation { message, .. } => f.write_str(message),
            StoreError::Query(msg) => write!(f, "Invalid query: {}", msg),
            StoreError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            StoreError::Backend(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Error type for service operations
#[derive(Debug)]
pub enum ServiceError {
    /// Malformed caller input, reported as plain text
    InvalidInput(String),
    /// Domain rule violated before any write
    Validation(ValidationErrors),
    /// Write rejected by the one-open-loan-per-item index
    Conflict(ValidationErrors),
    /// Lookup by id found nothing
    NotFound,
    /// Infrastructure failure
    Store(StoreError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ServiceError::Validation(errors) | ServiceError::Conflict(errors) => {
                write!(f, "Validation error: {}", errors)
            }
            ServiceError::NotFound => write!(f, "Resource not found"),
            ServiceError::Store(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Store(e)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Store(e.into())
    }
}
