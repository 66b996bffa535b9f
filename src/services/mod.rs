//! Services Layer
//!
//! Business logic extracted from HTTP handlers. Every function takes the
//! tenant's store as a `&dyn RecordStore`, so it can be driven by Axum
//! handlers or directly from tests.

pub mod anonymization;
pub mod loan_service;
pub mod request_policy_service;

// Re-export for convenience
pub use anonymization::anonymize_loans;
