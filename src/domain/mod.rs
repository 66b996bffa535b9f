//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no SeaORM, no Axum).
//! Only the store contract, filters, validation rules and error types.

pub mod conflict;
pub mod errors;
pub mod filter;
pub mod repositories;
pub mod response;
pub mod validation;

pub use errors::{ServiceError, StoreError};
pub use filter::*;
pub use repositories::*;
pub use response::StorageResponse;
