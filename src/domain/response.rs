//! Outcome of a storage request, independent of the transport.

use serde_json::Value;

use super::ServiceError;
use crate::models::errors::ValidationErrors;

/// Every request ends in exactly one of these; the HTTP layer maps each
/// variant to a status code in one place.
#[derive(Debug)]
pub enum StorageResponse {
    Ok(Value),
    Created { location: String, body: Value },
    NoContent,
    NotFound(String),
    BadRequest(String),
    ValidationFailed(ValidationErrors),
    Conflict(ValidationErrors),
    ServerError(String),
}

impl From<ServiceError> for StorageResponse {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::InvalidInput(msg) => StorageResponse::BadRequest(msg),
            ServiceError::Validation(errors) => StorageResponse::ValidationFailed(errors),
            ServiceError::Conflict(errors) => StorageResponse::Conflict(errors),
            ServiceError::NotFound => StorageResponse::NotFound("Not Found".to_string()),
            ServiceError::Store(e) => {
                tracing::error!("Storage failure: {}", e);
                StorageResponse::ServerError(e.to_string())
            }
        }
    }
}

impl<T: serde::Serialize> From<Result<T, ServiceError>> for StorageResponse {
    fn from(result: Result<T, ServiceError>) -> Self {
        match result.and_then(|body| serde_json::to_value(body).map_err(ServiceError::from)) {
            Ok(body) => StorageResponse::Ok(body),
            Err(e) => e.into(),
        }
    }
}

impl StorageResponse {
    /// 204 on success, the mapped error otherwise
    pub fn no_content(result: Result<(), ServiceError>) -> Self {
        match result {
            Ok(()) => StorageResponse::NoContent,
            Err(e) => e.into(),
        }
    }
}
