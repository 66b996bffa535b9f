//! HTTP rendering of storage outcomes and shared request helpers

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::StorageResponse;

impl IntoResponse for StorageResponse {
    fn into_response(self) -> Response {
        match self {
            StorageResponse::Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            StorageResponse::Created { location, body } => (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(body),
            )
                .into_response(),
            StorageResponse::NoContent => StatusCode::NO_CONTENT.into_response(),
            StorageResponse::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            StorageResponse::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            StorageResponse::ValidationFailed(errors) | StorageResponse::Conflict(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
            }
            StorageResponse::ServerError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
            }
        }
    }
}

fn default_limit() -> u64 {
    10
}

/// Paging and filtering parameters shared by every listing
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// CQL filter, e.g. `userId==abc sortBy loanDate/sort.descending`
    pub query: Option<String>,
    #[serde(default)]
    pub offset: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

impl PageQuery {
    /// Reject an empty page before touching the store
    pub fn checked(self) -> Result<Self, StorageResponse> {
        if self.limit == 0 {
            return Err(StorageResponse::BadRequest(
                "limit must be greater than 0".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Unwrap a JSON body, reporting malformed input as a plain 400
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, StorageResponse> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| StorageResponse::BadRequest(rejection.body_text()))
}
