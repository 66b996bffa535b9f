//! Tenant resolution for every storage route

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

use crate::domain::{RecordStore, StorageResponse};
use crate::infrastructure::AppState;
use crate::infrastructure::tenants::TenantId;

pub const TENANT_HEADER: &str = "x-okapi-tenant";

/// The calling tenant's store, resolved from the `x-okapi-tenant` header
pub struct TenantStore(pub Arc<dyn RecordStore>);

#[async_trait]
impl FromRequestParts<AppState> for TenantStore {
    type Rejection = StorageResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(TENANT_HEADER)
            .ok_or_else(|| StorageResponse::BadRequest(format!("Missing {} header", TENANT_HEADER)))?
            .to_str()
            .map_err(|_| {
                StorageResponse::BadRequest(format!("Invalid {} header encoding", TENANT_HEADER))
            })?;

        let tenant = TenantId::parse(raw)
            .ok_or_else(|| StorageResponse::BadRequest(format!("Invalid tenant: {}", raw)))?;

        let store = state.tenants.store_for(&tenant).await.map_err(|e| {
            tracing::error!("Failed to open store for tenant {}: {}", tenant, e);
            StorageResponse::ServerError(e.to_string())
        })?;

        Ok(TenantStore(store))
    }
}
