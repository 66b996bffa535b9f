//! Application state shared across all handlers

use std::sync::Arc;

use crate::infrastructure::tenants::TenantRegistry;

#[derive(Clone)]
pub struct AppState {
    /// Lazily opened store handles, one per tenant
    pub tenants: Arc<TenantRegistry>,
}

impl AppState {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            tenants: Arc::new(TenantRegistry::new(database_url)),
        }
    }
}
