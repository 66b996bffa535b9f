//! Per-tenant store handles
//!
//! Each tenant gets its own database. Handles are opened on first use and
//! kept for the life of the process.

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::config::TENANT_PLACEHOLDER;
use super::db;
use super::repositories::SeaOrmRecordStore;
use crate::domain::{RecordStore, StoreError};

/// Validated tenant identifier: ASCII alphanumerics and `_` only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(String);

impl TenantId {
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        valid.then(|| Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct TenantRegistry {
    database_url: String,
    stores: DashMap<TenantId, Arc<OnceCell<Arc<dyn RecordStore>>>>,
}

impl TenantRegistry {
    /// `database_url` may contain `{tenant}`; without it every tenant
    /// connects to a fresh database at the same URL (e.g. `sqlite::memory:`)
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            stores: DashMap::new(),
        }
    }

    fn url_for(&self, tenant: &TenantId) -> String {
        self.database_url
            .replace(TENANT_PLACEHOLDER, tenant.as_str())
    }

    /// Store handle for `tenant`, opening and migrating its database on
    /// first use. Concurrent first requests share one initialisation.
    pub async fn store_for(&self, tenant: &TenantId) -> Result<Arc<dyn RecordStore>, StoreError> {
        let cell = self.stores.entry(tenant.clone()).or_default().clone();

        let store = cell
            .get_or_try_init(|| async {
                tracing::info!("Opening store for tenant {}", tenant);
                let db = db::init_db(&self.url_for(tenant)).await?;
                Ok::<Arc<dyn RecordStore>, StoreError>(Arc::new(SeaOrmRecordStore::new(db)))
            })
            .await?;

        Ok(store.clone())
    }
}
