//! Request policy service
//!
//! Plain document CRUD; unlike loans there is no cross-record invariant.

use serde_json::Value;
use uuid::Uuid;

use crate::domain::{Page, Predicate, RecordStore, ServiceError, Table};
use crate::models::request_policy::{RequestPolicies, RequestPolicy};
use crate::query;

#[derive(Debug)]
pub struct CreatedRequestPolicy {
    pub location: String,
    pub policy: RequestPolicy,
}

fn to_policies(page: Page<Value>) -> Result<RequestPolicies, ServiceError> {
    let request_policies = page
        .records
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<RequestPolicy>, _>>()?;

    Ok(RequestPolicies {
        request_policies,
        total_records: page.total_records,
    })
}

pub async fn list_request_policies(
    store: &dyn RecordStore,
    query: Option<&str>,
    offset: u64,
    limit: u64,
) -> Result<RequestPolicies, ServiceError> {
    let filter = query::list_filter(query, offset, limit)?;
    let page = store.list(Table::RequestPolicy, filter).await?;
    to_policies(page)
}

pub async fn get_request_policy(
    store: &dyn RecordStore,
    policy_id: &str,
) -> Result<RequestPolicy, ServiceError> {
    let mut matches = store.get_by_id(Table::RequestPolicy, policy_id).await?;

    if matches.len() != 1 {
        return Err(ServiceError::NotFound);
    }

    Ok(serde_json::from_value(matches.remove(0))?)
}

pub async fn create_request_policy(
    store: &dyn RecordStore,
    mut policy: RequestPolicy,
) -> Result<CreatedRequestPolicy, ServiceError> {
    let id = policy
        .id
        .get_or_insert_with(|| Uuid::new_v4().to_string())
        .clone();
    let record = serde_json::to_value(&policy)?;

    let location = store.create(Table::RequestPolicy, &id, record).await?;

    tracing::info!("Created request policy {} ({})", id, policy.name);
    Ok(CreatedRequestPolicy { location, policy })
}

/// Replace the policy under `policy_id`, creating it when absent
pub async fn replace_request_policy(
    store: &dyn RecordStore,
    policy_id: &str,
    mut policy: RequestPolicy,
) -> Result<(), ServiceError> {
    policy.id = Some(policy_id.to_string());
    let record = serde_json::to_value(&policy)?;

    let existing = store.get_by_id(Table::RequestPolicy, policy_id).await?;

    if existing.len() == 1 {
        store
            .replace(
                Table::RequestPolicy,
                record,
                &Predicate::IdEquals(policy_id.to_string()),
            )
            .await?;
    } else {
        store.create(Table::RequestPolicy, policy_id, record).await?;
    }

    Ok(())
}

pub async fn delete_request_policy(
    store: &dyn RecordStore,
    policy_id: &str,
) -> Result<(), ServiceError> {
    store
        .delete(
            Table::RequestPolicy,
            &Predicate::IdEquals(policy_id.to_string()),
        )
        .await?;
    Ok(())
}

pub async fn delete_all_request_policies(store: &dyn RecordStore) -> Result<(), ServiceError> {
    tracing::warn!("Truncating request policy table");
    store.truncate(Table::RequestPolicy).await?;
    Ok(())
}
