//! Loan Service - Pure business logic without HTTP layer
//!
//! Create and replace run through one state machine: default the status,
//! validate, write, then interpret a failed write. The one-open-loan-per-item
//! rule is never pre-checked; the store's unique index rejects the write and
//! the failure is classified afterwards.

use serde_json::Value;
use uuid::Uuid;

use crate::domain::conflict::{MORE_THAN_ONE_OPEN_LOAN_MESSAGE, is_open_loan_conflict};
use crate::domain::validation::{validate_loan_dates, validate_open_loan_has_user};
use crate::domain::{Page, Predicate, RecordStore, ServiceError, StoreError, Table};
use crate::models::errors::ValidationErrors;
use crate::models::loan::{Loan, LoanStatus, Loans};
use crate::query;

/// A freshly created loan and where it can be fetched
#[derive(Debug)]
pub struct CreatedLoan {
    pub location: String,
    pub loan: Loan,
}

fn to_loans(page: Page<Value>) -> Result<Loans, ServiceError> {
    let loans = page
        .records
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<Loan>, _>>()?;

    Ok(Loans {
        loans,
        total_records: page.total_records,
    })
}

/// Default a missing status to Open, then run the checks that must pass
/// before anything is written.
fn prepare(loan: &mut Loan) -> Result<(), ServiceError> {
    if loan.status.is_none() {
        loan.status = Some(LoanStatus::open());
    }

    validate_loan_dates(loan).map_err(ServiceError::InvalidInput)?;
    validate_open_loan_has_user(loan).map_err(ServiceError::Validation)?;

    Ok(())
}

fn write_failure(error: StoreError, loan: &Loan) -> ServiceError {
    if is_open_loan_conflict(&error) {
        tracing::warn!("Item {} already has an open loan", loan.item_id);
        return ServiceError::Conflict(ValidationErrors::for_field(
            "itemId",
            Some(&loan.item_id),
            MORE_THAN_ONE_OPEN_LOAN_MESSAGE,
        ));
    }
    ServiceError::Store(error)
}

/// List loans matching a CQL query
pub async fn list_loans(
    store: &dyn RecordStore,
    query: Option<&str>,
    offset: u64,
    limit: u64,
) -> Result<Loans, ServiceError> {
    tracing::debug!("CQL Query: {:?}", query);

    let filter = query::list_filter(query, offset, limit)?;
    let page = store.list(Table::Loan, filter).await?;
    to_loans(page)
}

/// List loan history entries, newest first unless the query sorts
pub async fn list_loan_history(
    store: &dyn RecordStore,
    query: Option<&str>,
    offset: u64,
    limit: u64,
) -> Result<Loans, ServiceError> {
    tracing::debug!("CQL Query: {:?}", query);

    let filter = query::history_filter(query, offset, limit)?;
    let page = store.list(Table::LoanHistory, filter).await?;
    to_loans(page)
}

/// Fetch one loan; anything but exactly one match is not found
pub async fn get_loan(store: &dyn RecordStore, loan_id: &str) -> Result<Loan, ServiceError> {
    let mut matches = store.get_by_id(Table::Loan, loan_id).await?;

    if matches.len() != 1 {
        return Err(ServiceError::NotFound);
    }

    Ok(serde_json::from_value(matches.remove(0))?)
}

/// Create a loan, minting an id when the caller did not supply one
pub async fn create_loan(
    store: &dyn RecordStore,
    mut loan: Loan,
) -> Result<CreatedLoan, ServiceError> {
    prepare(&mut loan)?;

    let id = loan
        .id
        .get_or_insert_with(|| Uuid::new_v4().to_string())
        .clone();
    let record = serde_json::to_value(&loan)?;

    let location = store
        .create(Table::Loan, &id, record)
        .await
        .map_err(|e| write_failure(e, &loan))?;

    tracing::info!("Created loan {} for item {}", id, loan.item_id);
    Ok(CreatedLoan { location, loan })
}

/// Replace the loan stored under `loan_id`, creating it when absent.
///
/// The path id wins over any id in the body.
pub async fn replace_loan(
    store: &dyn RecordStore,
    loan_id: &str,
    mut loan: Loan,
) -> Result<(), ServiceError> {
    prepare(&mut loan)?;

    loan.id = Some(loan_id.to_string());
    let record = serde_json::to_value(&loan)?;

    let existing = store.get_by_id(Table::Loan, loan_id).await?;

    let written = if existing.len() == 1 {
        store
            .replace(Table::Loan, record, &Predicate::IdEquals(loan_id.to_string()))
            .await
    } else {
        if existing.len() > 1 {
            tracing::warn!("{} rows share loan id {}", existing.len(), loan_id);
        }
        store.create(Table::Loan, loan_id, record).await.map(|_| ())
    };

    written.map_err(|e| write_failure(e, &loan))
}

pub async fn delete_loan(store: &dyn RecordStore, loan_id: &str) -> Result<(), ServiceError> {
    store
        .delete(Table::Loan, &Predicate::IdEquals(loan_id.to_string()))
        .await?;
    Ok(())
}

/// Administrative reset: remove every loan
pub async fn delete_all_loans(store: &dyn RecordStore) -> Result<(), ServiceError> {
    tracing::warn!("Truncating loan table");
    store.truncate(Table::Loan).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conflict::OPEN_LOAN_PER_ITEM_CONSTRAINT;
    use crate::domain::{Mutation, StoreFilter};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted store recording which write path was taken
    #[derive(Default)]
    struct ScriptedStore {
        existing: Vec<Value>,
        write_error: Option<StoreError>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl ScriptedStore {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn write_result(&self) -> Result<(), StoreError> {
            match &self.write_error {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecordStore for ScriptedStore {
        async fn list(&self, _: Table, _: StoreFilter) -> Result<Page<Value>, StoreError> {
            self.record("list");
            Ok(Page {
                records: Vec::new(),
                total_records: 0,
            })
        }

        async fn get_by_id(&self, _: Table, _: &str) -> Result<Vec<Value>, StoreError> {
            self.record("get_by_id");
            Ok(self.existing.clone())
        }

        async fn create(&self, _: Table, id: &str, _: Value) -> Result<String, StoreError> {
            self.record("create");
            self.write_result().map(|_| id.to_string())
        }

        async fn replace(&self, _: Table, _: Value, _: &Predicate) -> Result<(), StoreError> {
            self.record("replace");
            self.write_result()
        }

        async fn delete(&self, _: Table, _: &Predicate) -> Result<(), StoreError> {
            self.record("delete");
            Ok(())
        }

        async fn truncate(&self, _: Table) -> Result<(), StoreError> {
            self.record("truncate");
            Ok(())
        }

        async fn mutate(&self, _: Vec<Mutation>) -> Result<u64, StoreError> {
            self.record("mutate");
            Ok(0)
        }
    }

    fn loan() -> Loan {
        Loan {
            id: None,
            user_id: Some("c6b8d0a4-3c4b-4a6e-9a9f-2c1f4d0b7e11".to_string()),
            proxy_user_id: None,
            item_id: "item-1".to_string(),
            action: Some("checkedout".to_string()),
            action_comment: None,
            status: None,
            loan_date: "2021-01-01T00:00:00Z".to_string(),
            due_date: None,
            return_date: None,
            system_return_date: None,
            renewal_count: None,
        }
    }

    fn conflict() -> StoreError {
        StoreError::UniqueViolation {
            constraint: OPEN_LOAN_PER_ITEM_CONSTRAINT.to_string(),
            message: "duplicate".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_defaults_status_and_mints_id() {
        let store = ScriptedStore::default();
        let created = create_loan(&store, loan()).await.unwrap();

        assert_eq!(created.loan.status, Some(LoanStatus::open()));
        let id = created.loan.id.clone().unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(created.location, id);
        assert_eq!(store.calls(), vec!["create"]);
    }

    #[tokio::test]
    async fn test_open_loan_without_user_never_writes() {
        let store = ScriptedStore::default();
        let mut anonymous = loan();
        anonymous.user_id = None;

        let err = create_loan(&store, anonymous.clone()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = replace_loan(&store, "l1", anonymous).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_dates_are_rejected_before_lookup() {
        let store = ScriptedStore::default();
        let mut bad = loan();
        bad.loan_date = "01/01/2021".to_string();

        let err = replace_loan(&store, "l1", bad).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_replace_updates_single_match() {
        let store = ScriptedStore {
            existing: vec![serde_json::json!({ "id": "l1" })],
            ..Default::default()
        };

        replace_loan(&store, "l1", loan()).await.unwrap();
        assert_eq!(store.calls(), vec!["get_by_id", "replace"]);
    }

    #[tokio::test]
    async fn test_replace_inserts_when_missing() {
        let store = ScriptedStore::default();

        replace_loan(&store, "l1", loan()).await.unwrap();
        assert_eq!(store.calls(), vec!["get_by_id", "create"]);
    }

    #[tokio::test]
    async fn test_replace_with_several_matches_takes_insert_path() {
        let store = ScriptedStore {
            existing: vec![
                serde_json::json!({ "id": "l1" }),
                serde_json::json!({ "id": "l1" }),
            ],
            ..Default::default()
        };

        replace_loan(&store, "l1", loan()).await.unwrap();
        assert_eq!(store.calls(), vec!["get_by_id", "create"]);
    }

    #[tokio::test]
    async fn test_write_conflicts_name_the_item() {
        for existing in [Vec::new(), vec![serde_json::json!({ "id": "l1" })]] {
            let store = ScriptedStore {
                existing,
                write_error: Some(conflict()),
                ..Default::default()
            };

            match replace_loan(&store, "l1", loan()).await.unwrap_err() {
                ServiceError::Conflict(errors) => {
                    let error = &errors.errors[0];
                    assert_eq!(error.message, MORE_THAN_ONE_OPEN_LOAN_MESSAGE);
                    assert_eq!(error.parameters[0].key, "itemId");
                    assert_eq!(error.parameters[0].value.as_deref(), Some("item-1"));
                }
                other => panic!("expected conflict, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_other_write_failures_are_infrastructure_errors() {
        let store = ScriptedStore {
            write_error: Some(StoreError::Backend("disk full".to_string())),
            ..Default::default()
        };

        match create_loan(&store, loan()).await.unwrap_err() {
            ServiceError::Store(StoreError::Backend(message)) => assert_eq!(message, "disk full"),
            other => panic!("expected store error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_requires_exactly_one_match() {
        let store = ScriptedStore::default();
        assert!(matches!(
            get_loan(&store, "l1").await.unwrap_err(),
            ServiceError::NotFound
        ));
    }
}
