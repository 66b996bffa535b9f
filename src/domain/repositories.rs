//! Record store contract
//!
//! The persistence primitives the request core depends on. Records are JSON
//! documents keyed by an opaque string identifier. Implementations live in the
//! infrastructure layer.

use async_trait::async_trait;
use serde_json::Value;

use super::StoreError;
use super::filter::{FieldPath, Predicate, StoreFilter};

/// Tables owned by this module, one set per tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Loan,
    LoanHistory,
    RequestPolicy,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Loan => "loan",
            Table::LoanHistory => "audit_loan",
            Table::RequestPolicy => "request_policy",
        }
    }
}

/// One page of records plus the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total_records: u64,
}

/// A write applied to every record of a table matching a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Drop `field` from each matching document, leaving the rest intact
    RemoveField {
        table: Table,
        field: FieldPath,
        filter: Predicate,
    },
}

/// Repository trait for JSON document tables
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Find the page of records selected by `filter`
    async fn list(&self, table: Table, filter: StoreFilter) -> Result<Page<Value>, StoreError>;

    /// Find records by row identifier; normally zero or one
    async fn get_by_id(&self, table: Table, id: &str) -> Result<Vec<Value>, StoreError>;

    /// Insert a new record, returning its location token
    async fn create(&self, table: Table, id: &str, record: Value) -> Result<String, StoreError>;

    /// Overwrite the records matching `filter` with `record`
    async fn replace(
        &self,
        table: Table,
        record: Value,
        filter: &Predicate,
    ) -> Result<(), StoreError>;

    /// Delete the records matching `filter`
    async fn delete(&self, table: Table, filter: &Predicate) -> Result<(), StoreError>;

    /// Remove every record of a table
    async fn truncate(&self, table: Table) -> Result<(), StoreError>;

    /// Apply `mutations` in order as one atomic unit, returning rows touched
    async fn mutate(&self, mutations: Vec<Mutation>) -> Result<u64, StoreError>;
}
