//! Turns a caller's query string and paging window into a [`StoreFilter`].

use crate::domain::{Predicate, SortField, SortKey, SortOrder, StoreError, StoreFilter};

use super::cql::{self, CqlQuery};

fn compile(query: Option<&str>) -> Result<CqlQuery, StoreError> {
    match query.map(str::trim) {
        None | Some("") => Ok(CqlQuery {
            predicate: Predicate::All,
            sort: Vec::new(),
        }),
        Some(text) => cql::parse(text).map_err(|e| StoreError::Query(e.to_string())),
    }
}

/// Filter for a plain listing: the query as given, bounded by offset/limit.
pub fn list_filter(query: Option<&str>, offset: u64, limit: u64) -> Result<StoreFilter, StoreError> {
    let compiled = compile(query)?;

    Ok(StoreFilter {
        predicate: compiled.predicate,
        sort: compiled.sort,
        offset,
        limit,
        with_total: true,
    })
}

/// Filter for the loan history listing.
///
/// An explicit `sortBy` is kept as is; without one the newest entries come
/// first.
pub fn history_filter(
    query: Option<&str>,
    offset: u64,
    limit: u64,
) -> Result<StoreFilter, StoreError> {
    let mut filter = list_filter(query, offset, limit)?;

    if filter.sort.is_empty() {
        filter.sort.push(SortKey {
            field: SortField::CreatedDate,
            order: SortOrder::Descending,
        });
    }

    Ok(filter)
}
