//! Store-executable filters
//!
//! A [`StoreFilter`] is what the query translator hands to a [`RecordStore`]:
//! a predicate over the stored JSON documents, an ordering, and the paging
//! window. Nothing here knows about SQL; the store adapter renders it.
//!
//! [`RecordStore`]: super::RecordStore

use std::fmt;

use super::repositories::Table;

/// Dotted path into a stored JSON document, e.g. `status.name`.
///
/// Only ASCII alphanumerics, `_` and single dots between segments are
/// accepted, so a path can be embedded into a storage expression verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.split('.').all(|segment| {
                !segment.is_empty()
                    && segment
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_')
            });

        valid.then(|| Self(raw.to_string()))
    }

    /// Path fixed in code rather than supplied by a caller
    pub fn from_static(path: &'static str) -> Self {
        debug_assert!(Self::parse(path).is_some(), "malformed field path {}", path);
        Self(path.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `==`: exact equality
    Equal,
    /// `=`: case-insensitive match, `*` and `?` are wildcards
    Matches,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl Term {
    pub fn text(value: impl Into<String>) -> Self {
        Term::Text(value.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every record
    All,
    /// Matches the record whose row identifier equals the value
    IdEquals(String),
    Compare {
        field: FieldPath,
        op: Comparison,
        value: Term,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    /// `field` of the outer record is one of the `selected` values of the
    /// records in `table` matching `filter`
    InSelection {
        field: FieldPath,
        table: Table,
        selected: FieldPath,
        filter: Box<Predicate>,
    },
}

impl Predicate {
    pub fn equals(field: FieldPath, value: Term) -> Self {
        Predicate::Compare {
            field,
            op: Comparison::Equal,
            value,
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        match (self, other) {
            (Predicate::All, other) => other,
            (this, Predicate::All) => this,
            (this, other) => Predicate::And(Box::new(this), Box::new(other)),
        }
    }

    pub fn or(self, other: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    pub fn and_not(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(Predicate::Not(Box::new(other))))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortField {
    Document(FieldPath),
    /// Row creation timestamp maintained by the store
    CreatedDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub order: SortOrder,
}

/// Everything a store needs to answer a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreFilter {
    pub predicate: Predicate,
    pub sort: Vec<SortKey>,
    pub offset: u64,
    pub limit: u64,
    pub with_total: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_rejects_unsafe_input() {
        assert!(FieldPath::parse("status.name").is_some());
        assert!(FieldPath::parse("user_id").is_some());
        assert!(FieldPath::parse("").is_none());
        assert!(FieldPath::parse("status..name").is_none());
        assert!(FieldPath::parse("name')--").is_none());
        assert!(FieldPath::parse(".name").is_none());
    }

    #[test]
    fn test_and_with_all_collapses() {
        let field = FieldPath::parse("itemId").unwrap();
        let compare = Predicate::equals(field, Term::text("x"));

        assert_eq!(Predicate::All.and(compare.clone()), compare);
        assert_eq!(compare.clone().and(Predicate::All), compare);
    }
}
