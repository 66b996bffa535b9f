//! Classification of failed loan writes.

use super::StoreError;

/// Unique index guarding "at most one open loan per item".
pub const OPEN_LOAN_PER_ITEM_CONSTRAINT: &str = "loan_itemid_idx_unique";

pub const MORE_THAN_ONE_OPEN_LOAN_MESSAGE: &str =
    "Cannot have more than one open loan for the same item";

/// True when the write was rejected by the open-loan-per-item index.
///
/// Any other failure, including violations of other unique indexes, is an
/// infrastructure failure.
pub fn is_open_loan_conflict(error: &StoreError) -> bool {
    matches!(
        error,
        StoreError::UniqueViolation { constraint, .. } if constraint == OPEN_LOAN_PER_ITEM_CONSTRAINT
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_open_loan_index_is_a_conflict() {
        let conflict = StoreError::UniqueViolation {
            constraint: OPEN_LOAN_PER_ITEM_CONSTRAINT.to_string(),
            message: "UNIQUE constraint failed".to_string(),
        };
        assert!(is_open_loan_conflict(&conflict));

        let duplicate_id = StoreError::UniqueViolation {
            constraint: "loan.id".to_string(),
            message: "UNIQUE constraint failed: loan.id".to_string(),
        };
        assert!(!is_open_loan_conflict(&duplicate_id));

        let backend = StoreError::Backend(OPEN_LOAN_PER_ITEM_CONSTRAINT.to_string());
        assert!(!is_open_loan_conflict(&backend));
    }
}
