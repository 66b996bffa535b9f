//! Loan anonymization
//!
//! Clears a patron's identifier from their closed loans and from the history
//! entries of those same loans. History is cleared first, while the closed
//! loans can still be selected by user; both steps commit together.

use crate::domain::validation::validate_user_id;
use crate::domain::{FieldPath, Mutation, Predicate, RecordStore, ServiceError, Table, Term};
use crate::models::loan::LoanStatusName;

fn closed_loans_of(user_id: &str) -> Predicate {
    Predicate::equals(FieldPath::from_static("userId"), Term::text(user_id)).and(
        Predicate::equals(
            FieldPath::from_static("status.name"),
            Term::text(LoanStatusName::Closed.as_str()),
        ),
    )
}

/// The ordered mutations that anonymize `user_id`'s closed loans.
///
/// History entries qualify when they still carry the user and describe a
/// loan that is currently closed for that user. Open loans and their history
/// are never touched.
pub fn anonymization_plan(user_id: &str) -> Vec<Mutation> {
    let user_id_field = FieldPath::from_static("userId");

    let history_of_closed_loans =
        Predicate::equals(user_id_field.clone(), Term::text(user_id)).and(
            Predicate::InSelection {
                field: FieldPath::from_static("id"),
                table: Table::Loan,
                selected: FieldPath::from_static("id"),
                filter: Box::new(closed_loans_of(user_id)),
            },
        );

    vec![
        Mutation::RemoveField {
            table: Table::LoanHistory,
            field: user_id_field.clone(),
            filter: history_of_closed_loans,
        },
        Mutation::RemoveField {
            table: Table::Loan,
            field: user_id_field,
            filter: closed_loans_of(user_id),
        },
    ]
}

/// Anonymize every closed loan of a user. Running it again changes nothing.
pub async fn anonymize_loans(store: &dyn RecordStore, user_id: &str) -> Result<(), ServiceError> {
    validate_user_id(user_id).map_err(ServiceError::Validation)?;

    tracing::info!("Anonymizing closed loans for user {}", user_id);
    let cleared = store.mutate(anonymization_plan(user_id)).await?;
    tracing::info!("Anonymization cleared {} record(s) for user {}", cleared, user_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_cleared_before_loans() {
        let plan = anonymization_plan("u1");
        let tables: Vec<Table> = plan
            .iter()
            .map(|m| match m {
                Mutation::RemoveField { table, .. } => *table,
            })
            .collect();

        assert_eq!(tables, vec![Table::LoanHistory, Table::Loan]);
    }

    #[test]
    fn test_loan_step_only_selects_closed_loans() {
        let plan = anonymization_plan("u1");
        let Mutation::RemoveField { field, filter, .. } = &plan[1];

        assert_eq!(field.as_str(), "userId");
        assert_eq!(filter, &closed_loans_of("u1"));
    }

    #[test]
    fn test_history_step_is_scoped_to_closed_loans_of_user() {
        let plan = anonymization_plan("u1");
        let Mutation::RemoveField { filter, .. } = &plan[0];

        match filter {
            Predicate::And(user, selection) => {
                assert_eq!(
                    **user,
                    Predicate::equals(FieldPath::from_static("userId"), Term::text("u1"))
                );
                match &**selection {
                    Predicate::InSelection { table, filter, .. } => {
                        assert_eq!(*table, Table::Loan);
                        assert_eq!(**filter, closed_loans_of("u1"));
                    }
                    other => panic!("expected selection, got {:?}", other),
                }
            }
            other => panic!("expected conjunction, got {:?}", other),
        }
    }
}
