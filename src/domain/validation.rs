//! Deterministic field checks run before any write.

use chrono::DateTime;
use uuid::Uuid;

use crate::models::errors::ValidationErrors;
use crate::models::loan::Loan;

pub const LOAN_DATE_MESSAGE: &str = "loan date must be a date time (in RFC3339 format)";
pub const RETURN_DATE_MESSAGE: &str = "return date must be a date time (in RFC3339 format)";
pub const OPEN_LOAN_WITHOUT_USER_MESSAGE: &str = "Open loan must have a user ID";
pub const INVALID_USER_ID_MESSAGE: &str = "Invalid user ID, should be a UUID";

fn is_date_time(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
}

/// Check the loan and return dates.
///
/// Both checks always run and every failure is reported, one message per line.
pub fn validate_loan_dates(loan: &Loan) -> Result<(), String> {
    let mut messages = Vec::new();

    if !is_date_time(&loan.loan_date) {
        messages.push(LOAN_DATE_MESSAGE);
    }

    if let Some(return_date) = &loan.return_date
        && !is_date_time(return_date)
    {
        messages.push(RETURN_DATE_MESSAGE);
    }

    if messages.is_empty() {
        Ok(())
    } else {
        Err(messages.join("\n"))
    }
}

/// An open loan must name its holder.
pub fn validate_open_loan_has_user(loan: &Loan) -> Result<(), ValidationErrors> {
    if loan.is_open() && loan.user_id.is_none() {
        return Err(ValidationErrors::for_field(
            "userId",
            None,
            OPEN_LOAN_WITHOUT_USER_MESSAGE,
        ));
    }
    Ok(())
}

/// Only the 36-character hyphenated form is accepted; simple, braced and
/// URN forms are rejected.
pub fn validate_user_id(user_id: &str) -> Result<Uuid, ValidationErrors> {
    Uuid::parse_str(user_id)
        .ok()
        .filter(|parsed| {
            user_id.len() == 36 && parsed.hyphenated().to_string().eq_ignore_ascii_case(user_id)
        })
        .ok_or_else(|| {
            ValidationErrors::for_field("userId", Some(user_id), INVALID_USER_ID_MESSAGE)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::loan::LoanStatus;

    fn loan(loan_date: &str, return_date: Option<&str>) -> Loan {
        Loan {
            id: None,
            user_id: Some("c6b8d0a4-3c4b-4a6e-9a9f-2c1f4d0b7e11".to_string()),
            proxy_user_id: None,
            item_id: "item-1".to_string(),
            action: None,
            action_comment: None,
            status: Some(LoanStatus::open()),
            loan_date: loan_date.to_string(),
            due_date: None,
            return_date: return_date.map(str::to_string),
            system_return_date: None,
            renewal_count: None,
        }
    }

    #[test]
    fn test_valid_dates_pass() {
        assert!(validate_loan_dates(&loan("2021-01-01T00:00:00Z", None)).is_ok());
        assert!(
            validate_loan_dates(&loan(
                "2021-01-01T10:00:00.000+02:00",
                Some("2021-01-15T10:00:00Z")
            ))
            .is_ok()
        );
    }

    #[test]
    fn test_both_date_failures_are_reported() {
        let err = validate_loan_dates(&loan("yesterday", Some("tomorrow"))).unwrap_err();
        assert_eq!(err, format!("{}\n{}", LOAN_DATE_MESSAGE, RETURN_DATE_MESSAGE));
    }

    #[test]
    fn test_missing_loan_date_fails() {
        let err = validate_loan_dates(&loan("", None)).unwrap_err();
        assert_eq!(err, LOAN_DATE_MESSAGE);
    }

    #[test]
    fn test_open_loan_requires_user() {
        let mut open = loan("2021-01-01T00:00:00Z", None);
        open.user_id = None;
        let errors = validate_open_loan_has_user(&open).unwrap_err();
        assert_eq!(errors.errors[0].message, OPEN_LOAN_WITHOUT_USER_MESSAGE);
        assert_eq!(errors.errors[0].parameters[0].key, "userId");

        let mut closed = open.clone();
        closed.status = Some(LoanStatus::closed());
        assert!(validate_open_loan_has_user(&closed).is_ok());
    }

    #[test]
    fn test_user_id_must_be_uuid() {
        assert!(validate_user_id("c6b8d0a4-3c4b-4a6e-9a9f-2c1f4d0b7e11").is_ok());
        let errors = validate_user_id("not-a-uuid").unwrap_err();
        assert_eq!(errors.errors[0].message, INVALID_USER_ID_MESSAGE);
        assert_eq!(
            errors.errors[0].parameters[0].value.as_deref(),
            Some("not-a-uuid")
        );
    }

    #[test]
    fn test_user_id_must_be_hyphenated() {
        assert!(validate_user_id("C6B8D0A4-3C4B-4A6E-9A9F-2C1F4D0B7E11").is_ok());

        for non_canonical in [
            "c6b8d0a43c4b4a6e9a9f2c1f4d0b7e11",
            "{c6b8d0a4-3c4b-4a6e-9a9f-2c1f4d0b7e11}",
            "urn:uuid:c6b8d0a4-3c4b-4a6e-9a9f-2c1f4d0b7e11",
        ] {
            let errors = validate_user_id(non_canonical).unwrap_err();
            assert_eq!(errors.errors[0].message, INVALID_USER_ID_MESSAGE);
        }
    }
}
