use crate::api;
use crate::models::errors::{ErrorParameter, ValidationError, ValidationErrors};
use crate::models::loan::{Loan, LoanStatus, LoanStatusName, Loans};
use crate::models::request_policy::{RequestPolicies, RequestPolicy, RequestType};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::loan::list_loans,
        api::loan::create_loan,
        api::loan::delete_all_loans,
        api::loan::get_loan,
        api::loan::replace_loan,
        api::loan::delete_loan,
        api::loan::anonymize,
        api::loan::list_loan_history,
        api::request_policy::list_request_policies,
        api::request_policy::create_request_policy,
        api::request_policy::delete_all_request_policies,
        api::request_policy::get_request_policy,
        api::request_policy::replace_request_policy,
        api::request_policy::delete_request_policy,
    ),
    components(
        schemas(
            Loan,
            LoanStatus,
            LoanStatusName,
            Loans,
            RequestPolicy,
            RequestType,
            RequestPolicies,
            ValidationErrors,
            ValidationError,
            ErrorParameter,
        )
    ),
    tags(
        (name = "loans", description = "Loan storage and history"),
        (name = "request-policies", description = "Request policy storage")
    )
)]
pub struct ApiDoc;
