pub mod health;
pub mod loan;
pub mod request_policy;
pub mod response;
pub mod tenant;

use axum::{
    Router,
    routing::{get, post},
};

use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Loans
        .route(
            "/loan-storage/loans",
            get(loan::list_loans)
                .post(loan::create_loan)
                .delete(loan::delete_all_loans),
        )
        .route(
            "/loan-storage/loans/:loanId",
            get(loan::get_loan)
                .put(loan::replace_loan)
                .delete(loan::delete_loan),
        )
        .route(
            "/loan-storage/loans/anonymize/:userId",
            post(loan::anonymize),
        )
        .route("/loan-storage/loan-history", get(loan::list_loan_history))
        // Request policies
        .route(
            "/request-policy-storage/request-policies",
            get(request_policy::list_request_policies)
                .post(request_policy::create_request_policy)
                .delete(request_policy::delete_all_request_policies),
        )
        .route(
            "/request-policy-storage/request-policies/:requestPolicyId",
            get(request_policy::get_request_policy)
                .put(request_policy::replace_request_policy)
                .delete(request_policy::delete_request_policy),
        )
        .with_state(state)
}
