pub mod errors;
pub mod loan;
pub mod request_policy;

pub use loan::{Loan, Loans};
pub use request_policy::{RequestPolicies, RequestPolicy};
