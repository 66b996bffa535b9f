//! Loan storage handlers

use axum::{
    Json,
    extract::{Path, Query, rejection::JsonRejection},
};

use super::response::{PageQuery, body};
use super::tenant::TenantStore;
use crate::domain::{ServiceError, StorageResponse};
use crate::models::loan::Loan;
use crate::services::{anonymize_loans, loan_service};

pub const LOANS_PATH: &str = "/loan-storage/loans";

#[utoipa::path(
    get,
    path = "/loan-storage/loans",
    params(PageQuery, ("x-okapi-tenant" = String, Header, description = "Tenant id")),
    responses(
        (status = 200, description = "Page of loans", body = crate::models::loan::Loans),
        (status = 400, description = "Bad paging parameters"),
        (status = 500, description = "Malformed query or storage failure")
    ),
    tag = "loans"
)]
pub async fn list_loans(
    TenantStore(store): TenantStore,
    Query(params): Query<PageQuery>,
) -> StorageResponse {
    let params = match params.checked() {
        Ok(p) => p,
        Err(r) => return r,
    };

    loan_service::list_loans(
        store.as_ref(),
        params.query.as_deref(),
        params.offset,
        params.limit,
    )
    .await
    .into()
}

#[utoipa::path(
    post,
    path = "/loan-storage/loans",
    params(("x-okapi-tenant" = String, Header, description = "Tenant id")),
    request_body = Loan,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 400, description = "Malformed body or dates"),
        (status = 422, description = "Open loan without user, or item already on loan")
    ),
    tag = "loans"
)]
pub async fn create_loan(
    TenantStore(store): TenantStore,
    payload: Result<Json<Loan>, JsonRejection>,
) -> StorageResponse {
    let loan = match body(payload) {
        Ok(loan) => loan,
        Err(r) => return r,
    };

    match loan_service::create_loan(store.as_ref(), loan).await {
        Ok(created) => match serde_json::to_value(&created.loan) {
            Ok(body) => StorageResponse::Created {
                location: format!("{}/{}", LOANS_PATH, created.location),
                body,
            },
            Err(e) => ServiceError::from(e).into(),
        },
        Err(e) => e.into(),
    }
}

#[utoipa::path(
    delete,
    path = "/loan-storage/loans",
    params(("x-okapi-tenant" = String, Header, description = "Tenant id")),
    responses((status = 204, description = "All loans removed")),
    tag = "loans"
)]
pub async fn delete_all_loans(TenantStore(store): TenantStore) -> StorageResponse {
    StorageResponse::no_content(loan_service::delete_all_loans(store.as_ref()).await)
}

#[utoipa::path(
    get,
    path = "/loan-storage/loans/{loanId}",
    params(
        ("loanId" = String, Path, description = "Loan id"),
        ("x-okapi-tenant" = String, Header, description = "Tenant id")
    ),
    responses(
        (status = 200, description = "The loan", body = Loan),
        (status = 404, description = "No such loan")
    ),
    tag = "loans"
)]
pub async fn get_loan(
    TenantStore(store): TenantStore,
    Path(loan_id): Path<String>,
) -> StorageResponse {
    loan_service::get_loan(store.as_ref(), &loan_id).await.into()
}

#[utoipa::path(
    put,
    path = "/loan-storage/loans/{loanId}",
    params(
        ("loanId" = String, Path, description = "Loan id"),
        ("x-okapi-tenant" = String, Header, description = "Tenant id")
    ),
    request_body = Loan,
    responses(
        (status = 204, description = "Loan replaced or created"),
        (status = 400, description = "Malformed body or dates"),
        (status = 422, description = "Open loan without user, or item already on loan")
    ),
    tag = "loans"
)]
pub async fn replace_loan(
    TenantStore(store): TenantStore,
    Path(loan_id): Path<String>,
    payload: Result<Json<Loan>, JsonRejection>,
) -> StorageResponse {
    let loan = match body(payload) {
        Ok(loan) => loan,
        Err(r) => return r,
    };

    StorageResponse::no_content(loan_service::replace_loan(store.as_ref(), &loan_id, loan).await)
}

#[utoipa::path(
    delete,
    path = "/loan-storage/loans/{loanId}",
    params(
        ("loanId" = String, Path, description = "Loan id"),
        ("x-okapi-tenant" = String, Header, description = "Tenant id")
    ),
    responses((status = 204, description = "Loan removed, or it never existed")),
    tag = "loans"
)]
pub async fn delete_loan(
    TenantStore(store): TenantStore,
    Path(loan_id): Path<String>,
) -> StorageResponse {
    StorageResponse::no_content(loan_service::delete_loan(store.as_ref(), &loan_id).await)
}

#[utoipa::path(
    post,
    path = "/loan-storage/loans/anonymize/{userId}",
    params(
        ("userId" = String, Path, description = "Patron whose closed loans are anonymized"),
        ("x-okapi-tenant" = String, Header, description = "Tenant id")
    ),
    responses(
        (status = 204, description = "Closed loans anonymized"),
        (status = 422, description = "User id is not a UUID")
    ),
    tag = "loans"
)]
pub async fn anonymize(
    TenantStore(store): TenantStore,
    Path(user_id): Path<String>,
) -> StorageResponse {
    StorageResponse::no_content(anonymize_loans(store.as_ref(), &user_id).await)
}

#[utoipa::path(
    get,
    path = "/loan-storage/loan-history",
    params(PageQuery, ("x-okapi-tenant" = String, Header, description = "Tenant id")),
    responses(
        (status = 200, description = "Page of loan history entries, newest first by default", body = crate::models::loan::Loans)
    ),
    tag = "loans"
)]
pub async fn list_loan_history(
    TenantStore(store): TenantStore,
    Query(params): Query<PageQuery>,
) -> StorageResponse {
    let params = match params.checked() {
        Ok(p) => p,
        Err(r) => return r,
    };

    loan_service::list_loan_history(
        store.as_ref(),
        params.query.as_deref(),
        params.offset,
        params.limit,
    )
    .await
    .into()
}
