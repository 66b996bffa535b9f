//! Request policy storage handlers

use axum::{
    Json,
    extract::{Path, Query, rejection::JsonRejection},
};

use super::response::{PageQuery, body};
use super::tenant::TenantStore;
use crate::domain::{ServiceError, StorageResponse};
use crate::models::request_policy::RequestPolicy;
use crate::services::request_policy_service;

pub const REQUEST_POLICIES_PATH: &str = "/request-policy-storage/request-policies";

#[utoipa::path(
    get,
    path = "/request-policy-storage/request-policies",
    params(PageQuery, ("x-okapi-tenant" = String, Header, description = "Tenant id")),
    responses((status = 200, description = "Page of request policies", body = crate::models::request_policy::RequestPolicies)),
    tag = "request-policies"
)]
pub async fn list_request_policies(
    TenantStore(store): TenantStore,
    Query(params): Query<PageQuery>,
) -> StorageResponse {
    let params = match params.checked() {
        Ok(p) => p,
        Err(r) => return r,
    };

    request_policy_service::list_request_policies(
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
    path = "/request-policy-storage/request-policies",
    params(("x-okapi-tenant" = String, Header, description = "Tenant id")),
    request_body = RequestPolicy,
    responses((status = 201, description = "Request policy created", body = RequestPolicy)),
    tag = "request-policies"
)]
pub async fn create_request_policy(
    TenantStore(store): TenantStore,
    payload: Result<Json<RequestPolicy>, JsonRejection>,
) -> StorageResponse {
    let policy = match body(payload) {
        Ok(policy) => policy,
        Err(r) => return r,
    };

    match request_policy_service::create_request_policy(store.as_ref(), policy).await {
        Ok(created) => match serde_json::to_value(&created.policy) {
            Ok(body) => StorageResponse::Created {
                location: format!("{}/{}", REQUEST_POLICIES_PATH, created.location),
                body,
            },
            Err(e) => ServiceError::from(e).into(),
        },
        Err(e) => e.into(),
    }
}

#[utoipa::path(
    delete,
    path = "/request-policy-storage/request-policies",
    params(("x-okapi-tenant" = String, Header, description = "Tenant id")),
    responses((status = 204, description = "All request policies removed")),
    tag = "request-policies"
)]
pub async fn delete_all_request_policies(TenantStore(store): TenantStore) -> StorageResponse {
    StorageResponse::no_content(
        request_policy_service::delete_all_request_policies(store.as_ref()).await,
    )
}

#[utoipa::path(
    get,
    path = "/request-policy-storage/request-policies/{requestPolicyId}",
    params(
        ("requestPolicyId" = String, Path, description = "Request policy id"),
        ("x-okapi-tenant" = String, Header, description = "Tenant id")
    ),
    responses(
        (status = 200, description = "The request policy", body = RequestPolicy),
        (status = 404, description = "No such request policy")
    ),
    tag = "request-policies"
)]
pub async fn get_request_policy(
    TenantStore(store): TenantStore,
    Path(policy_id): Path<String>,
) -> StorageResponse {
    request_policy_service::get_request_policy(store.as_ref(), &policy_id)
        .await
        .into()
}

#[utoipa::path(
    put,
    path = "/request-policy-storage/request-policies/{requestPolicyId}",
    params(
        ("requestPolicyId" = String, Path, description = "Request policy id"),
        ("x-okapi-tenant" = String, Header, description = "Tenant id")
    ),
    request_body = RequestPolicy,
    responses((status = 204, description = "Request policy replaced or created")),
    tag = "request-policies"
)]
pub async fn replace_request_policy(
    TenantStore(store): TenantStore,
    Path(policy_id): Path<String>,
    payload: Result<Json<RequestPolicy>, JsonRejection>,
) -> StorageResponse {
    let policy = match body(payload) {
        Ok(policy) => policy,
        Err(r) => return r,
    };

    StorageResponse::no_content(
        request_policy_service::replace_request_policy(store.as_ref(), &policy_id, policy).await,
    )
}

#[utoipa::path(
    delete,
    path = "/request-policy-storage/request-policies/{requestPolicyId}",
    params(
        ("requestPolicyId" = String, Path, description = "Request policy id"),
        ("x-okapi-tenant" = String, Header, description = "Tenant id")
    ),
    responses((status = 204, description = "Request policy removed")),
    tag = "request-policies"
)]
pub async fn delete_request_policy(
    TenantStore(store): TenantStore,
    Path(policy_id): Path<String>,
) -> StorageResponse {
    StorageResponse::no_content(
        request_policy_service::delete_request_policy(store.as_ref(), &policy_id).await,
    )
}
