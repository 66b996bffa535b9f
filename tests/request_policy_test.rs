use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use circulation_storage::infrastructure::AppState;
use circulation_storage::server::build_router;
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

const POLICIES: &str = "/request-policy-storage/request-policies";

fn setup_app() -> Router {
    build_router(AppState::new("sqlite::memory:"), &[])
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Option<String>, Option<Value>) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-okapi-tenant", "diku");

    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, location, serde_json::from_slice(&bytes).ok())
}

fn policy(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Allow holds and recalls",
        "requestTypes": ["Hold", "Recall"]
    })
}

#[tokio::test]
async fn test_create_and_fetch_request_policy() {
    let app = setup_app();

    let (status, location, body) = send(&app, "POST", POLICIES, Some(policy("Standard"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let created = body.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    let location = location.unwrap();
    assert_eq!(location, format!("{}/{}", POLICIES, id));

    let (status, _, body) = send(&app, "GET", &location, None).await;
    assert_eq!(status, StatusCode::OK);
    let fetched = body.unwrap();
    assert_eq!(fetched["name"], "Standard");
    assert_eq!(fetched["requestTypes"], json!(["Hold", "Recall"]));
}

#[tokio::test]
async fn test_put_upserts_request_policy() {
    let app = setup_app();
    let uri = format!("{}/d9cd0bed-1b49-4b5e-a7bd-064b8d177231", POLICIES);

    let (status, _, _) = send(&app, "PUT", &uri, Some(policy("First"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(&app, "PUT", &uri, Some(policy("Second"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, _, body) = send(&app, "GET", POLICIES, None).await;
    let page = body.unwrap();
    assert_eq!(page["totalRecords"], 1);
    assert_eq!(page["requestPolicies"][0]["name"], "Second");
    assert_eq!(
        page["requestPolicies"][0]["id"],
        "d9cd0bed-1b49-4b5e-a7bd-064b8d177231"
    );
}

#[tokio::test]
async fn test_delete_request_policies() {
    let app = setup_app();

    let (_, location, _) = send(&app, "POST", POLICIES, Some(policy("One"))).await;
    send(&app, "POST", POLICIES, Some(policy("Two"))).await;

    let (status, _, _) = send(&app, "DELETE", &location.clone().unwrap(), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&app, "GET", &location.unwrap(), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, "DELETE", POLICIES, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, _, body) = send(&app, "GET", POLICIES, None).await;
    assert_eq!(body.unwrap()["totalRecords"], 0);
}

#[tokio::test]
async fn test_malformed_policy_body_is_bad_request() {
    let app = setup_app();

    let req = Request::builder()
        .method("POST")
        .uri(POLICIES)
        .header("x-okapi-tenant", "diku")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
