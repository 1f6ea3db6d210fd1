use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use recruitify::recruiting::{
    recruiting_router, InMemoryStore, RecruitingService, RecruitingStore, SqliteStore,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn router_for<S: RecruitingStore + 'static>(store: S) -> Router {
    recruiting_router(Arc::new(RecruitingService::new(Arc::new(store))))
}

async fn call(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("serializable"))),
        None => builder.body(Body::empty()),
    }
    .expect("request builds");

    let response = router.clone().oneshot(request).await.expect("route executes");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    (status, serde_json::from_slice(&bytes).expect("json payload"))
}

async fn hiring_flow(router: Router) {
    let (status, job) = call(
        &router,
        "POST",
        "/api/jobs",
        Some(json!({ "title": "Backend Engineer" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(job["id"], json!(1));
    assert_eq!(job["description"], Value::Null);
    assert_eq!(job["location"], Value::Null);

    let (status, _) = call(
        &router,
        "POST",
        "/api/jobs",
        Some(json!({ "title": "Data Analyst Intern", "location": "Onsite" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, jobs) = call(&router, "GET", "/api/jobs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(jobs[0]["title"], json!("Data Analyst Intern"));
    assert_eq!(jobs[1]["title"], json!("Backend Engineer"));

    let (status, view) = call(
        &router,
        "POST",
        "/api/apply",
        Some(json!({ "name": "Ada", "email": "ada@x.com", "job_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view["job"]["title"], json!("Backend Engineer"));
    assert_eq!(view["candidate"]["email"], json!("ada@x.com"));

    let (status, _) = call(
        &router,
        "POST",
        "/api/apply",
        Some(json!({
            "name": "Ada",
            "email": "ada@x.com",
            "job_id": 2,
            "cover_letter": "Happy to help with reports."
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, candidates) = call(&router, "GET", "/api/candidates", None).await;
    assert_eq!(candidates.as_array().map(Vec::len), Some(1));

    let (status, _) = call(
        &router,
        "POST",
        "/api/candidates",
        Some(json!({ "name": "Grace", "email": "grace@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, candidates) = call(&router, "GET", "/api/candidates", None).await;
    assert_eq!(candidates.as_array().map(Vec::len), Some(2));
    assert_eq!(candidates[0]["email"], json!("grace@x.com"));
    assert_eq!(candidates[1]["email"], json!("ada@x.com"));

    let (status, applications) = call(&router, "GET", "/api/applications", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(applications.as_array().map(Vec::len), Some(2));
    assert_eq!(applications[0]["job"]["title"], json!("Data Analyst Intern"));
    assert_eq!(
        applications[0]["cover_letter"],
        json!("Happy to help with reports.")
    );
    assert_eq!(applications[1]["job"]["id"], json!(1));

    let (status, _) = call(
        &router,
        "POST",
        "/api/apply",
        Some(json!({ "email": "x@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &router,
        "POST",
        "/api/candidates",
        Some(json!({ "name": "Imposter", "email": "ada@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().is_some());

    let (status, _) = call(&router, "DELETE", "/api/jobs/2", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, applications) = call(&router, "GET", "/api/applications", None).await;
    assert_eq!(applications.as_array().map(Vec::len), Some(1));
    let (_, jobs) = call(&router, "GET", "/api/jobs", None).await;
    assert_eq!(jobs.as_array().map(Vec::len), Some(1));

    let (status, _) = call(&router, "DELETE", "/api/jobs/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn user_accounts(router: Router) {
    let (status, first) = call(
        &router,
        "POST",
        "/api/users",
        Some(json!({ "username": "grace", "email": "grace@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["role"], json!("recruiter"));

    let (status, _) = call(
        &router,
        "POST",
        "/api/users",
        Some(json!({ "username": "root", "email": "root@x.com", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call(
        &router,
        "POST",
        "/api/users",
        Some(json!({ "email": "nobody@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, users) = call(&router, "GET", "/api/users", None).await;
    assert_eq!(users[0]["username"], json!("root"));
    assert_eq!(users[1]["username"], json!("grace"));

    let (status, _) = call(&router, "DELETE", "/api/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&router, "GET", "/api/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, users) = call(&router, "GET", "/api/users", None).await;
    assert_eq!(users.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn hiring_flow_over_memory_store() {
    hiring_flow(router_for(InMemoryStore::default())).await;
}

#[tokio::test]
async fn hiring_flow_over_sqlite_store() {
    let store = SqliteStore::open_in_memory().expect("sqlite opens");
    hiring_flow(router_for(store)).await;
}

#[tokio::test]
async fn user_accounts_over_memory_store() {
    user_accounts(router_for(InMemoryStore::default())).await;
}

#[tokio::test]
async fn user_accounts_over_sqlite_store() {
    let store = SqliteStore::open_in_memory().expect("sqlite opens");
    user_accounts(router_for(store)).await;
}

#[tokio::test]
async fn sqlite_file_store_serves_existing_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("recruitify.db");

    let router = router_for(SqliteStore::open(&path).expect("sqlite opens"));
    let (status, _) = call(
        &router,
        "POST",
        "/api/jobs",
        Some(json!({ "title": "Frontend Developer", "location": "Lagos" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    drop(router);

    let reopened = router_for(SqliteStore::open(&path).expect("sqlite reopens"));
    let (status, job) = call(&reopened, "GET", "/api/jobs/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["location"], json!("Lagos"));
}
