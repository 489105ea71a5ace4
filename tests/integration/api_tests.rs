//! API integration tests, driven in-process through the router

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use toolwatch_server::{
    api,
    clock::ManualClock,
    config::AppConfig,
    models::timestamp,
    repository::Repository,
    services::Services,
    storage::{memory::MemoryStorage, Storage},
    AppState,
};

const NOW: &str = "2023-04-10T12:00";

struct TestApp {
    router: Router,
    clock: ManualClock,
}

async fn app(seed_demo_data: bool) -> TestApp {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let repository = Repository::load(storage.clone(), seed_demo_data).await;
    let clock = ManualClock::new(timestamp::parse(NOW).unwrap());
    let config = AppConfig::default();
    let services = Services::new(repository, Arc::new(clock.clone()), config.auth.clone());
    services.status.recompute().await;

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        storage,
    };
    TestApp {
        router: api::create_router(state),
        clock,
    }
}

async fn send(app: &TestApp, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(format!("/api/v1{}", uri));
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Helper to log in as one of the default accounts
async fn login(app: &TestApp, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().expect("No token in response").to_string()
}

async fn create_tool(app: &TestApp, token: &str, name: &str) -> Value {
    let (status, body) = send(app, Method::POST, "/tools", Some(token), Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

#[tokio::test]
async fn test_health_check() {
    let app = app(false).await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_login() {
    let app = app(false).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": "admin", "password": "admin123" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["role"], "admin");

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": "admin", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = app(true).await;
    let (status, _) = send(&app, Method::GET, "/tools", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/tools", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_permission_is_forbidden() {
    let app = app(true).await;
    let token = login(&app, "user", "user123").await;

    let (status, body) = send(&app, Method::GET, "/tools", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);

    let (status, _) = send(&app, Method::POST, "/tools", Some(&token), Some(json!({ "name": "SEM-01" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::GET, "/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_tool_create_and_duplicate() {
    let app = app(false).await;
    let token = login(&app, "admin", "admin123").await;

    let tool = create_tool(&app, &token, "  SEM-01  ").await;
    assert_eq!(tool["name"], "SEM-01");
    assert_eq!(tool["status"], "Up");
    assert_eq!(tool["hasIssues"], false);

    let (status, _) = send(&app, Method::POST, "/tools", Some(&token), Some(json!({ "name": "SEM-01" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::POST, "/tools", Some(&token), Some(json!({ "name": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The new tool is also offered to the consumables page
    let (_, names) = send(&app, Method::GET, "/consumables/tools", Some(&token), None).await;
    assert!(names.as_array().unwrap().contains(&json!("SEM-01")));
}

#[tokio::test]
async fn test_issue_maintenance_and_recovery_drive_status() {
    let app = app(false).await;
    let token = login(&app, "admin", "admin123").await;
    let tool = create_tool(&app, &token, "SEM-01").await;
    let id = tool["id"].as_i64().unwrap();

    let (status, issue) = send(
        &app,
        Method::POST,
        &format!("/tools/{}/issues", id),
        Some(&token),
        Some(json!({ "description": "Beam unstable" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(issue["user"], "admin");

    let (_, tool) = send(&app, Method::GET, &format!("/tools/{}", id), Some(&token), None).await;
    assert_eq!(tool["status"], "Down");
    assert_eq!(tool["hasIssues"], true);

    let (status, maintenance) = send(
        &app,
        Method::POST,
        &format!("/tools/{}/maintenance", id),
        Some(&token),
        Some(json!({
            "description": "Column bake-out",
            "start_date": "2023-04-10T09:00",
            "end_date": "2023-04-11T09:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(maintenance["description"], "Scheduled maintenance: Column bake-out");

    // Maintenance outranks the open issue, which is still flagged
    let (_, tool) = send(&app, Method::GET, &format!("/tools/{}", id), Some(&token), None).await;
    assert_eq!(tool["status"], "Maintenance");
    assert_eq!(tool["hasIssues"], true);
    assert_eq!(tool["hasMaintenance"], true);

    let (status, recoveries) = send(
        &app,
        Method::POST,
        &format!("/tools/{}/recovery", id),
        Some(&token),
        Some(json!({
            "item_ids": [issue["id"], maintenance["id"]],
            "description": "Realigned and baked",
            "attended_by": "Field engineer"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(recoveries.as_array().unwrap().len(), 2);

    let (_, tool) = send(&app, Method::GET, &format!("/tools/{}", id), Some(&token), None).await;
    assert_eq!(tool["status"], "Up");
    assert_eq!(tool["hasIssues"], false);
    assert_eq!(tool["hasMaintenance"], false);
}

#[tokio::test]
async fn test_resolve_and_delete_history() {
    let app = app(false).await;
    let token = login(&app, "admin", "admin123").await;
    let tool = create_tool(&app, &token, "SEM-01").await;
    let id = tool["id"].as_i64().unwrap();

    let (_, issue) = send(
        &app,
        Method::POST,
        &format!("/tools/{}/issues", id),
        Some(&token),
        Some(json!({ "description": "Vacuum leak" })),
    )
    .await;
    let event_id = issue["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/history/{}/resolve", event_id),
        Some(&token),
        Some(json!({ "resolution_steps": "Replaced gasket", "resolved_by": "Service team" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, tool) = send(&app, Method::GET, &format!("/tools/{}", id), Some(&token), None).await;
    assert_eq!(tool["status"], "Up");

    let (_, history) = send(
        &app,
        Method::GET,
        &format!("/tools/{}/history?include_resolved=true", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(history[0]["resolved"], true);
    assert_eq!(history[0]["resolvedBy"], "Service team");

    let (status, _) = send(&app, Method::DELETE, &format!("/history/{}", event_id), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, history) = send(&app, Method::GET, "/history", Some(&token), None).await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_history_log_lists_resolved_events_for_selected_tools() {
    let app = app(false).await;
    let token = login(&app, "admin", "admin123").await;
    let sem = create_tool(&app, &token, "SEM-01").await["id"].as_i64().unwrap();
    let tem = create_tool(&app, &token, "TEM-01").await["id"].as_i64().unwrap();
    let fib = create_tool(&app, &token, "FIB-01").await["id"].as_i64().unwrap();

    let mut issue_ids = Vec::new();
    for id in [sem, tem, fib] {
        let (_, issue) = send(
            &app,
            Method::POST,
            &format!("/tools/{}/issues", id),
            Some(&token),
            Some(json!({ "description": "Needs attention" })),
        )
        .await;
        issue_ids.push(issue["id"].as_i64().unwrap());
    }
    send(
        &app,
        Method::PUT,
        &format!("/history/{}/resolve", issue_ids[0]),
        Some(&token),
        Some(json!({ "resolution_steps": "Fixed", "resolved_by": "tech" })),
    )
    .await;

    // The whole log keeps resolved events
    let (status, log) = send(&app, Method::GET, "/history", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(log.as_array().unwrap().len(), 3);

    let (_, log) = send(&app, Method::GET, "/history?tools=SEM-01&tools=TEM-01", Some(&token), None).await;
    let names: Vec<&str> = log
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["toolName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["TEM-01", "SEM-01"]);

    let (_, log) = send(&app, Method::GET, "/history?include_resolved=false", Some(&token), None).await;
    assert_eq!(log.as_array().unwrap().len(), 2);

    // One tool's history hides what was resolved
    let (_, history) = send(&app, Method::GET, &format!("/tools/{}/history", sem), Some(&token), None).await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_maintenance_window_expires_on_recompute() {
    let app = app(false).await;
    let token = login(&app, "admin", "admin123").await;
    let tool = create_tool(&app, &token, "SEM-01").await;
    let id = tool["id"].as_i64().unwrap();

    send(
        &app,
        Method::POST,
        &format!("/tools/{}/maintenance", id),
        Some(&token),
        Some(json!({
            "description": "Short service",
            "start_date": "2023-04-10T09:00",
            "end_date": "2023-04-10T15:00"
        })),
    )
    .await;
    let (_, tool) = send(&app, Method::GET, &format!("/tools/{}", id), Some(&token), None).await;
    assert_eq!(tool["status"], "Maintenance");

    app.clock.set(timestamp::parse("2023-04-10T15:00").unwrap());
    let (status, body) = send(&app, Method::POST, "/tools/recompute", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], 1);

    let (_, tool) = send(&app, Method::GET, &format!("/tools/{}", id), Some(&token), None).await;
    assert_eq!(tool["status"], "Up");
}

#[tokio::test]
async fn test_rename_cascades_to_consumables() {
    let app = app(true).await;
    let token = login(&app, "admin", "admin123").await;

    let (status, tool) = send(&app, Method::PUT, "/tools/1", Some(&token), Some(json!({ "name": "FIB-01: Helios 5" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tool["name"], "FIB-01: Helios 5");

    let (_, parts) = send(&app, Method::GET, "/consumables?tool=FIB-01:%20Helios%205", Some(&token), None).await;
    assert!(!parts.as_array().unwrap().is_empty());

    let (status, _) = send(&app, Method::DELETE, "/tools/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, parts) = send(&app, Method::GET, "/consumables?tool=FIB-01:%20Helios%205", Some(&token), None).await;
    assert!(parts.as_array().unwrap().is_empty());

    let (status, _) = send(&app, Method::GET, "/tools/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_consumables_due_and_dashboard() {
    let app = app(false).await;
    let token = login(&app, "admin", "admin123").await;
    create_tool(&app, &token, "SEM-01").await;

    let (status, part) = send(
        &app,
        Method::POST,
        "/consumables",
        Some(&token),
        Some(json!({
            "tool_name": "SEM-01",
            "name": "Filament",
            "current_hours": 1200,
            "guaranteed_hours": 1000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(part["lastReplaced"], "2023-04-10");

    let (_, due) = send(&app, Method::GET, "/consumables/due", Some(&token), None).await;
    assert_eq!(due.as_array().unwrap().len(), 1);

    let (status, dashboard) = send(&app, Method::GET, "/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["consumablesDue"][0]["name"], "Filament");
    assert_eq!(dashboard["tools"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, "/consumables/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inventory_requires_positive_quantity() {
    let app = app(false).await;
    let token = login(&app, "lead", "lead123").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/inventory",
        Some(&token),
        Some(json!({ "name": "Aperture strip", "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, item) = send(
        &app,
        Method::POST,
        "/inventory",
        Some(&token),
        Some(json!({ "name": "Aperture strip", "quantity": 3, "storage_location": "Cabinet B" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["quantity"], 3);

    let (_, items) = send(&app, Method::GET, "/inventory", Some(&token), None).await;
    assert_eq!(items.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_credentials_per_tool() {
    let app = app(false).await;
    let admin = login(&app, "admin", "admin123").await;
    let tool = create_tool(&app, &admin, "SEM-01").await;
    let id = tool["id"].as_i64().unwrap();

    let (status, credential) = send(
        &app,
        Method::POST,
        &format!("/tools/{}/credentials", id),
        Some(&admin),
        Some(json!({ "system": "Support PC", "username": "microscope", "password": "s3cret" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, all) = send(&app, Method::GET, "/credentials", Some(&admin), None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let user = login(&app, "user", "user123").await;
    let (status, _) = send(&app, Method::GET, &format!("/tools/{}/credentials", id), Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/tools/{}/credentials/{}", id, credential["id"]),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/tools/999/credentials", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_users_list_hides_passwords() {
    let app = app(false).await;
    let token = login(&app, "admin", "admin123").await;

    let (status, users) = send(&app, Method::GET, "/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 3);
    assert!(users.iter().all(|u| u.get("password").is_none()));

    let admin_id = users.iter().find(|u| u["username"] == "admin").unwrap()["id"].clone();
    let (status, _) = send(&app, Method::DELETE, &format!("/users/{}", admin_id), Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
