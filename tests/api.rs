//! HTTP API tests driving the router in-process

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use precinct_server::api;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::fixture;

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn registration(first_name: &str, email: &str, badge: &str, rank: &str) -> Value {
    json!({
        "first_name": first_name,
        "last_name": "Desai",
        "email": email,
        "password": "correct-horse",
        "confirm_password": "correct-horse",
        "badge_number": badge,
        "rank": rank,
        "division": "patrol",
        "supervisor": "Insp. Kale",
        "accept_terms": true
    })
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"email": email, "password": "correct-horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["token_type"], "Bearer");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let f = fixture();
    let app = api::router(f.state.clone());

    let (status, body) = send(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = send(&app, Method::GET, "/api/v1/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);

    f.store.set_unavailable(true);
    let (status, _) = send(&app, Method::GET, "/api/v1/ready", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_registration_form_errors() {
    let f = fixture();
    let app = api::router(f.state.clone());

    let mut form = registration("Priya", "not-an-email", "P-1", "officer");
    form["confirm_password"] = json!("something-else");
    form["accept_terms"] = json!(false);

    let (status, body) = send(&app, Method::POST, "/api/v1/auth/register", None, Some(form)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["email"], "Email is invalid");
    assert_eq!(body["fields"]["confirm_password"], "Passwords do not match");
    assert!(body["fields"]["accept_terms"].is_string());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let f = fixture();
    let app = api::router(f.state.clone());

    let (status, _) = send(&app, Method::GET, "/api/v1/officers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/v1/officers", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_assign_and_handover() {
    let f = fixture();
    let app = api::router(f.state.clone());

    let (status, sergeant) = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(registration("Priya", "Priya@Precinct.test", "P-100", "sergeant")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", sergeant);
    assert_eq!(sergeant["email"], "priya@precinct.test");
    assert!(sergeant.get("password_hash").is_none());

    let (status, constable) = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(registration("Kiran", "kiran@precinct.test", "P-101", "officer")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", constable);

    let (status, duplicate) = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(registration("Other", "priya@precinct.test", "P-100", "officer")),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(duplicate["fields"]["email"].is_string());
    assert!(duplicate["fields"]["badge_number"].is_string());

    let sergeant_token = login(&app, "priya@precinct.test").await;
    let constable_token = login(&app, "kiran@precinct.test").await;

    let (status, me) = send(&app, Method::GET, "/api/v1/auth/me", Some(&sergeant_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["full_name"], "Priya Desai");

    // Only supervisors register equipment
    let radio_form = json!({
        "name": "Radio 12",
        "category": "radio",
        "serial_number": "RD-12",
        "department_id": "patrol"
    });
    let (status, _) = send(&app, Method::POST, "/api/v1/equipment", Some(&constable_token), Some(radio_form.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, radio) = send(&app, Method::POST, "/api/v1/equipment", Some(&sergeant_token), Some(radio_form)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", radio);
    assert_eq!(radio["status"], "available");
    let radio_id = radio["id"].as_str().unwrap().to_string();

    let assignment = json!({
        "asset_id": radio_id,
        "asset_name": "Radio 12",
        "officer_id": constable["id"],
        "officer_name": "Kiran Desai",
        "idempotency_key": "assign-radio-12"
    });
    let (status, receipt) = send(&app, Method::POST, "/api/v1/assignments", Some(&sergeant_token), Some(assignment.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{}", receipt);
    assert_eq!(receipt["assignment"]["status"], "active");
    assert_eq!(receipt["history"].as_array().unwrap().len(), 1);

    let (status, replay) = send(&app, Method::POST, "/api/v1/assignments", Some(&sergeant_token), Some(assignment)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replay["assignment"]["id"], receipt["assignment"]["id"]);

    let (status, overview) = send(&app, Method::GET, &format!("/api/v1/equipment/{}", radio_id), Some(&constable_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["current_holder"]["officer_id"], constable["id"]);

    let (status, held) = send(&app, Method::GET, "/api/v1/officers/me/equipment", Some(&constable_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(held.as_array().unwrap().len(), 1);

    let (status, recipients) = send(&app, Method::GET, "/api/v1/officers/me/recipients", Some(&constable_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recipients[0]["id"], sergeant["id"]);

    // Handing over something the sender does not hold is rejected per item
    let (status, rejected) = send(
        &app,
        Method::POST,
        "/api/v1/handovers",
        Some(&sergeant_token),
        Some(json!({
            "to_officer_id": constable["id"],
            "equipment_ids": [radio_id],
            "notes": "Shift change"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(rejected["items"][0]["reason"], "not_held_by_sender");

    let (status, handover) = send(
        &app,
        Method::POST,
        "/api/v1/handovers",
        Some(&constable_token),
        Some(json!({
            "to_officer_id": sergeant["id"],
            "equipment_ids": [radio_id],
            "notes": "Shift change"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", handover);
    assert_eq!(handover["handover"]["status"], "pending");

    let handover_id = handover["handover"]["id"].as_str().unwrap();
    let (status, stored) = send(&app, Method::GET, &format!("/api/v1/handovers/{}", handover_id), Some(&sergeant_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["to_officer_name"], "Priya Desai");
}
