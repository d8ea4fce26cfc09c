mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{cookie_value, parse_body, TestApp, ADMIN_PASSWORD};
use serde_json::json;
use tower::ServiceExt;

async fn refresh_with(app: &TestApp, refresh_token: &str) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/refresh")
            .header(header::COOKIE, format!("refresh_token={}", refresh_token))
            .body(Body::empty())
            .unwrap()
    ).await.unwrap()
}

#[tokio::test]
async fn test_register_creates_shop_and_admin() {
    let app = TestApp::new().await;

    let (status, body) = app.register("Owner@Sharp.test").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Registration successful");
    assert_eq!(body["data"]["user"]["role"], "admin");
    assert_eq!(body["data"]["user"]["email"], "owner@sharp.test");
    assert!(body["data"]["user"].get("passwordHash").is_none());
    assert_eq!(body["data"]["barbershop"]["openingTime"], "09:00:00");
    assert_eq!(body["data"]["user"]["barbershopId"], body["data"]["barbershop"]["id"]);

    assert_eq!(app.count("barbershops").await, 1);
    assert_eq!(app.count("users").await, 1);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let app = TestApp::new().await;
    app.register("owner@sharp.test").await;

    let (status, body) = app.register("OWNER@sharp.test").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("already registered"));
    assert_eq!(app.count("barbershops").await, 1);

    let (status, _) = app.request("POST", "/api/v1/register", None, Some(json!({
        "name": "Owner",
        "email": "late@sharp.test",
        "password": ADMIN_PASSWORD,
        "barbershop": {
            "name": "Night Cuts", "address": "2 Main St", "phone": "555",
            "openingTime": "19:00", "closingTime": "09:00"
        }
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.request("POST", "/api/v1/register", None, Some(json!({
        "email": "noname@sharp.test",
        "password": ADMIN_PASSWORD
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name is required");
}

#[tokio::test]
async fn test_login_and_me() {
    let app = TestApp::new().await;
    let auth = app.admin("owner@sharp.test").await;

    let (status, body) = app.request("GET", "/api/v1/auth/me", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "owner@sharp.test");
    assert_eq!(body["role"], "admin");

    let (status, _) = app.request("POST", "/api/v1/auth/login", None, Some(json!({
        "email": "owner@sharp.test",
        "password": "wrong-password"
    }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.request("POST", "/api/v1/auth/login", None, Some(json!({
        "email": "nobody@sharp.test",
        "password": ADMIN_PASSWORD
    }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_or_forged_session_is_unauthorized() {
    let app = TestApp::new().await;
    app.admin("owner@sharp.test").await;

    let (status, body) = app.request("GET", "/api/v1/barbers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");

    // Auth is checked before the body is even looked at.
    let (status, _) = app.request("POST", "/api/v1/appointments", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app.router.clone().oneshot(
        Request::builder()
            .uri("/api/v1/services")
            .header(header::AUTHORIZATION, "Bearer not.a.jwt")
            .body(Body::empty())
            .unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cookie_mutations_require_csrf_but_bearer_does_not() {
    let app = TestApp::new().await;
    let auth = app.admin("owner@sharp.test").await;
    let payload = json!({ "name": "Shave", "price": 10.0, "duration": 15 }).to_string();

    let response = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/services")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.clone()))
            .unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/services")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", "guessed")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.clone()))
            .unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/services")
            .header(header::AUTHORIZATION, format!("Bearer {}", auth.access_token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload))
            .unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_refresh_rotation_and_reuse_detection() {
    let app = TestApp::new().await;
    let auth = app.admin("owner@sharp.test").await;

    let response = refresh_with(&app, &auth.refresh_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = cookie_value(response.headers(), "refresh_token").expect("rotated refresh cookie");
    assert_ne!(rotated, auth.refresh_token);
    let body = parse_body(response).await;
    assert!(body["csrfToken"].as_str().is_some());
    assert_eq!(body["user"]["email"], "owner@sharp.test");

    // Replaying the burnt token kills the whole family, including the rotated token.
    let response = refresh_with(&app, &auth.refresh_token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = refresh_with(&app, &rotated).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.count("refresh_tokens").await, 0);
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let app = TestApp::new().await;
    let auth = app.admin("owner@sharp.test").await;

    let response = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/logout")
            .header(header::COOKIE, format!("refresh_token={}", auth.refresh_token))
            .body(Body::empty())
            .unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = refresh_with(&app, &auth.refresh_token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_barber_accounts_cannot_manage_the_shop() {
    let app = TestApp::new().await;
    let admin = app.admin("owner@sharp.test").await;
    app.create_barber(&admin, "Carlos", "carlos@sharp.test").await;

    let barber = app.login("carlos@sharp.test", "barber-pass-1").await;

    let (status, body) = app.request("POST", "/api/v1/services", Some(&barber), Some(json!({
        "name": "Shave", "price": 10.0, "duration": 15
    }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");

    let (status, _) = app.request("PUT", "/api/v1/barbershop", Some(&barber), Some(json!({ "name": "Mine now" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request("GET", "/api/v1/barbers", Some(&barber), None).await;
    assert_eq!(status, StatusCode::OK);
}
