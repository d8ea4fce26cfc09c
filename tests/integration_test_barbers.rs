mod common;

use axum::http::StatusCode;
use common::{send, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_barber_lifecycle() {
    let app = TestApp::new().await;
    let auth = app.admin("owner@sharp.test").await;

    let (status, body) = app.request("POST", "/api/v1/barbers", Some(&auth), Some(json!({
        "name": "Luis",
        "email": "Luis@Sharp.test",
        "specialties": [" fade ", "beard", "fade"],
        "commission": 35.5
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Barber created successfully");
    assert_eq!(body["data"]["name"], "Luis");
    assert_eq!(body["data"]["email"], "luis@sharp.test");
    assert_eq!(body["data"]["specialties"], json!(["fade", "beard"]));
    assert_eq!(body["data"]["commission"], 35.5);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    app.create_barber(&auth, "Ana", "ana@sharp.test").await;

    let (status, body) = app.request("GET", "/api/v1/barbers", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body.as_array().unwrap().iter().map(|b| b["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Ana", "Luis"]);

    let (status, body) = app.request("PUT", &format!("/api/v1/barbers/{}", id), Some(&auth), Some(json!({
        "name": "Luis Miguel",
        "commission": 50
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Barber updated successfully");
    assert_eq!(body["data"]["name"], "Luis Miguel");
    assert_eq!(body["data"]["commission"], 50.0);
    assert_eq!(body["data"]["specialties"], json!(["fade", "beard"]));

    let (status, body) = app.request("GET", &format!("/api/v1/barbers/{}", id), Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Luis Miguel");
}

#[tokio::test]
async fn test_duplicate_barber_email_creates_nothing() {
    let app = TestApp::new().await;
    let auth = app.admin("owner@sharp.test").await;
    app.create_barber(&auth, "Luis", "luis@sharp.test").await;

    let users_before = app.count("users").await;

    let (status, _) = app.request("POST", "/api/v1/barbers", Some(&auth), Some(json!({
        "name": "Other Luis",
        "email": "LUIS@sharp.test",
        "specialties": [],
        "commission": 10
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The admin's own address is taken too.
    let (status, _) = app.request("POST", "/api/v1/barbers", Some(&auth), Some(json!({
        "name": "Owner Again",
        "email": "owner@sharp.test",
        "commission": 10
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.count("users").await, users_before);
    assert_eq!(app.count("barbers").await, 1);
}

#[tokio::test]
async fn test_barber_validation() {
    let app = TestApp::new().await;
    let auth = app.admin("owner@sharp.test").await;

    let (status, _) = app.request("POST", "/api/v1/barbers", Some(&auth), Some(json!({
        "name": "Luis", "email": "luis@sharp.test", "commission": 120
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.request("POST", "/api/v1/barbers", Some(&auth), Some(json!({
        "name": "Luis", "email": "luis@sharp.test"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "commission is required");

    let (status, _) = app.request("POST", "/api/v1/barbers", Some(&auth), Some(json!({
        "name": "Luis", "email": "not-an-email", "commission": 10
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.count("barbers").await, 0);
}

#[tokio::test]
async fn test_wrongly_typed_barber_fields_get_a_json_bad_request() {
    let app = TestApp::new().await;
    let auth = app.admin("owner@sharp.test").await;

    let (status, body) = app.request("POST", "/api/v1/barbers", Some(&auth), Some(json!({
        "name": "Luis",
        "email": "luis@sharp.test",
        "commission": "40"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string(), "expected a message envelope, got {}", body);

    let (status, body) = app.request("POST", "/api/v1/barbers", Some(&auth), Some(json!({
        "name": "Luis",
        "email": "luis@sharp.test",
        "specialties": "fade",
        "commission": 40
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    assert_eq!(app.count("barbers").await, 0);
}

#[tokio::test]
async fn test_delete_barber_removes_user_too() {
    let app = TestApp::new().await;
    let auth = app.admin("owner@sharp.test").await;
    let id = app.create_barber(&auth, "Luis", "luis@sharp.test").await;
    assert_eq!(app.count("users").await, 2);

    let (status, body) = app.request("DELETE", &format!("/api/v1/barbers/{}", id), Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Barber deleted successfully");
    assert!(body.get("data").is_none());

    assert_eq!(app.count("barbers").await, 0);
    assert_eq!(app.count("users").await, 1);

    let (status, _) = app.request("DELETE", &format!("/api/v1/barbers/{}", id), Some(&auth), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The email is free again.
    app.create_barber(&auth, "Luis", "luis@sharp.test").await;
}

#[tokio::test]
async fn test_barber_with_appointments_cannot_be_deleted() {
    let app = TestApp::new().await;
    let auth = app.admin("owner@sharp.test").await;
    let barber = app.create_barber(&auth, "Luis", "luis@sharp.test").await;
    let service = app.create_service(&auth, "Cut", 30).await;

    let (status, _) = app.book(&auth, &barber, &service, "2026-03-02", "10:00").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.request("DELETE", &format!("/api/v1/barbers/{}", barber), Some(&auth), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.count("barbers").await, 1);
    assert_eq!(app.count("users").await, 2);
}

#[tokio::test]
async fn test_barbers_are_isolated_per_barbershop() {
    let app = TestApp::new().await;
    let shop_a = app.admin("a@sharp.test").await;
    let shop_b = app.admin("b@sharp.test").await;
    let id = app.create_barber(&shop_a, "Luis", "luis@sharp.test").await;

    let uri = format!("/api/v1/barbers/{}", id);

    let (status, _) = app.request("GET", &uri, Some(&shop_b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request("PUT", &uri, Some(&shop_b), Some(json!({ "name": "Stolen" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request("DELETE", &uri, Some(&shop_b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.request("GET", "/api/v1/barbers", Some(&shop_b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (_, body) = app.request("GET", &uri, Some(&shop_a), None).await;
    assert_eq!(body["name"], "Luis");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_barber_edits_interleaved_with_bookings_all_succeed() {
    let app = TestApp::new().await;
    let auth = app.admin("owner@sharp.test").await;
    let barber = app.create_barber(&auth, "Luis", "luis@sharp.test").await;
    let service = app.create_service(&auth, "Cut", 30).await;
    let uri = format!("/api/v1/barbers/{}", barber);

    let mut handles = Vec::new();
    for i in 0..20 {
        let start = format!("{:02}:{:02}", 9 + i / 2, (i % 2) * 30);
        let booking = json!({
            "date": "2026-03-02",
            "startTime": start,
            "barberId": barber,
            "serviceId": service,
            "clientName": "Walk In",
            "clientPhone": "555-0199"
        });
        let edit = json!({ "commission": 10 + i, "specialties": [format!("style-{}", i)] });

        let (router, auth_b) = (app.router.clone(), auth.clone());
        handles.push(tokio::spawn(async move {
            send(router, "POST", "/api/v1/appointments", Some(&auth_b), Some(booking)).await
        }));
        let (router, auth_e, uri) = (app.router.clone(), auth.clone(), uri.clone());
        handles.push(tokio::spawn(async move {
            send(router, "PUT", &uri, Some(&auth_e), Some(edit)).await
        }));
    }

    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert!(status.is_success(), "request failed with {}: {}", status, body);
    }

    assert_eq!(app.count("appointments").await, 20);

    let (status, _) = app.request("DELETE", &uri, Some(&auth), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_barber_deletes_interleaved_with_bookings_all_succeed() {
    let app = TestApp::new().await;
    let auth = app.admin("owner@sharp.test").await;
    let busy = app.create_barber(&auth, "Luis", "luis@sharp.test").await;
    let service = app.create_service(&auth, "Cut", 30).await;

    let mut spare = Vec::new();
    for i in 0..10 {
        spare.push(app.create_barber(&auth, &format!("Spare {}", i), &format!("spare{}@sharp.test", i)).await);
    }

    let mut handles = Vec::new();
    for (i, id) in spare.into_iter().enumerate() {
        let booking = json!({
            "date": "2026-03-03",
            "startTime": format!("{:02}:00", 9 + i),
            "barberId": busy,
            "serviceId": service,
            "clientName": "Walk In",
            "clientPhone": "555-0199"
        });

        let (router, auth_b) = (app.router.clone(), auth.clone());
        handles.push(tokio::spawn(async move {
            send(router, "POST", "/api/v1/appointments", Some(&auth_b), Some(booking)).await
        }));
        let (router, auth_d) = (app.router.clone(), auth.clone());
        handles.push(tokio::spawn(async move {
            send(router, "DELETE", &format!("/api/v1/barbers/{}", id), Some(&auth_d), None).await
        }));
    }

    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert!(status.is_success(), "request failed with {}: {}", status, body);
    }

    assert_eq!(app.count("barbers").await, 1);
    assert_eq!(app.count("appointments").await, 10);
}
