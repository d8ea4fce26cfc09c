use barbershop_backend::{
    api::router::create_router,
    config::Config,
    infra::factory::sqlite_state,
    state::AppState,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::{json, Value};

pub const ADMIN_PASSWORD: &str = "s3cure-passw0rd";

#[derive(Clone)]
pub struct AuthHeaders {
    pub access_token: String,
    pub refresh_token: String,
    pub csrf_token: String,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            access_token_minutes: 15,
            refresh_token_days: 7,
        };

        let state = Arc::new(sqlite_state(&config, pool.clone()));
        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    /// Sends a request authenticated the way a browser would: access cookie plus CSRF header.
    pub async fn request(&self, method: &str, uri: &str, auth: Option<&AuthHeaders>, body: Option<Value>) -> (StatusCode, Value) {
        send(self.router.clone(), method, uri, auth, body).await
    }

    /// Sends a body as-is, for payloads that are not valid JSON or carry another content type.
    pub async fn request_raw(&self, method: &str, uri: &str, auth: &AuthHeaders, content_type: Option<&str>, body: &str) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        let response = self.router.clone().oneshot(builder.body(Body::from(body.to_string())).unwrap()).await.unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    pub async fn register(&self, email: &str) -> (StatusCode, Value) {
        self.request("POST", "/api/v1/register", None, Some(json!({
            "name": "Owner",
            "email": email,
            "password": ADMIN_PASSWORD,
            "barbershop": {
                "name": "Sharp Cuts",
                "address": "1 Main St",
                "phone": "555-0100",
                "openingTime": "09:00",
                "closingTime": "19:00"
            }
        }))).await
    }

    pub async fn login(&self, email: &str, password: &str) -> AuthHeaders {
        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "email": email, "password": password }).to_string()))
                .unwrap()
        ).await.unwrap();

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        let access_token = cookie_value(response.headers(), "access_token").expect("No access_token cookie returned");
        let refresh_token = cookie_value(response.headers(), "refresh_token").expect("No refresh_token cookie returned");

        let body_json = parse_body(response).await;
        let csrf_token = body_json["csrfToken"].as_str().expect("No csrfToken in body").to_string();

        AuthHeaders {
            access_token,
            refresh_token,
            csrf_token,
        }
    }

    /// Registers a fresh barbershop and signs its admin in.
    pub async fn admin(&self, email: &str) -> AuthHeaders {
        let (status, body) = self.register(email).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        self.login(email, ADMIN_PASSWORD).await
    }

    pub async fn create_barber(&self, auth: &AuthHeaders, name: &str, email: &str) -> String {
        let (status, body) = self.request("POST", "/api/v1/barbers", Some(auth), Some(json!({
            "name": name,
            "email": email,
            "password": "barber-pass-1",
            "specialties": ["fade"],
            "commission": 40
        }))).await;
        assert_eq!(status, StatusCode::CREATED, "create barber failed: {}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    pub async fn create_service(&self, auth: &AuthHeaders, name: &str, duration: i32) -> String {
        let (status, body) = self.request("POST", "/api/v1/services", Some(auth), Some(json!({
            "name": name,
            "price": 25.0,
            "duration": duration
        }))).await;
        assert_eq!(status, StatusCode::CREATED, "create service failed: {}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    pub async fn book(&self, auth: &AuthHeaders, barber_id: &str, service_id: &str, date: &str, start: &str) -> (StatusCode, Value) {
        self.request("POST", "/api/v1/appointments", Some(auth), Some(json!({
            "date": date,
            "startTime": start,
            "barberId": barber_id,
            "serviceId": service_id,
            "clientName": "Walk In",
            "clientPhone": "555-0199"
        }))).await
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

/// Router-level request helper, usable from spawned tasks.
#[allow(dead_code)]
pub async fn send(router: Router, method: &str, uri: &str, auth: Option<&AuthHeaders>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    (status, parse_body(response).await)
}

#[allow(dead_code)]
pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

#[allow(dead_code)]
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    headers.get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find(|c| c.starts_with(&prefix))
        .map(|c| c[prefix.len()..].split(';').next().unwrap_or("").to_string())
}
