use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{appointment, auth, barber, barbershop, health, register, service};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Onboarding & auth
        .route("/api/v1/register", post(register::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/me", get(auth::me))

        // Barbershop
        .route("/api/v1/barbershop", get(barbershop::get_barbershop).put(barbershop::update_barbershop))
        .route("/api/v1/dashboard/stats", get(barbershop::dashboard_stats))

        // Staff & catalogue
        .route("/api/v1/barbers", get(barber::list_barbers).post(barber::create_barber))
        .route("/api/v1/barbers/{id}", get(barber::get_barber).put(barber::update_barber).delete(barber::delete_barber))
        .route("/api/v1/services", get(service::list_services).post(service::create_service))
        .route("/api/v1/services/{id}", get(service::get_service).put(service::update_service).delete(service::delete_service))

        // Appointments
        .route("/api/v1/appointments", get(appointment::list_appointments).post(appointment::create_appointment))
        .route("/api/v1/appointments/{id}", get(appointment::get_appointment).patch(appointment::update_appointment_status))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        tenant_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
