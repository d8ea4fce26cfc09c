use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::body::ApiJson;
use crate::api::dtos::{
    requests::{optional, required, CreateServiceRequest, UpdateServiceRequest},
    responses::ApiMessage,
};
use crate::api::extractors::auth::{AdminUser, AuthUser};
use crate::domain::models::service::{validate_duration, validate_price, Service};
use crate::error::AppError;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

pub async fn list_services(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let services = state.service_repo.list(&principal.barbershop_id).await?;
    Ok(Json(services))
}

pub async fn get_service(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let service = state.service_repo.find_by_id(&principal.barbershop_id, &id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;
    Ok(Json(service))
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
    ApiJson(payload): ApiJson<CreateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = required(&payload.name, "name")?;
    let price = validate_price(payload.price.ok_or(AppError::Validation("price is required".into()))?)?;
    let duration = validate_duration(payload.duration.ok_or(AppError::Validation("duration is required".into()))?)?;

    let service = Service::new(principal.barbershop_id.clone(), name, optional(payload.description), price, duration);
    let created = state.service_repo.create(&service).await?;

    info!("Service {} created in barbershop {}", created.id, principal.barbershop_id);

    Ok((StatusCode::CREATED, Json(ApiMessage::with_data("Service created successfully", created))))
}

/// Changing `duration` only affects appointments booked afterwards.
pub async fn update_service(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut service = state.service_repo.find_by_id(&principal.barbershop_id, &id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;

    if let Some(name) = payload.name { service.name = required(&name, "name")?; }
    if payload.description.is_some() { service.description = optional(payload.description); }
    if let Some(price) = payload.price { service.price = validate_price(price)?; }
    if let Some(duration) = payload.duration { service.duration = validate_duration(duration)?; }
    service.updated_at = Utc::now();

    let updated = state.service_repo.update(&service).await?;

    info!("Service {} updated", updated.id);

    Ok(Json(ApiMessage::with_data("Service updated successfully", updated)))
}

pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.service_repo.delete(&principal.barbershop_id, &id).await?;

    info!("Service {} deleted", id);

    Ok(Json(ApiMessage::message("Service deleted successfully")))
}
