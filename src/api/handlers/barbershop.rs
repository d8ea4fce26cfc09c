use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::body::ApiJson;
use crate::api::dtos::{
    requests::{optional, required, UpdateBarbershopRequest},
    responses::ApiMessage,
};
use crate::api::extractors::auth::{AdminUser, AuthUser};
use crate::domain::models::barbershop::validate_hours;
use crate::domain::services::scheduling::parse_time;
use crate::error::AppError;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

pub async fn get_barbershop(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let barbershop = state.barbershop_repo.find_by_id(&principal.barbershop_id).await?
        .ok_or(AppError::NotFound("Barbershop not found".into()))?;

    Ok(Json(barbershop))
}

pub async fn update_barbershop(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
    ApiJson(payload): ApiJson<UpdateBarbershopRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut barbershop = state.barbershop_repo.find_by_id(&principal.barbershop_id).await?
        .ok_or(AppError::NotFound("Barbershop not found".into()))?;

    if let Some(name) = payload.name { barbershop.name = required(&name, "name")?; }
    if let Some(address) = payload.address { barbershop.address = required(&address, "address")?; }
    if let Some(phone) = payload.phone { barbershop.phone = required(&phone, "phone")?; }
    // Sending an empty string clears the optional fields.
    if payload.description.is_some() { barbershop.description = optional(payload.description); }
    if payload.logo.is_some() { barbershop.logo = optional(payload.logo); }
    if let Some(opening) = payload.opening_time { barbershop.opening_time = parse_time(&opening)?; }
    if let Some(closing) = payload.closing_time { barbershop.closing_time = parse_time(&closing)?; }

    validate_hours(barbershop.opening_time, barbershop.closing_time)?;
    barbershop.updated_at = Utc::now();

    let updated = state.barbershop_repo.update(&barbershop).await?;

    info!("Barbershop {} updated by {}", updated.id, principal.user_id);

    Ok(Json(ApiMessage::with_data("Barbershop updated successfully", updated)))
}

pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.barbershop_repo.stats(&principal.barbershop_id).await?;
    Ok(Json(stats))
}
