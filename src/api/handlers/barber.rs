use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::body::ApiJson;
use crate::api::dtos::{
    requests::{required, CreateBarberRequest, UpdateBarberRequest},
    responses::ApiMessage,
};
use crate::api::extractors::auth::{AdminUser, AuthUser};
use crate::api::handlers::register::validate_password;
use crate::domain::models::{
    barber::{normalize_specialties, validate_commission, Barber, BarberUpdate},
    user::{normalize_email, Role, User},
};
use crate::domain::services::auth_service::{hash_password, random_secret};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn list_barbers(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let barbers = state.barber_repo.list(&principal.barbershop_id).await?;
    Ok(Json(barbers))
}

pub async fn get_barber(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let barber = state.barber_repo.find_by_id(&principal.barbershop_id, &id).await?
        .ok_or(AppError::NotFound("Barber not found".into()))?;
    Ok(Json(barber))
}

/// Creates the barber's login account and profile together. Without a password
/// the account gets an unguessable one and cannot sign in until it is reset.
pub async fn create_barber(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
    ApiJson(payload): ApiJson<CreateBarberRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = required(&payload.name, "name")?;
    let email = normalize_email(&required(&payload.email, "email")?)?;
    let commission = validate_commission(
        payload.commission.ok_or(AppError::Validation("commission is required".into()))?,
    )?;
    let specialties = normalize_specialties(payload.specialties);

    let password = match payload.password.filter(|p| !p.is_empty()) {
        Some(p) => {
            validate_password(&p)?;
            p
        }
        None => random_secret(32),
    };

    if state.user_repo.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email is already registered".into()));
    }

    let user = User::new(
        principal.barbershop_id.clone(),
        name,
        email,
        hash_password(&password)?,
        Role::Barber,
    );
    let barber = Barber::new(user.id.clone(), principal.barbershop_id.clone(), specialties, commission);

    let created = state.barber_repo.create_with_user(&user, &barber).await?;

    info!("Barber {} created in barbershop {}", created.barber.id, principal.barbershop_id);

    Ok((StatusCode::CREATED, Json(ApiMessage::with_data("Barber created successfully", created))))
}

pub async fn update_barber(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateBarberRequest>,
) -> Result<impl IntoResponse, AppError> {
    let update = BarberUpdate {
        name: payload.name.as_deref().map(|n| required(n, "name")).transpose()?,
        specialties: payload.specialties.map(normalize_specialties),
        commission: payload.commission.map(validate_commission).transpose()?,
    };

    let updated = state.barber_repo.update_with_user(&principal.barbershop_id, &id, &update).await?;

    info!("Barber {} updated", id);

    Ok(Json(ApiMessage::with_data("Barber updated successfully", updated)))
}

pub async fn delete_barber(
    State(state): State<Arc<AppState>>,
    AdminUser(principal): AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.barber_repo.delete_with_user(&principal.barbershop_id, &id).await?;

    info!("Barber {} deleted", id);

    Ok(Json(ApiMessage::message("Barber deleted successfully")))
}
