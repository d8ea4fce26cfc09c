use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::body::ApiJson;
use crate::api::dtos::{
    requests::{optional, required, RegisterRequest},
    responses::{ApiMessage, RegistrationResponse},
};
use crate::domain::models::{
    barbershop::{validate_hours, Barbershop, NewBarbershopParams},
    user::{normalize_email, Role, User},
};
use crate::domain::services::{auth_service::hash_password, scheduling::parse_time};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Creates a barbershop together with its first admin account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = required(&payload.name, "name")?;
    let email = normalize_email(&required(&payload.email, "email")?)?;
    validate_password(&payload.password)?;

    let shop = payload.barbershop;
    let opening_time = parse_time(&required(&shop.opening_time, "barbershop.openingTime")?)?;
    let closing_time = parse_time(&required(&shop.closing_time, "barbershop.closingTime")?)?;
    validate_hours(opening_time, closing_time)?;

    let mut barbershop = Barbershop::new(NewBarbershopParams {
        name: required(&shop.name, "barbershop.name")?,
        address: required(&shop.address, "barbershop.address")?,
        phone: required(&shop.phone, "barbershop.phone")?,
        email: email.clone(),
        description: optional(shop.description),
        opening_time,
        closing_time,
    });
    barbershop.logo = optional(shop.logo);

    if state.user_repo.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email is already registered".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let admin = User::new(barbershop.id.clone(), name, email, password_hash, Role::Admin);

    let (barbershop, user) = state.barbershop_repo.register(&barbershop, &admin).await?;

    info!("Registered barbershop {} with admin {}", barbershop.id, user.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiMessage::with_data(
            "Registration successful",
            RegistrationResponse { user, barbershop },
        )),
    ))
}
