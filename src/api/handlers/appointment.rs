use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::body::{ApiJson, ApiQuery};
use crate::api::dtos::{
    requests::{optional, required, AppointmentListQuery, CreateAppointmentRequest, UpdateAppointmentStatusRequest},
    responses::ApiMessage,
};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::{
    appointment::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointmentParams},
    user::normalize_email,
};
use crate::domain::services::scheduling::{end_time_for, parse_date, parse_time};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiQuery(query): ApiQuery<AppointmentListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = AppointmentFilter {
        date: optional(query.date).as_deref().map(parse_date).transpose()?,
        barber_id: optional(query.barber_id),
        status: optional(query.status).map(|s| s.parse::<AppointmentStatus>()).transpose()?,
    };

    let appointments = state.appointment_repo.list(&principal.barbershop_id, &filter).await?;
    Ok(Json(appointments))
}

pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = state.appointment_repo.find_by_id(&principal.barbershop_id, &id).await?
        .ok_or(AppError::NotFound("Appointment not found".into()))?;
    Ok(Json(appointment))
}

/// Books a slot. The end time is always derived from the service duration;
/// availability is decided atomically by the repository.
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiJson(payload): ApiJson<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&required(&payload.date, "date")?)?;
    let start_time = parse_time(&required(&payload.start_time, "startTime")?)?;
    let barber_id = required(&payload.barber_id, "barberId")?;
    let service_id = required(&payload.service_id, "serviceId")?;
    let client_name = required(&payload.client_name, "clientName")?;
    let client_phone = required(&payload.client_phone, "clientPhone")?;
    let client_email = optional(payload.client_email)
        .map(|e| normalize_email(&e))
        .transpose()?;

    let service = state.service_repo.find_by_id(&principal.barbershop_id, &service_id).await?
        .ok_or(AppError::NotFound("Service not found".into()))?;
    let end_time = end_time_for(start_time, service.duration)?;

    let barbershop = state.barbershop_repo.find_by_id(&principal.barbershop_id).await?
        .ok_or(AppError::NotFound("Barbershop not found".into()))?;
    if !barbershop.is_open_between(start_time, end_time) {
        return Err(AppError::Validation(format!(
            "Appointment must fall within opening hours ({} - {})",
            barbershop.opening_time.format("%H:%M"),
            barbershop.closing_time.format("%H:%M")
        )));
    }

    let appointment = Appointment::new(NewAppointmentParams {
        barbershop_id: principal.barbershop_id.clone(),
        barber_id,
        service_id: service.id,
        date,
        start_time,
        end_time,
        client_name,
        client_phone,
        client_email,
        notes: optional(payload.notes),
    });

    let created = state.appointment_repo.create_if_available(&appointment).await?;

    info!(
        "Appointment {} booked for barber {} on {} {}-{}",
        created.appointment.id, created.appointment.barber_id, date, start_time, end_time
    );

    Ok((StatusCode::CREATED, Json(ApiMessage::with_data("Appointment created successfully", created))))
}

pub async fn update_appointment_status(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateAppointmentStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status: AppointmentStatus = required(&payload.status, "status")?.parse()?;

    let updated = state.appointment_repo.update_status(&principal.barbershop_id, &id, status).await?;

    info!("Appointment {} moved to {}", id, status);

    Ok(Json(ApiMessage::with_data("Appointment status updated successfully", updated)))
}
