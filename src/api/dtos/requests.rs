use crate::error::AppError;
use serde::Deserialize;

// Required string fields default to empty so a missing key surfaces as a
// `{message}` validation error instead of an extractor rejection.

/// Trimmed value of a required text field.
pub fn required(value: &str, field: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

/// Trimmed optional text, with blank treated as absent.
pub fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub barbershop: BarbershopInput,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BarbershopInput {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub opening_time: String,
    pub closing_time: String,
    pub description: Option<String>,
    pub logo: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateBarbershopRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBarberRequest {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub specialties: Vec<String>,
    pub commission: Option<f64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateBarberRequest {
    pub name: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub commission: Option<f64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<i32>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<i32>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateAppointmentRequest {
    pub date: String,
    pub start_time: String,
    pub barber_id: String,
    pub service_id: String,
    pub client_name: String,
    pub client_phone: String,
    pub client_email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct UpdateAppointmentStatusRequest {
    pub status: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentListQuery {
    pub date: Option<String>,
    pub barber_id: Option<String>,
    pub status: Option<String>,
}
