use crate::domain::models::{barbershop::Barbershop, user::User};
use serde::Serialize;

/// Envelope for mutations: `{message, data}` on create/update, `{message}` on delete.
#[derive(Serialize)]
pub struct ApiMessage<T: Serialize> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiMessage<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self { message: message.into(), data: Some(data) }
    }
}

impl ApiMessage<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self { message: message.into(), data: None }
    }
}

#[derive(Serialize)]
pub struct RegistrationResponse {
    pub user: User,
    pub barbershop: Barbershop,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
