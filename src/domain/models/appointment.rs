use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// Whether an appointment in this status occupies its slot.
    pub fn blocks_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            _ => Err(AppError::Validation(format!(
                "Invalid status '{}' (expected pending, confirmed, completed or cancelled)",
                s
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub barbershop_id: String,
    pub barber_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: AppointmentStatus,
    pub client_name: String,
    pub client_phone: String,
    pub client_email: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewAppointmentParams {
    pub barbershop_id: String,
    pub barber_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub client_name: String,
    pub client_phone: String,
    pub client_email: Option<String>,
    pub notes: Option<String>,
}

impl Appointment {
    pub fn new(params: NewAppointmentParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            barbershop_id: params.barbershop_id,
            barber_id: params.barber_id,
            service_id: params.service_id,
            date: params.date,
            start_time: params.start_time,
            end_time: params.end_time,
            status: AppointmentStatus::Pending,
            client_name: params.client_name,
            client_phone: params.client_phone,
            client_email: params.client_email,
            notes: params.notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn blocks_slot(&self) -> bool {
        self.status.blocks_slot()
    }
}

/// Appointment joined with the display fields of its barber and service.
#[derive(Debug, Serialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub appointment: Appointment,
    pub barber_name: String,
    pub service_name: String,
    pub service_price: f64,
}

#[derive(Debug, Default, Clone)]
pub struct AppointmentFilter {
    pub date: Option<NaiveDate>,
    pub barber_id: Option<String>,
    pub status: Option<AppointmentStatus>,
}
