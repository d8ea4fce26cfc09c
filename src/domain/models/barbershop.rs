use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::FromRow;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Barbershop {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBarbershopParams {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub description: Option<String>,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
}

impl Barbershop {
    pub fn new(params: NewBarbershopParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: params.name,
            address: params.address,
            phone: params.phone,
            email: params.email,
            description: params.description,
            logo: None,
            opening_time: params.opening_time,
            closing_time: params.closing_time,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when `[start, end)` lies entirely inside opening hours.
    pub fn is_open_between(&self, start: NaiveTime, end: NaiveTime) -> bool {
        start >= self.opening_time && end <= self.closing_time
    }
}

pub fn validate_hours(opening: NaiveTime, closing: NaiveTime) -> Result<(), AppError> {
    if opening >= closing {
        return Err(AppError::Validation("Opening time must be before closing time".into()));
    }
    Ok(())
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct DashboardStats {
    pub appointments: i64,
    pub barbers: i64,
    pub services: i64,
}
