use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub barbershop_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    pub fn new(barbershop_id: String, name: String, description: Option<String>, price: f64, duration: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            barbershop_id,
            name,
            description,
            price,
            duration,
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn validate_price(price: f64) -> Result<f64, AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation("Price must be a non-negative number".into()));
    }
    Ok(price)
}

// A service longer than a day can never be booked.
pub fn validate_duration(duration: i32) -> Result<i32, AppError> {
    if duration <= 0 || duration > 24 * 60 {
        return Err(AppError::Validation("Duration must be between 1 and 1440 minutes".into()));
    }
    Ok(duration)
}
