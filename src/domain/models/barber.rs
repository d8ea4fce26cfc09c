use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Barber {
    pub id: String,
    pub user_id: String,
    pub barbershop_id: String,
    pub specialties: Json<Vec<String>>,
    pub commission: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Barber {
    pub fn new(user_id: String, barbershop_id: String, specialties: Vec<String>, commission: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            barbershop_id,
            specialties: Json(specialties),
            commission,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Barber row joined with the name and email of its backing user.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct BarberProfile {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub barber: Barber,
    pub name: String,
    pub email: String,
}

pub struct BarberUpdate {
    pub name: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub commission: Option<f64>,
}

pub fn validate_commission(commission: f64) -> Result<f64, AppError> {
    if !commission.is_finite() || !(0.0..=100.0).contains(&commission) {
        return Err(AppError::Validation("Commission must be between 0 and 100".into()));
    }
    Ok(commission)
}

/// Trims tags, drops blanks and duplicates while keeping the first occurrence order.
pub fn normalize_specialties(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
