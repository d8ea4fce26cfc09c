use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::domain::models::user::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,

    #[serde(rename = "https://barbershop.app/claims/barbershop_id")]
    pub barbershop_id: String,

    #[serde(rename = "https://barbershop.app/claims/role")]
    pub role: Role,

    #[serde(rename = "https://barbershop.app/claims/csrf")]
    pub csrf_token: String,
}

/// The authenticated caller, resolved from the access token and passed to every handler.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: String,
    pub barbershop_id: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, FromRow)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: String,
    pub barbershop_id: String,
    pub family_id: Uuid,
    pub generation_id: i32,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub csrf_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub csrf_token: String,
    pub user: UserProfile,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub barbershop_id: String,
}
