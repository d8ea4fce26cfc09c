use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header::AUTHORIZATION, request::Parts, Method},
};
use crate::state::AppState;
use crate::domain::models::auth::{Claims, Principal};
use crate::domain::services::auth_service::TOKEN_AUDIENCE;
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use tracing::{error, Span};

/// Any signed-in user of a barbershop. Resolved from the token alone, no database access.
pub struct AuthUser(pub Principal);

/// A signed-in user holding the `admin` role.
pub struct AdminUser(pub Principal);

enum Credential {
    Cookie(String),
    Bearer(String),
}

fn credential(parts: &Parts) -> Option<Credential> {
    if let Some(value) = parts.headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(Credential::Bearer(token.trim().to_string()));
        }
    }

    parts.extensions.get::<Cookies>()
        .and_then(|cookies| cookies.get("access_token"))
        .map(|c| Credential::Cookie(c.value().to_string()))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let credential = credential(parts).ok_or(AppError::Unauthorized)?;
        let (token, from_cookie) = match &credential {
            Credential::Cookie(t) => (t.as_str(), true),
            Credential::Bearer(t) => (t.as_str(), false),
        };

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let decoding_key = DecodingKey::from_ed_pem(app_state.config.jwt_public_key.as_bytes())
            .map_err(|e| {
                error!("Invalid JWT public key: {}", e);
                AppError::Internal
            })?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        validation.set_issuer(&[app_state.config.auth_issuer.as_str()]);

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|_| AppError::Unauthorized)?;

        // Browsers attach cookies on their own; a bearer header is proof the caller chose to send it.
        let method = &parts.method;
        if from_cookie && method != Method::GET && method != Method::HEAD && method != Method::OPTIONS {
            let csrf_header_val = parts.headers.get("X-CSRF-Token")
                .ok_or(AppError::Forbidden("Missing CSRF token".into()))?
                .to_str()
                .map_err(|_| AppError::Forbidden("Invalid CSRF token".into()))?;

            if csrf_header_val != token_data.claims.csrf_token {
                return Err(AppError::Forbidden("Invalid CSRF token".into()));
            }
        }

        let principal = Principal {
            user_id: token_data.claims.sub,
            barbershop_id: token_data.claims.barbershop_id,
            role: token_data.claims.role,
        };

        Span::current().record("tenant_id", principal.barbershop_id.as_str());
        Span::current().record("user_id", principal.user_id.as_str());

        Ok(AuthUser(principal))
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(principal) = AuthUser::from_request_parts(parts, state).await?;
        if !principal.is_admin() {
            return Err(AppError::Forbidden("Admin access required".into()));
        }
        Ok(AdminUser(principal))
    }
}
