use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::body::ApiJson;
use crate::api::dtos::{requests::LoginRequest, responses::ApiMessage};
use crate::api::extractors::auth::AuthUser;
use crate::config::Config;
use crate::error::AppError;
use crate::domain::models::{auth::{AuthResponse, IssuedTokens, UserProfile}, user::User};
use crate::domain::services::auth_service::verify_password;
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use tracing::{info, warn};

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("Email and password are required".into()));
    }

    let user = state.user_repo.find_by_email(&email).await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&payload.password, &user.password_hash) {
        warn!("Failed login attempt for user {}", user.id);
        return Err(AppError::Unauthorized);
    }

    let tokens = state.auth_service.login(&user).await?;
    set_cookies(&cookies, &state.config, &tokens);

    info!("User logged in: {}", user.id);

    Ok(Json(auth_response(tokens, user)))
}

/// Rotates the refresh cookie into a fresh token pair of the same family.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    let refresh_cookie = cookies.get("refresh_token").ok_or(AppError::Unauthorized)?;

    let record = state.auth_service.redeem_refresh_token(refresh_cookie.value()).await?;

    let user = state.user_repo.find_by_id(&record.barbershop_id, &record.user_id).await?
        .ok_or(AppError::Unauthorized)?;

    let tokens = state.auth_service.rotate(&record, &user).await?;
    set_cookies(&cookies, &state.config, &tokens);

    info!("Token refreshed for user: {}", user.id);

    Ok(Json(auth_response(tokens, user)))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = cookies.get("refresh_token") {
        if let Err(e) = state.auth_service.logout(cookie.value()).await {
            warn!("Failed to revoke refresh token family on logout: {:?}", e);
        }
    }

    cookies.remove(Cookie::build(("access_token", "")).path("/").into());
    cookies.remove(Cookie::build(("refresh_token", "")).path("/api/v1/auth").into());

    info!("User logged out");

    Ok(Json(ApiMessage::message("Logged out")))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_id(&principal.barbershop_id, &principal.user_id).await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(profile(user)))
}

fn profile(user: User) -> UserProfile {
    UserProfile {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        barbershop_id: user.barbershop_id,
    }
}

fn auth_response(tokens: IssuedTokens, user: User) -> AuthResponse {
    AuthResponse {
        access_token: tokens.access_token,
        csrf_token: tokens.csrf_token,
        user: profile(user),
    }
}

fn set_cookies(cookies: &Cookies, config: &Config, tokens: &IssuedTokens) {
    let mut access_c = Cookie::new("access_token", tokens.access_token.clone());
    access_c.set_http_only(true);
    access_c.set_secure(true);
    access_c.set_same_site(SameSite::Strict);
    access_c.set_path("/");
    access_c.set_max_age(Duration::minutes(config.access_token_minutes));
    cookies.add(access_c);

    let mut refresh_c = Cookie::new("refresh_token", tokens.refresh_token.clone());
    refresh_c.set_http_only(true);
    refresh_c.set_secure(true);
    refresh_c.set_same_site(SameSite::Strict);
    refresh_c.set_path("/api/v1/auth");
    refresh_c.set_max_age(Duration::days(config.refresh_token_days));
    cookies.add(refresh_c);
}
