use std::sync::Arc;
use crate::domain::{
    models::{auth::{Claims, IssuedTokens, RefreshTokenRecord}, user::User},
    ports::AuthRepository
};
use crate::error::AppError;
use crate::config::Config;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use jsonwebtoken::{encode, EncodingKey, Header, Algorithm};
use uuid::Uuid;
use chrono::{Utc, Duration};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use sha2::{Sha256, Digest};
use tracing::{debug, error, warn};

pub const TOKEN_AUDIENCE: &str = "barbershop-admin";

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalWithMsg(format!("password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(hash) => Argon2::default().verify_password(password.as_bytes(), &hash).is_ok(),
        Err(_) => false,
    }
}

pub fn random_secret(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

pub struct AuthService {
    repo: Arc<dyn AuthRepository>,
    config: Config,
    encoding_key: EncodingKey,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AuthRepository>, config: Config) -> Self {
        let encoding_key = EncodingKey::from_ed_pem(config.jwt_secret_key.as_bytes())
            .expect("Invalid JWT Private Key PEM");

        Self { repo, config, encoding_key }
    }

    pub async fn login(&self, user: &User) -> Result<IssuedTokens, AppError> {
        match self.repo.delete_expired(Utc::now()).await {
            Ok(0) => {}
            Ok(purged) => debug!("Purged {} expired refresh tokens", purged),
            Err(e) => warn!("Failed to purge expired refresh tokens: {:?}", e),
        }
        self.issue_token_pair(user, Uuid::new_v4(), 1).await
    }

    /// Validates and burns a refresh token. Presenting a token that was already
    /// rotated revokes its whole family, logging every holder out.
    pub async fn redeem_refresh_token(&self, raw_refresh_token: &str) -> Result<RefreshTokenRecord, AppError> {
        let token_hash = self.hash_token(raw_refresh_token);
        let now = Utc::now();

        let record = self.repo.find_refresh_token(&token_hash).await?
            .ok_or(AppError::Unauthorized)?;

        if record.revoked_at.is_some() {
            warn!(
                user_id = %record.user_id,
                family_id = %record.family_id,
                "Refresh token reuse detected, revoking token family"
            );
            self.repo.delete_family(record.family_id).await?;
            return Err(AppError::Unauthorized);
        }

        if record.expires_at < now {
            self.repo.delete_family(record.family_id).await?;
            return Err(AppError::Unauthorized);
        }

        if !self.repo.revoke_refresh_token(&token_hash, now).await? {
            return Err(AppError::Unauthorized);
        }
        Ok(record)
    }

    pub async fn rotate(&self, record: &RefreshTokenRecord, user: &User) -> Result<IssuedTokens, AppError> {
        self.issue_token_pair(user, record.family_id, record.generation_id + 1).await
    }

    pub async fn logout(&self, raw_refresh_token: &str) -> Result<(), AppError> {
        let token_hash = self.hash_token(raw_refresh_token);
        if let Some(record) = self.repo.find_refresh_token(&token_hash).await? {
            self.repo.delete_family(record.family_id).await?;
        }
        Ok(())
    }

    async fn issue_token_pair(&self, user: &User, family_id: Uuid, generation_id: i32) -> Result<IssuedTokens, AppError> {
        let csrf_token = random_secret(32);
        let now = Utc::now();
        let exp = (now + Duration::minutes(self.config.access_token_minutes)).timestamp() as usize;

        let claims = Claims {
            iss: self.config.auth_issuer.clone(),
            sub: user.id.clone(),
            aud: TOKEN_AUDIENCE.to_string(),
            exp,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            barbershop_id: user.barbershop_id.clone(),
            role: user.role,
            csrf_token: csrf_token.clone(),
        };

        let access_token = encode(&Header::new(Algorithm::EdDSA), &claims, &self.encoding_key)
            .map_err(|e| {
                error!("JWT encoding failed: {}", e);
                AppError::Internal
            })?;

        let refresh_token = random_secret(64);

        let refresh_record = RefreshTokenRecord {
            token_hash: self.hash_token(&refresh_token),
            user_id: user.id.clone(),
            barbershop_id: user.barbershop_id.clone(),
            family_id,
            generation_id,
            expires_at: now + Duration::days(self.config.refresh_token_days),
            revoked_at: None,
            created_at: now,
        };

        self.repo.create_refresh_token(&refresh_record).await?;
        Ok(IssuedTokens { access_token, refresh_token, csrf_token })
    }

    pub fn hash_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}
