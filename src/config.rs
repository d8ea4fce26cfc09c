use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret_key: String, // Ed25519 private key (PEM)
    pub jwt_public_key: String, // Ed25519 public key (PEM)
    pub auth_issuer: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            jwt_secret_key: env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set (Ed25519 Private Key)"),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").expect("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)"),
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://api.barbershop.local".to_string()),
            access_token_minutes: env::var("ACCESS_TOKEN_MINUTES").unwrap_or_else(|_| "15".to_string()).parse().expect("ACCESS_TOKEN_MINUTES must be a number"),
            refresh_token_days: env::var("REFRESH_TOKEN_DAYS").unwrap_or_else(|_| "7".to_string()).parse().expect("REFRESH_TOKEN_DAYS must be a number"),
        }
    }
}
