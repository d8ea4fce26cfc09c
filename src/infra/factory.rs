use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::services::auth_service::AuthService;
use crate::infra::repositories::{
    postgres_appointment_repo::PostgresAppointmentRepo, postgres_auth_repo::PostgresAuthRepo,
    postgres_barber_repo::PostgresBarberRepo, postgres_barbershop_repo::PostgresBarbershopRepo,
    postgres_service_repo::PostgresServiceRepo, postgres_user_repo::PostgresUserRepo,
    sqlite_appointment_repo::SqliteAppointmentRepo, sqlite_auth_repo::SqliteAuthRepo,
    sqlite_barber_repo::SqliteBarberRepo, sqlite_barbershop_repo::SqliteBarbershopRepo,
    sqlite_service_repo::SqliteServiceRepo, sqlite_user_repo::SqliteUserRepo,
};

/// Picks the storage backend from the `DATABASE_URL` scheme, migrates it and wires the repositories.
pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;
        postgres_state(config, pool)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;
        sqlite_state(config, pool)
    }
}

pub fn postgres_state(config: &Config, pool: PgPool) -> AppState {
    let auth_repo = Arc::new(PostgresAuthRepo::new(pool.clone()));
    let auth_service = Arc::new(AuthService::new(auth_repo.clone(), config.clone()));

    AppState {
        config: config.clone(),
        barbershop_repo: Arc::new(PostgresBarbershopRepo::new(pool.clone())),
        user_repo: Arc::new(PostgresUserRepo::new(pool.clone())),
        barber_repo: Arc::new(PostgresBarberRepo::new(pool.clone())),
        service_repo: Arc::new(PostgresServiceRepo::new(pool.clone())),
        appointment_repo: Arc::new(PostgresAppointmentRepo::new(pool)),
        auth_repo,
        auth_service,
    }
}

pub fn sqlite_state(config: &Config, pool: SqlitePool) -> AppState {
    let auth_repo = Arc::new(SqliteAuthRepo::new(pool.clone()));
    let auth_service = Arc::new(AuthService::new(auth_repo.clone(), config.clone()));

    AppState {
        config: config.clone(),
        barbershop_repo: Arc::new(SqliteBarbershopRepo::new(pool.clone())),
        user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
        barber_repo: Arc::new(SqliteBarberRepo::new(pool.clone())),
        service_repo: Arc::new(SqliteServiceRepo::new(pool.clone())),
        appointment_repo: Arc::new(SqliteAppointmentRepo::new(pool)),
        auth_repo,
        auth_service,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
