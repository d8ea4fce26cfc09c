use crate::domain::{
    models::{barber::{Barber, BarberProfile, BarberUpdate}, user::User},
    ports::BarberRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, Sqlite, SqlitePool, Transaction};
use tracing::error;

const PROFILE_SELECT: &str = "SELECT b.id, b.user_id, b.barbershop_id, b.specialties, b.commission, b.created_at, b.updated_at, u.name, u.email
     FROM barbers b JOIN users u ON u.id = b.user_id";

pub struct SqliteBarberRepo {
    pool: SqlitePool,
}

impl SqliteBarberRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Write first: upgrading a WAL read transaction to a writer fails instead of waiting.
    async fn lock_barber(tx: &mut Transaction<'_, Sqlite>, barbershop_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE barbers SET updated_at = updated_at WHERE barbershop_id = ? AND id = ?")
            .bind(barbershop_id)
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Barber not found".into()));
        }
        Ok(())
    }

    async fn profile_in_tx(tx: &mut Transaction<'_, Sqlite>, barbershop_id: &str, id: &str) -> Result<BarberProfile, AppError> {
        sqlx::query_as::<_, BarberProfile>(&format!("{} WHERE b.barbershop_id = ? AND b.id = ?", PROFILE_SELECT))
            .bind(barbershop_id)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
            .map_err(AppError::Database)
    }
}

#[async_trait]
impl BarberRepository for SqliteBarberRepo {
    async fn create_with_user(&self, user: &User, barber: &Barber) -> Result<BarberProfile, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query(
            "INSERT INTO users (id, barbershop_id, name, email, password_hash, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
            .bind(&user.id).bind(&user.barbershop_id).bind(&user.name).bind(&user.email)
            .bind(&user.password_hash).bind(user.role).bind(user.created_at).bind(user.updated_at)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        sqlx::query(
            "INSERT INTO barbers (id, user_id, barbershop_id, specialties, commission, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
            .bind(&barber.id).bind(&barber.user_id).bind(&barber.barbershop_id)
            .bind(&barber.specialties).bind(barber.commission)
            .bind(barber.created_at).bind(barber.updated_at)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        let profile = Self::profile_in_tx(&mut tx, &barber.barbershop_id, &barber.id).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(profile)
    }

    async fn find_by_id(&self, barbershop_id: &str, id: &str) -> Result<Option<BarberProfile>, AppError> {
        sqlx::query_as::<_, BarberProfile>(&format!("{} WHERE b.barbershop_id = ? AND b.id = ?", PROFILE_SELECT))
            .bind(barbershop_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, barbershop_id: &str) -> Result<Vec<BarberProfile>, AppError> {
        sqlx::query_as::<_, BarberProfile>(&format!("{} WHERE b.barbershop_id = ? ORDER BY u.name ASC", PROFILE_SELECT))
            .bind(barbershop_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_with_user(&self, barbershop_id: &str, id: &str, update: &BarberUpdate) -> Result<BarberProfile, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let now = Utc::now();

        Self::lock_barber(&mut tx, barbershop_id, id).await?;

        let current = sqlx::query_as::<_, Barber>("SELECT * FROM barbers WHERE barbershop_id = ? AND id = ?")
            .bind(barbershop_id)
            .bind(id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        if let Some(name) = &update.name {
            sqlx::query("UPDATE users SET name = ?, updated_at = ? WHERE id = ?")
                .bind(name).bind(now).bind(&current.user_id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        let specialties = update.specialties.clone().map(Json).unwrap_or(current.specialties);
        let commission = update.commission.unwrap_or(current.commission);

        sqlx::query("UPDATE barbers SET specialties = ?, commission = ?, updated_at = ? WHERE id = ?")
            .bind(&specialties).bind(commission).bind(now).bind(&current.id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        let profile = Self::profile_in_tx(&mut tx, barbershop_id, id).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(profile)
    }

    async fn delete_with_user(&self, barbershop_id: &str, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        Self::lock_barber(&mut tx, barbershop_id, id).await?;

        let booked = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM appointments WHERE barbershop_id = ? AND barber_id = ?")
            .bind(barbershop_id)
            .bind(id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        if booked > 0 {
            return Err(AppError::Conflict("Barber has appointments and cannot be deleted".into()));
        }

        let user_id = sqlx::query_scalar::<_, String>("DELETE FROM barbers WHERE barbershop_id = ? AND id = ? RETURNING user_id")
            .bind(barbershop_id)
            .bind(id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Barber not found".into()))?;

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("SQLite barber user deletion failed: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
