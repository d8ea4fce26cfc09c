use crate::domain::{
    models::appointment::{Appointment, AppointmentDetails, AppointmentFilter, AppointmentStatus},
    ports::AppointmentRepository,
    services::scheduling::find_conflict,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::warn;

const DETAILS_SELECT: &str = "SELECT a.id, a.barbershop_id, a.barber_id, a.service_id, a.date, a.start_time, a.end_time, a.status,
            a.client_name, a.client_phone, a.client_email, a.notes, a.created_at, a.updated_at,
            u.name AS barber_name, s.name AS service_name, s.price AS service_price
     FROM appointments a
     JOIN barbers b ON b.id = a.barber_id
     JOIN users u ON u.id = b.user_id
     JOIN services s ON s.id = a.service_id";

pub struct SqliteAppointmentRepo {
    pool: SqlitePool,
}

impl SqliteAppointmentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // A no-op write takes SQLite's write lock up front, so concurrent bookings queue here.
    async fn lock_barber(tx: &mut Transaction<'_, Sqlite>, barbershop_id: &str, barber_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE barbers SET updated_at = updated_at WHERE barbershop_id = ? AND id = ?")
            .bind(barbershop_id)
            .bind(barber_id)
            .execute(&mut **tx)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Barber not found".into()));
        }
        Ok(())
    }

    async fn day_schedule(tx: &mut Transaction<'_, Sqlite>, barber_id: &str, date: NaiveDate) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE barber_id = ? AND date = ?")
            .bind(barber_id)
            .bind(date)
            .fetch_all(&mut **tx)
            .await
            .map_err(AppError::Database)
    }

    async fn details_in_tx(tx: &mut Transaction<'_, Sqlite>, barbershop_id: &str, id: &str) -> Result<AppointmentDetails, AppError> {
        sqlx::query_as::<_, AppointmentDetails>(&format!("{} WHERE a.barbershop_id = ? AND a.id = ?", DETAILS_SELECT))
            .bind(barbershop_id)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
            .map_err(AppError::Database)
    }
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepo {
    async fn create_if_available(&self, appointment: &Appointment) -> Result<AppointmentDetails, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        Self::lock_barber(&mut tx, &appointment.barbershop_id, &appointment.barber_id).await?;

        let schedule = Self::day_schedule(&mut tx, &appointment.barber_id, appointment.date).await?;
        if let Some(taken) = find_conflict(&schedule, &appointment.barber_id, appointment.date, appointment.start_time, appointment.end_time, None) {
            warn!("Slot {}-{} on {} collides with appointment {}", appointment.start_time, appointment.end_time, appointment.date, taken.id);
            return Err(AppError::Conflict("Selected time slot is not available".into()));
        }

        sqlx::query(
            "INSERT INTO appointments (id, barbershop_id, barber_id, service_id, date, start_time, end_time, status, client_name, client_phone, client_email, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
            .bind(&appointment.id).bind(&appointment.barbershop_id).bind(&appointment.barber_id).bind(&appointment.service_id)
            .bind(appointment.date).bind(appointment.start_time).bind(appointment.end_time).bind(appointment.status)
            .bind(&appointment.client_name).bind(&appointment.client_phone).bind(&appointment.client_email).bind(&appointment.notes)
            .bind(appointment.created_at).bind(appointment.updated_at)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        let details = Self::details_in_tx(&mut tx, &appointment.barbershop_id, &appointment.id).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(details)
    }

    async fn find_by_id(&self, barbershop_id: &str, id: &str) -> Result<Option<AppointmentDetails>, AppError> {
        sqlx::query_as::<_, AppointmentDetails>(&format!("{} WHERE a.barbershop_id = ? AND a.id = ?", DETAILS_SELECT))
            .bind(barbershop_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, barbershop_id: &str, filter: &AppointmentFilter) -> Result<Vec<AppointmentDetails>, AppError> {
        let status = filter.status.map(|s| s.as_str());
        let barber_id = filter.barber_id.as_deref();

        sqlx::query_as::<_, AppointmentDetails>(&format!(
            "{} WHERE a.barbershop_id = ?
               AND (? IS NULL OR a.date = ?)
               AND (? IS NULL OR a.barber_id = ?)
               AND (? IS NULL OR a.status = ?)
             ORDER BY a.date ASC, a.start_time ASC",
            DETAILS_SELECT
        ))
            .bind(barbershop_id)
            .bind(filter.date).bind(filter.date)
            .bind(barber_id).bind(barber_id)
            .bind(status).bind(status)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_status(&self, barbershop_id: &str, id: &str, status: AppointmentStatus) -> Result<AppointmentDetails, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Write first: upgrading a WAL read transaction to a writer fails instead of waiting.
        let locked = sqlx::query(
            "UPDATE barbers SET updated_at = updated_at
             WHERE id = (SELECT barber_id FROM appointments WHERE barbershop_id = ? AND id = ?)"
        )
            .bind(barbershop_id).bind(id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        if locked.rows_affected() == 0 {
            return Err(AppError::NotFound("Appointment not found".into()));
        }

        let current = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE barbershop_id = ? AND id = ?")
            .bind(barbershop_id)
            .bind(id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Appointment not found".into()))?;

        if !current.blocks_slot() && status.blocks_slot() {
            let schedule = Self::day_schedule(&mut tx, &current.barber_id, current.date).await?;
            if find_conflict(&schedule, &current.barber_id, current.date, current.start_time, current.end_time, Some(&current.id)).is_some() {
                return Err(AppError::Conflict("Selected time slot is not available".into()));
            }
        }

        sqlx::query("UPDATE appointments SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str()).bind(Utc::now()).bind(&current.id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        let details = Self::details_in_tx(&mut tx, barbershop_id, id).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(details)
    }
}
