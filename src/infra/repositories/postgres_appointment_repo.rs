use crate::domain::{
    models::appointment::{Appointment, AppointmentDetails, AppointmentFilter, AppointmentStatus},
    ports::AppointmentRepository,
    services::scheduling::find_conflict,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::warn;

const DETAILS_SELECT: &str = "SELECT a.id, a.barbershop_id, a.barber_id, a.service_id, a.date, a.start_time, a.end_time, a.status,
            a.client_name, a.client_phone, a.client_email, a.notes, a.created_at, a.updated_at,
            u.name AS barber_name, s.name AS service_name, s.price AS service_price
     FROM appointments a
     JOIN barbers b ON b.id = a.barber_id
     JOIN users u ON u.id = b.user_id
     JOIN services s ON s.id = a.service_id";

pub struct PostgresAppointmentRepo {
    pool: PgPool,
}

impl PostgresAppointmentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Row lock on the barber serializes every booking decision for that barber.
    async fn lock_barber(tx: &mut Transaction<'_, Postgres>, barbershop_id: &str, barber_id: &str) -> Result<(), AppError> {
        sqlx::query_scalar::<_, String>("SELECT id FROM barbers WHERE barbershop_id = $1 AND id = $2 FOR UPDATE")
            .bind(barbershop_id)
            .bind(barber_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Barber not found".into()))?;
        Ok(())
    }

    async fn day_schedule(tx: &mut Transaction<'_, Postgres>, barber_id: &str, date: NaiveDate) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE barber_id = $1 AND date = $2")
            .bind(barber_id)
            .bind(date)
            .fetch_all(&mut **tx)
            .await
            .map_err(AppError::Database)
    }

    async fn details_in_tx(tx: &mut Transaction<'_, Postgres>, barbershop_id: &str, id: &str) -> Result<AppointmentDetails, AppError> {
        sqlx::query_as::<_, AppointmentDetails>(&format!("{} WHERE a.barbershop_id = $1 AND a.id = $2", DETAILS_SELECT))
            .bind(barbershop_id)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
            .map_err(AppError::Database)
    }
}

#[async_trait]
impl AppointmentRepository for PostgresAppointmentRepo {
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
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
        )
            .bind(&appointment.id)
            .bind(&appointment.barbershop_id)
            .bind(&appointment.barber_id)
            .bind(&appointment.service_id)
            .bind(appointment.date)
            .bind(appointment.start_time)
            .bind(appointment.end_time)
            .bind(appointment.status)
            .bind(&appointment.client_name)
            .bind(&appointment.client_phone)
            .bind(&appointment.client_email)
            .bind(&appointment.notes)
            .bind(appointment.created_at)
            .bind(appointment.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let details = Self::details_in_tx(&mut tx, &appointment.barbershop_id, &appointment.id).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(details)
    }

    async fn find_by_id(&self, barbershop_id: &str, id: &str) -> Result<Option<AppointmentDetails>, AppError> {
        sqlx::query_as::<_, AppointmentDetails>(&format!("{} WHERE a.barbershop_id = $1 AND a.id = $2", DETAILS_SELECT))
            .bind(barbershop_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, barbershop_id: &str, filter: &AppointmentFilter) -> Result<Vec<AppointmentDetails>, AppError> {
        sqlx::query_as::<_, AppointmentDetails>(&format!(
            "{} WHERE a.barbershop_id = $1
               AND ($2::date IS NULL OR a.date = $2)
               AND ($3::text IS NULL OR a.barber_id = $3)
               AND ($4::text IS NULL OR a.status = $4)
             ORDER BY a.date ASC, a.start_time ASC",
            DETAILS_SELECT
        ))
            .bind(barbershop_id)
            .bind(filter.date)
            .bind(filter.barber_id.as_deref())
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_status(&self, barbershop_id: &str, id: &str, status: AppointmentStatus) -> Result<AppointmentDetails, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Row lock keeps concurrent status changes from acting on a stale status.
        let current = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE barbershop_id = $1 AND id = $2 FOR UPDATE")
            .bind(barbershop_id)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Appointment not found".into()))?;

        if !current.blocks_slot() && status.blocks_slot() {
            Self::lock_barber(&mut tx, barbershop_id, &current.barber_id).await?;
            let schedule = Self::day_schedule(&mut tx, &current.barber_id, current.date).await?;
            if find_conflict(&schedule, &current.barber_id, current.date, current.start_time, current.end_time, Some(&current.id)).is_some() {
                return Err(AppError::Conflict("Selected time slot is not available".into()));
            }
        }

        sqlx::query("UPDATE appointments SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(&current.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let details = Self::details_in_tx(&mut tx, barbershop_id, id).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(details)
    }
}
