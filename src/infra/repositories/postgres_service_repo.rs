use crate::domain::{models::service::Service, ports::ServiceRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresServiceRepo {
    pool: PgPool,
}

impl PostgresServiceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRepository for PostgresServiceRepo {
    async fn create(&self, service: &Service) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(
            "INSERT INTO services (id, barbershop_id, name, description, price, duration, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *"
        )
            .bind(&service.id)
            .bind(&service.barbershop_id)
            .bind(&service.name)
            .bind(&service.description)
            .bind(service.price)
            .bind(service.duration)
            .bind(service.created_at)
            .bind(service.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, barbershop_id: &str, id: &str) -> Result<Option<Service>, AppError> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE barbershop_id = $1 AND id = $2")
            .bind(barbershop_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, barbershop_id: &str) -> Result<Vec<Service>, AppError> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE barbershop_id = $1 ORDER BY name ASC")
            .bind(barbershop_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, service: &Service) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(
            "UPDATE services
             SET name = $1, description = $2, price = $3, duration = $4, updated_at = $5
             WHERE barbershop_id = $6 AND id = $7
             RETURNING *"
        )
            .bind(&service.name)
            .bind(&service.description)
            .bind(service.price)
            .bind(service.duration)
            .bind(service.updated_at)
            .bind(&service.barbershop_id)
            .bind(&service.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Service not found".into()))
    }

    async fn delete(&self, barbershop_id: &str, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let booked = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM appointments WHERE barbershop_id = $1 AND service_id = $2")
            .bind(barbershop_id)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if booked > 0 {
            return Err(AppError::Conflict("Service has appointments and cannot be deleted".into()));
        }

        let result = sqlx::query("DELETE FROM services WHERE barbershop_id = $1 AND id = $2")
            .bind(barbershop_id)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Service not found".into()));
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
