use crate::domain::{
    models::{barbershop::{Barbershop, DashboardStats}, user::User},
    ports::BarbershopRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{SqlitePool, Row};

pub struct SqliteBarbershopRepo {
    pool: SqlitePool,
}

impl SqliteBarbershopRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BarbershopRepository for SqliteBarbershopRepo {
    async fn register(&self, barbershop: &Barbershop, admin: &User) -> Result<(Barbershop, User), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created_shop = sqlx::query_as::<_, Barbershop>(
            "INSERT INTO barbershops (id, name, address, phone, email, description, logo, opening_time, closing_time, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&barbershop.id).bind(&barbershop.name).bind(&barbershop.address).bind(&barbershop.phone)
            .bind(&barbershop.email).bind(&barbershop.description).bind(&barbershop.logo)
            .bind(barbershop.opening_time).bind(barbershop.closing_time)
            .bind(barbershop.created_at).bind(barbershop.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        let created_admin = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, barbershop_id, name, email, password_hash, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&admin.id).bind(&created_shop.id).bind(&admin.name).bind(&admin.email)
            .bind(&admin.password_hash).bind(admin.role).bind(admin.created_at).bind(admin.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok((created_shop, created_admin))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Barbershop>, AppError> {
        sqlx::query_as::<_, Barbershop>("SELECT * FROM barbershops WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, barbershop: &Barbershop) -> Result<Barbershop, AppError> {
        sqlx::query_as::<_, Barbershop>(
            "UPDATE barbershops
             SET name=?, address=?, phone=?, description=?, logo=?, opening_time=?, closing_time=?, updated_at=?
             WHERE id=?
             RETURNING *"
        )
            .bind(&barbershop.name).bind(&barbershop.address).bind(&barbershop.phone)
            .bind(&barbershop.description).bind(&barbershop.logo)
            .bind(barbershop.opening_time).bind(barbershop.closing_time).bind(barbershop.updated_at)
            .bind(&barbershop.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Barbershop not found".into()))
    }

    async fn stats(&self, id: &str) -> Result<DashboardStats, AppError> {
        let row = sqlx::query(
            "SELECT
                (SELECT COUNT(*) FROM appointments WHERE barbershop_id = ?) AS appointments,
                (SELECT COUNT(*) FROM barbers WHERE barbershop_id = ?) AS barbers,
                (SELECT COUNT(*) FROM services WHERE barbershop_id = ?) AS services"
        )
            .bind(id).bind(id).bind(id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;

        Ok(DashboardStats {
            appointments: row.get::<i64, _>("appointments"),
            barbers: row.get::<i64, _>("barbers"),
            services: row.get::<i64, _>("services"),
        })
    }
}
