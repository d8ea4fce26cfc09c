use crate::domain::models::{
    appointment::{Appointment, AppointmentDetails, AppointmentFilter, AppointmentStatus},
    auth::RefreshTokenRecord,
    barber::{Barber, BarberProfile, BarberUpdate},
    barbershop::{Barbershop, DashboardStats},
    service::Service,
    user::User,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait BarbershopRepository: Send + Sync {
    /// Creates the barbershop and its first admin user in one transaction.
    async fn register(&self, barbershop: &Barbershop, admin: &User) -> Result<(Barbershop, User), AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Barbershop>, AppError>;
    async fn update(&self, barbershop: &Barbershop) -> Result<Barbershop, AppError>;
    async fn stats(&self, id: &str) -> Result<DashboardStats, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, barbershop_id: &str, id: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    /// Marks a token as used. Returns false when it was already revoked, so
    /// only one of two concurrent refreshes with the same token wins.
    async fn revoke_refresh_token(&self, token_hash: &str, at: DateTime<Utc>) -> Result<bool, AppError>;
    async fn delete_family(&self, family_id: Uuid) -> Result<u64, AppError>;
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

#[async_trait]
pub trait BarberRepository: Send + Sync {
    /// Inserts the backing user and then the barber row atomically.
    async fn create_with_user(&self, user: &User, barber: &Barber) -> Result<BarberProfile, AppError>;
    async fn find_by_id(&self, barbershop_id: &str, id: &str) -> Result<Option<BarberProfile>, AppError>;
    async fn list(&self, barbershop_id: &str) -> Result<Vec<BarberProfile>, AppError>;
    async fn update_with_user(&self, barbershop_id: &str, id: &str, update: &BarberUpdate) -> Result<BarberProfile, AppError>;
    /// Deletes the barber row and then its user row atomically.
    async fn delete_with_user(&self, barbershop_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, service: &Service) -> Result<Service, AppError>;
    async fn find_by_id(&self, barbershop_id: &str, id: &str) -> Result<Option<Service>, AppError>;
    async fn list(&self, barbershop_id: &str) -> Result<Vec<Service>, AppError>;
    async fn update(&self, service: &Service) -> Result<Service, AppError>;
    async fn delete(&self, barbershop_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Locks the barber, rejects the booking if it overlaps a non-cancelled
    /// appointment of that barber on that date, and inserts it, all in one transaction.
    async fn create_if_available(&self, appointment: &Appointment) -> Result<AppointmentDetails, AppError>;
    async fn find_by_id(&self, barbershop_id: &str, id: &str) -> Result<Option<AppointmentDetails>, AppError>;
    async fn list(&self, barbershop_id: &str, filter: &AppointmentFilter) -> Result<Vec<AppointmentDetails>, AppError>;
    /// Changes the status; leaving `cancelled` re-checks the slot under the barber lock.
    async fn update_status(&self, barbershop_id: &str, id: &str, status: AppointmentStatus) -> Result<AppointmentDetails, AppError>;
}
