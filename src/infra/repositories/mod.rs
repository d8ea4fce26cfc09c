pub mod sqlite_appointment_repo;
pub mod sqlite_auth_repo;
pub mod sqlite_barber_repo;
pub mod sqlite_barbershop_repo;
pub mod sqlite_service_repo;
pub mod sqlite_user_repo;

pub mod postgres_appointment_repo;
pub mod postgres_auth_repo;
pub mod postgres_barber_repo;
pub mod postgres_barbershop_repo;
pub mod postgres_service_repo;
pub mod postgres_user_repo;
