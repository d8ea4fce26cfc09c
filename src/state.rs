use std::sync::Arc;
use crate::domain::ports::{
    AppointmentRepository, AuthRepository, BarberRepository, BarbershopRepository,
    ServiceRepository, UserRepository,
};
use crate::domain::services::auth_service::AuthService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub barbershop_repo: Arc<dyn BarbershopRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub barber_repo: Arc<dyn BarberRepository>,
    pub service_repo: Arc<dyn ServiceRepository>,
    pub appointment_repo: Arc<dyn AppointmentRepository>,
    pub auth_repo: Arc<dyn AuthRepository>,
    pub auth_service: Arc<AuthService>,
}
