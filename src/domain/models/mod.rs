pub mod appointment;
pub mod auth;
pub mod barber;
pub mod barbershop;
pub mod service;
pub mod user;
