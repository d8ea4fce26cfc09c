pub mod appointment;
pub mod auth;
pub mod barber;
pub mod barbershop;
pub mod health;
pub mod register;
pub mod service;
