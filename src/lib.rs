pub mod app;
pub mod config;
pub mod error;
pub mod reservations;
pub mod session;
pub mod state;
pub mod users;
pub mod validation;
pub mod vehicles;
