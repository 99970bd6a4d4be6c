use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod qr;
pub mod service;
pub mod store;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::admin_routes())
}
