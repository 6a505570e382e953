pub mod dto;
pub mod handlers;
pub mod repo;
pub mod services;
pub mod suggestions;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_router())
        .merge(handlers::write_router())
}
