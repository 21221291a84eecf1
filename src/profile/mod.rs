use crate::state::AppState;
use axum::Router;

pub mod calculator;
mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::profile_routes()
}
