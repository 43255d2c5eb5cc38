use crate::state::AppState;
use axum::Router;

mod dto;
mod format;
pub mod handlers;
pub mod query;
pub mod repo;
pub mod text;

pub fn router() -> Router<AppState> {
    handlers::cheese_routes()
}
