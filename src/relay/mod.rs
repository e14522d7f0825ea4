pub mod client;
pub mod dto;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod parse;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::text_routes())
        .merge(handlers::image_routes())
}
