pub mod handlers;
pub mod requests;
pub mod service;

use axum::routing::{get, put};
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::list_users))
        .route("/users/me", put(handlers::update_me))
}
