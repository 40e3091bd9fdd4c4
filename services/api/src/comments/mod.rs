pub mod handlers;
pub mod requests;
pub mod service;

use axum::routing::{get, put};
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/bugs/{id}/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route(
            "/comments/{id}",
            put(handlers::update_comment).delete(handlers::delete_comment),
        )
}
