pub mod handlers;
pub mod requests;
pub mod service;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bugs", get(handlers::list_bugs))
        .route("/bugs/mine", get(handlers::list_my_bugs))
        .route(
            "/bugs/{id}",
            get(handlers::get_bug)
                .put(handlers::update_bug)
                .delete(handlers::delete_bug),
        )
        .route("/projects/{id}/bugs", post(handlers::create_bug))
}
