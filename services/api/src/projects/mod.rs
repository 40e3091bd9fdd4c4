pub mod handlers;
pub mod requests;
pub mod responses;
pub mod service;

use axum::routing::{delete, get};
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route("/projects/mine", get(handlers::list_my_projects))
        .route(
            "/projects/{id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route(
            "/projects/{id}/members",
            get(handlers::list_members).post(handlers::add_member),
        )
        .route(
            "/projects/{id}/members/{user_id}",
            delete(handlers::remove_member),
        )
}
