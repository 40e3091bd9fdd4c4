pub mod handlers;
pub mod password;
pub mod requests;
pub mod resolver;
pub mod responses;
pub mod service;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-up", post(handlers::sign_up))
        .route("/auth/sign-in", post(handlers::sign_in))
        .route("/auth/sign-out", post(handlers::sign_out))
        .route("/auth/me", get(handlers::me))
}
