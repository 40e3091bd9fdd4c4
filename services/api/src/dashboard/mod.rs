pub mod handlers;
pub mod service;

use axum::routing::get;
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(handlers::get_dashboard))
}
