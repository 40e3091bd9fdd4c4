use axum::extract::State;
use axum::Json;
use bugline_db::dashboard::pg_repository::PgDashboardRepository;

use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::response::{ok, Envelope};
use crate::AppState;

use super::service::{DashboardService, DashboardStats};

fn service(state: &AppState) -> DashboardService<PgDashboardRepository> {
    DashboardService::new(state.dashboard.clone())
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Envelope<DashboardStats>>, ApiError> {
    Ok(ok(service(&state).stats().await?))
}
