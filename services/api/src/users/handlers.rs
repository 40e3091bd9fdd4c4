use axum::extract::State;
use axum::Json;
use bugline_db::users::models::{User, UserSummary};
use bugline_db::users::pg_repository::PgUserRepository;

use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::response::{ok, Envelope};
use crate::AppState;

use super::requests::UpdateProfileRequest;
use super::service::UserService;

fn service(state: &AppState) -> UserService<PgUserRepository> {
    UserService::new(state.users.clone())
}

pub async fn list_users(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Envelope<Vec<UserSummary>>>, ApiError> {
    Ok(ok(service(&state).list_users().await?))
}

pub async fn update_me(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<Envelope<User>>, ApiError> {
    let update = body.validate()?;
    let user = service(&state)
        .update_profile(current.user.id, update)
        .await?;
    Ok(ok(user))
}
