use axum::extract::State;
use axum::Json;
use bugline_db::sessions::pg_repository::PgSessionRepository;
use bugline_db::users::models::User;
use bugline_db::users::pg_repository::PgUserRepository;

use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::response::{ok, Created, Envelope};
use crate::AppState;

use super::requests::{SignInRequest, SignUpRequest};
use super::responses::SessionResponse;
use super::service::AuthService;

fn service(state: &AppState) -> AuthService<PgUserRepository, PgSessionRepository> {
    AuthService::new(state.users.clone(), state.sessions.clone(), state.session_ttl)
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpRequest>,
) -> Result<Created<User>, ApiError> {
    body.validate()?;
    let user = service(&state)
        .sign_up(&body.name, &body.email, &body.password)
        .await?;
    Ok(Created(user))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> Result<Json<Envelope<SessionResponse>>, ApiError> {
    body.validate()?;
    let session = service(&state).sign_in(&body.email, &body.password).await?;
    Ok(ok(session))
}

pub async fn sign_out(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    service(&state)
        .sign_out(current.user.id, &current.token)
        .await?;
    Ok(ok(serde_json::Value::Null))
}

pub async fn me(current: CurrentUser) -> Json<Envelope<User>> {
    ok(current.user)
}
