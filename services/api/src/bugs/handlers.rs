use axum::extract::{Path, State};
use axum::Json;
use bugline_db::bugs::models::{Bug, BugDetail};
use bugline_db::bugs::pg_repository::PgBugRepository;
use bugline_db::projects::pg_repository::PgProjectRepository;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::response::{ok, Created, Envelope};
use crate::AppState;

use super::requests::{CreateBugRequest, UpdateBugRequest};
use super::service::BugService;

fn service(state: &AppState) -> BugService<PgBugRepository, PgProjectRepository> {
    BugService::new(state.bugs.clone(), state.projects.clone())
}

pub async fn list_bugs(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Envelope<Vec<BugDetail>>>, ApiError> {
    Ok(ok(service(&state).list_bugs().await?))
}

pub async fn list_my_bugs(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Envelope<Vec<BugDetail>>>, ApiError> {
    Ok(ok(service(&state).list_user_bugs(current.user.id).await?))
}

pub async fn get_bug(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<BugDetail>>, ApiError> {
    Ok(ok(service(&state).get_bug(id).await?))
}

pub async fn create_bug(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(project_id): Path<Uuid>,
    Json(body): Json<CreateBugRequest>,
) -> Result<Created<Bug>, ApiError> {
    let input = body.validate()?;
    let bug = service(&state)
        .create_bug(current.user.id, project_id, input)
        .await?;
    Ok(Created(bug))
}

pub async fn update_bug(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateBugRequest>,
) -> Result<Json<Envelope<Bug>>, ApiError> {
    let patch = body.validate()?;
    let bug = service(&state).update_bug(current.user.id, id, patch).await?;
    Ok(ok(bug))
}

pub async fn delete_bug(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    service(&state).delete_bug(current.user.id, id).await?;
    Ok(ok(serde_json::json!({ "id": id })))
}
