use axum::extract::{Path, State};
use axum::Json;
use bugline_db::projects::models::{Project, ProjectMember, ProjectUser};
use bugline_db::projects::pg_repository::PgProjectRepository;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::response::{ok, Created, Envelope};
use crate::AppState;

use super::requests::{parse_user_id, AddMemberRequest, CreateProjectRequest, UpdateProjectRequest};
use super::responses::{CreatedProjectResponse, ProjectResponse};
use super::service::ProjectService;

fn service(state: &AppState) -> ProjectService<PgProjectRepository> {
    ProjectService::new(state.projects.clone())
}

pub async fn list_projects(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Envelope<Vec<ProjectResponse>>>, ApiError> {
    let projects = service(&state).list_projects().await?;
    Ok(ok(projects.into_iter().map(ProjectResponse::listing).collect()))
}

pub async fn list_my_projects(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Envelope<Vec<ProjectResponse>>>, ApiError> {
    let projects = service(&state).list_user_projects(current.user.id).await?;
    Ok(ok(projects.into_iter().map(ProjectResponse::listing).collect()))
}

pub async fn get_project(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<ProjectResponse>>, ApiError> {
    let overview = service(&state).get_project(id).await?;
    Ok(ok(ProjectResponse::detail(overview)))
}

pub async fn create_project(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(body): Json<CreateProjectRequest>,
) -> Result<Created<CreatedProjectResponse>, ApiError> {
    let input = body.validate()?;
    let (project, members) = service(&state)
        .create_project(
            current.user.id,
            input.name,
            input.description,
            input.member_ids,
        )
        .await?;
    Ok(Created(CreatedProjectResponse { project, members }))
}

pub async fn update_project(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProjectRequest>,
) -> Result<Json<Envelope<Project>>, ApiError> {
    let patch = body.validate()?;
    let project = service(&state)
        .update_project(current.user.id, id, patch)
        .await?;
    Ok(ok(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    service(&state).delete_project(current.user.id, id).await?;
    Ok(ok(serde_json::json!({ "id": id })))
}

pub async fn list_members(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<ProjectUser>>>, ApiError> {
    let users = service(&state).project_users(id).await?;
    Ok(ok(users))
}

pub async fn add_member(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AddMemberRequest>,
) -> Result<Created<ProjectMember>, ApiError> {
    let user_id = parse_user_id(&body.user_id)?;
    let member = service(&state)
        .add_member(current.user.id, id, user_id)
        .await?;
    Ok(Created(member))
}

pub async fn remove_member(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    service(&state)
        .remove_member(current.user.id, id, user_id)
        .await?;
    Ok(ok(serde_json::json!({ "project_id": id, "user_id": user_id })))
}
