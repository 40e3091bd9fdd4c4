use axum::extract::{Path, State};
use axum::Json;
use bugline_db::bugs::pg_repository::PgBugRepository;
use bugline_db::comments::models::{Comment, CommentWithAuthor};
use bugline_db::comments::pg_repository::PgCommentRepository;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::response::{ok, Created, Envelope};
use crate::AppState;

use super::requests::CommentRequest;
use super::service::CommentService;

fn service(state: &AppState) -> CommentService<PgCommentRepository, PgBugRepository> {
    CommentService::new(state.comments.clone(), state.bugs.clone())
}

pub async fn list_comments(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(bug_id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<CommentWithAuthor>>>, ApiError> {
    Ok(ok(service(&state).list_comments(bug_id).await?))
}

pub async fn create_comment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(bug_id): Path<Uuid>,
    Json(body): Json<CommentRequest>,
) -> Result<Created<Comment>, ApiError> {
    let content = body.validate()?;
    let comment = service(&state)
        .create_comment(current.user.id, bug_id, content)
        .await?;
    Ok(Created(comment))
}

pub async fn update_comment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CommentRequest>,
) -> Result<Json<Envelope<Comment>>, ApiError> {
    let content = body.validate()?;
    let comment = service(&state)
        .update_comment(current.user.id, id, content)
        .await?;
    Ok(ok(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    service(&state).delete_comment(current.user.id, id).await?;
    Ok(ok(serde_json::json!({ "id": id })))
}
