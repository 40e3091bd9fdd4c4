use async_trait::async_trait;
use uuid::Uuid;

use crate::comments::models::{Comment, CommentWithAuthor, NewComment};
use crate::guard::MutationGuard;
use bugline_common::error::BuglineResult;

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// The guard is evaluated against the project owning `comment.bug_id`.
    async fn create(
        &self,
        comment: NewComment,
        guard: MutationGuard,
    ) -> BuglineResult<Option<Comment>>;

    async fn get_by_id(&self, id: Uuid) -> BuglineResult<Option<Comment>>;

    /// Oldest first.
    async fn list_for_bug(&self, bug_id: Uuid) -> BuglineResult<Vec<CommentWithAuthor>>;

    async fn update(
        &self,
        id: Uuid,
        content: String,
        guard: MutationGuard,
    ) -> BuglineResult<Option<Comment>>;

    async fn delete(&self, id: Uuid, guard: MutationGuard) -> BuglineResult<bool>;
}
