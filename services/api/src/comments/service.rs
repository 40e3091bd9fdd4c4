//! Comment operations. Any project member may comment; only the author may
//! edit or delete, and that right survives leaving the project.

use bugline_access::rules::{can_access_project, can_modify_comment};
use bugline_common::error::{BuglineError, BuglineResult};
use bugline_db::bugs::repositories::BugRepository;
use bugline_db::comments::models::{Comment, CommentWithAuthor, NewComment};
use bugline_db::comments::repositories::CommentRepository;
use bugline_db::guard::MutationGuard;
use uuid::Uuid;

use crate::bugs::service::bug_not_found;
use crate::projects::service::NOT_MEMBER;

const NOT_AUTHOR: &str = "Only the author can modify this comment";

fn comment_not_found(id: Uuid) -> BuglineError {
    BuglineError::NotFound(format!("comment not found: {id}"))
}

pub struct CommentService<C: CommentRepository, B: BugRepository> {
    comments: C,
    bugs: B,
}

impl<C: CommentRepository, B: BugRepository> CommentService<C, B> {
    pub fn new(comments: C, bugs: B) -> Self {
        Self { comments, bugs }
    }

    async fn load(&self, actor: Uuid, comment_id: Uuid) -> BuglineResult<Comment> {
        let comment = self
            .comments
            .get_by_id(comment_id)
            .await?
            .ok_or_else(|| comment_not_found(comment_id))?;
        if !can_modify_comment(actor, &comment) {
            tracing::warn!(%comment_id, user_id = %actor, "comment change denied");
            return Err(BuglineError::Unauthorized(NOT_AUTHOR.to_string()));
        }
        Ok(comment)
    }

    async fn missed(&self, comment_id: Uuid) -> BuglineError {
        match self.comments.get_by_id(comment_id).await {
            Ok(Some(_)) => BuglineError::Unauthorized(NOT_AUTHOR.to_string()),
            Ok(None) => comment_not_found(comment_id),
            Err(e) => e,
        }
    }

    pub async fn create_comment(
        &self,
        actor: Uuid,
        bug_id: Uuid,
        content: String,
    ) -> BuglineResult<Comment> {
        let scoped = self
            .bugs
            .get_scoped(bug_id)
            .await?
            .ok_or_else(|| bug_not_found(bug_id))?;
        if !can_access_project(actor, &scoped.members) {
            tracing::warn!(%bug_id, user_id = %actor, "comment denied");
            return Err(BuglineError::Unauthorized(NOT_MEMBER.to_string()));
        }

        let created = self
            .comments
            .create(
                NewComment {
                    content,
                    bug_id,
                    user_id: actor,
                },
                MutationGuard::Member(actor),
            )
            .await?;

        match created {
            Some(comment) => {
                tracing::info!(%bug_id, comment_id = %comment.id, user_id = %actor, "comment added");
                Ok(comment)
            }
            None => match self.bugs.get_by_id(bug_id).await? {
                Some(_) => Err(BuglineError::Unauthorized(NOT_MEMBER.to_string())),
                None => Err(bug_not_found(bug_id)),
            },
        }
    }

    /// Oldest first.
    pub async fn list_comments(&self, bug_id: Uuid) -> BuglineResult<Vec<CommentWithAuthor>> {
        self.bugs
            .get_by_id(bug_id)
            .await?
            .ok_or_else(|| bug_not_found(bug_id))?;
        let comments = self.comments.list_for_bug(bug_id).await?;
        tracing::debug!(%bug_id, count = comments.len(), "listed comments");
        Ok(comments)
    }

    pub async fn update_comment(
        &self,
        actor: Uuid,
        comment_id: Uuid,
        content: String,
    ) -> BuglineResult<Comment> {
        self.load(actor, comment_id).await?;
        match self
            .comments
            .update(comment_id, content, MutationGuard::Author(actor))
            .await?
        {
            Some(comment) => {
                tracing::info!(%comment_id, user_id = %actor, "comment updated");
                Ok(comment)
            }
            None => Err(self.missed(comment_id).await),
        }
    }

    pub async fn delete_comment(&self, actor: Uuid, comment_id: Uuid) -> BuglineResult<()> {
        self.load(actor, comment_id).await?;
        if self
            .comments
            .delete(comment_id, MutationGuard::Author(actor))
            .await?
        {
            tracing::info!(%comment_id, user_id = %actor, "comment deleted");
            Ok(())
        } else {
            Err(self.missed(comment_id).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bugs::service::{BugInput, BugService};
    use crate::projects::service::ProjectService;
    use crate::test_support::MemoryStore;
    use bugline_db::bugs::models::Priority;

    struct Fixture {
        comments: CommentService<MemoryStore, MemoryStore>,
        projects: ProjectService<MemoryStore>,
        admin: Uuid,
        author: Uuid,
        outsider: Uuid,
        project_id: Uuid,
        bug_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let admin = store.seed_user("admin@example.test").id;
        let author = store.seed_user("author@example.test").id;
        let outsider = store.seed_user("outsider@example.test").id;
        let projects = ProjectService::new(store.clone());
        let (project, _) = projects
            .create_project(admin, "Alpha".into(), None, vec![author])
            .await
            .unwrap();
        let bug = BugService::new(store.clone(), store.clone())
            .create_bug(
                admin,
                project.id,
                BugInput {
                    title: "Crash".into(),
                    description: None,
                    priority: Priority::High,
                    assignee_id: None,
                },
            )
            .await
            .unwrap();
        Fixture {
            comments: CommentService::new(store.clone(), store),
            projects,
            admin,
            author,
            outsider,
            project_id: project.id,
            bug_id: bug.id,
        }
    }

    #[tokio::test]
    async fn members_comment_outsiders_do_not() {
        let f = fixture().await;
        f.comments
            .create_comment(f.author, f.bug_id, "first".into())
            .await
            .unwrap();

        let err = f
            .comments
            .create_comment(f.outsider, f.bug_id, "drive-by".into())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unauthorized");

        let err = f
            .comments
            .create_comment(f.author, Uuid::new_v4(), "lost".into())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn comments_list_oldest_first_with_author() {
        let f = fixture().await;
        for content in ["one", "two", "three"] {
            f.comments
                .create_comment(f.author, f.bug_id, content.into())
                .await
                .unwrap();
        }

        let listed = f.comments.list_comments(f.bug_id).await.unwrap();
        let contents: Vec<&str> = listed.iter().map(|c| c.comment.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert!(listed.iter().all(|c| c.user.name.is_some()));
    }

    #[tokio::test]
    async fn only_author_modifies_even_against_admin() {
        let f = fixture().await;
        let comment = f
            .comments
            .create_comment(f.author, f.bug_id, "mine".into())
            .await
            .unwrap();

        let err = f
            .comments
            .update_comment(f.admin, comment.id, "admin edit".into())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unauthorized");
        let err = f
            .comments
            .delete_comment(f.admin, comment.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unauthorized");

        let updated = f
            .comments
            .update_comment(f.author, comment.id, "edited".into())
            .await
            .unwrap();
        assert_eq!(updated.content, "edited");

        f.comments
            .delete_comment(f.author, comment.id)
            .await
            .unwrap();
        assert!(f.comments.list_comments(f.bug_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn author_keeps_rights_after_leaving_project() {
        let f = fixture().await;
        let comment = f
            .comments
            .create_comment(f.author, f.bug_id, "mine".into())
            .await
            .unwrap();
        f.projects
            .remove_member(f.admin, f.project_id, f.author)
            .await
            .unwrap();

        let updated = f
            .comments
            .update_comment(f.author, comment.id, "still mine".into())
            .await
            .unwrap();
        assert_eq!(updated.content, "still mine");
    }

    #[tokio::test]
    async fn missing_comment_is_not_found() {
        let f = fixture().await;
        let err = f
            .comments
            .delete_comment(f.author, Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }
}
