use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, QueryBuilder, Row};
use uuid::Uuid;

use crate::comments::models::{Comment, CommentAuthor, CommentWithAuthor, NewComment};
use crate::comments::repositories::CommentRepository;
use crate::guard::{MutationGuard, ProjectRef};
use crate::map_db_error;
use bugline_common::error::BuglineResult;

const COMMENT_COLUMNS: &str = "id, content, bug_id, user_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_comment_row(row: &PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        content: row.get("content"),
        bug_id: row.get("bug_id"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(
        &self,
        comment: NewComment,
        guard: MutationGuard,
    ) -> BuglineResult<Option<Comment>> {
        let now = Utc::now();
        let mut qb = QueryBuilder::new(
            "insert into comments (id, content, bug_id, user_id, created_at, updated_at) select ",
        );
        {
            let mut values = qb.separated(", ");
            values.push_bind(Uuid::new_v4());
            values.push_bind(comment.content);
            values.push_bind(comment.bug_id);
            values.push_bind(comment.user_id);
            values.push_bind(now);
            values.push_bind(now);
        }
        qb.push(" where true");
        guard.push_condition(
            &mut qb,
            ProjectRef::OfBug(comment.bug_id),
            Some("comments.user_id"),
        );
        qb.push(" returning ").push(COMMENT_COLUMNS);

        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.as_ref().map(map_comment_row))
    }

    async fn get_by_id(&self, id: Uuid) -> BuglineResult<Option<Comment>> {
        let row = sqlx::query(&format!("select {COMMENT_COLUMNS} from comments where id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.as_ref().map(map_comment_row))
    }

    async fn list_for_bug(&self, bug_id: Uuid) -> BuglineResult<Vec<CommentWithAuthor>> {
        let rows = sqlx::query(
            "select c.id, c.content, c.bug_id, c.user_id, c.created_at, c.updated_at,
                    u.name as author_name, u.image as author_image
             from comments c
             join users u on u.id = c.user_id
             where c.bug_id = $1
             order by c.created_at asc",
        )
        .bind(bug_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .iter()
            .map(|row| CommentWithAuthor {
                comment: map_comment_row(row),
                user: CommentAuthor {
                    name: row.get("author_name"),
                    image: row.get("author_image"),
                },
            })
            .collect())
    }

    async fn update(
        &self,
        id: Uuid,
        content: String,
        guard: MutationGuard,
    ) -> BuglineResult<Option<Comment>> {
        let mut qb = QueryBuilder::new("update comments set content = ");
        qb.push_bind(content)
            .push(", updated_at = ")
            .push_bind(Utc::now())
            .push(" where id = ")
            .push_bind(id);
        guard.push_condition(
            &mut qb,
            ProjectRef::Column("comments.bug_id"),
            Some("comments.user_id"),
        );
        qb.push(" returning ").push(COMMENT_COLUMNS);

        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.as_ref().map(map_comment_row))
    }

    async fn delete(&self, id: Uuid, guard: MutationGuard) -> BuglineResult<bool> {
        let mut qb = QueryBuilder::new("delete from comments where id = ");
        qb.push_bind(id);
        guard.push_condition(
            &mut qb,
            ProjectRef::Column("comments.bug_id"),
            Some("comments.user_id"),
        );

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
