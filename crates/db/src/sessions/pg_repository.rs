use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::map_db_error;
use crate::sessions::models::Session;
use crate::sessions::repositories::SessionRepository;
use crate::users::models::User;
use crate::users::pg_repository::map_user_row;
use bugline_common::error::BuglineResult;

#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, session: Session) -> BuglineResult<Session> {
        let row = sqlx::query(
            "insert into sessions (id, user_id, token_hash, expires_at, created_at)
             values ($1, $2, $3, $4, $5)
             returning id, user_id, token_hash, expires_at, created_at",
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.token_hash)
        .bind(session.expires_at)
        .bind(session.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Session {
            id: row.get("id"),
            user_id: row.get("user_id"),
            token_hash: row.get("token_hash"),
            expires_at: row.get("expires_at"),
            created_at: row.get("created_at"),
        })
    }

    async fn find_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> BuglineResult<Option<User>> {
        let row = sqlx::query(
            "select u.id, u.name, u.email, u.image, u.password_hash, u.role,
                    u.email_verified, u.created_at, u.updated_at
             from sessions s
             join users u on u.id = s.user_id
             where s.token_hash = $1 and s.expires_at > $2",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.as_ref().map(map_user_row))
    }

    async fn delete(&self, token_hash: &str) -> BuglineResult<bool> {
        let result = sqlx::query("delete from sessions where token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> BuglineResult<u64> {
        let result = sqlx::query("delete from sessions where expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        let purged = result.rows_affected();
        if purged > 0 {
            tracing::debug!(purged, "purged expired sessions");
        }
        Ok(purged)
    }
}
