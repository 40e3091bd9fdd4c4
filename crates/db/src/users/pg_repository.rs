use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, QueryBuilder, Row};
use uuid::Uuid;

use crate::map_db_error;
use crate::users::models::{NewUser, ProfileUpdate, User, UserSummary};
use crate::users::repositories::UserRepository;
use bugline_common::error::BuglineResult;

const USER_COLUMNS: &str =
    "id, name, email, image, password_hash, role, email_verified, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

pub(crate) fn map_user_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        image: row.get("image"),
        password_hash: row.get("password_hash"),
        role: row.get("role"),
        email_verified: row.get("email_verified"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Read a user projection whose columns are prefixed, e.g. `reporter_name`.
pub(crate) fn map_summary_prefixed(row: &PgRow, prefix: &str) -> UserSummary {
    UserSummary {
        id: row.get(format!("{prefix}_id").as_str()),
        name: row.get(format!("{prefix}_name").as_str()),
        email: row.get(format!("{prefix}_email").as_str()),
        image: row.get(format!("{prefix}_image").as_str()),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_id(&self, id: Uuid) -> BuglineResult<Option<User>> {
        let row = sqlx::query(&format!("select {USER_COLUMNS} from users where id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.as_ref().map(map_user_row))
    }

    async fn get_by_email(&self, email: &str) -> BuglineResult<Option<User>> {
        let row = sqlx::query(&format!(
            "select {USER_COLUMNS} from users where lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.as_ref().map(map_user_row))
    }

    async fn create(&self, user: NewUser) -> BuglineResult<User> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "insert into users (id, name, email, image, password_hash, created_at, updated_at)
             values ($1, $2, $3, $4, $5, $6, $6)
             returning {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.image)
        .bind(&user.password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(map_user_row(&row))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> BuglineResult<Option<User>> {
        let mut qb = QueryBuilder::new("update users set updated_at = ");
        qb.push_bind(Utc::now());
        if let Some(name) = update.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(role) = update.role {
            qb.push(", role = ").push_bind(role);
        }
        qb.push(" where id = ").push_bind(id);
        qb.push(" returning ").push(USER_COLUMNS);

        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.as_ref().map(map_user_row))
    }

    async fn list_summaries(&self) -> BuglineResult<Vec<UserSummary>> {
        let rows = sqlx::query("select id, name, email, image from users order by name nulls last, email")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows
            .iter()
            .map(|row| UserSummary {
                id: row.get("id"),
                name: row.get("name"),
                email: row.get("email"),
                image: row.get("image"),
            })
            .collect())
    }
}
