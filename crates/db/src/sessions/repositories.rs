use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::sessions::models::Session;
use crate::users::models::User;
use bugline_common::error::BuglineResult;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: Session) -> BuglineResult<Session>;

    /// The user owning an unexpired session with this token digest.
    async fn find_user(&self, token_hash: &str, now: DateTime<Utc>)
        -> BuglineResult<Option<User>>;

    async fn delete(&self, token_hash: &str) -> BuglineResult<bool>;

    async fn purge_expired(&self, now: DateTime<Utc>) -> BuglineResult<u64>;
}
