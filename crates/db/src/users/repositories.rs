use async_trait::async_trait;
use uuid::Uuid;

use crate::users::models::{NewUser, ProfileUpdate, User, UserSummary};
use bugline_common::error::BuglineResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> BuglineResult<Option<User>>;
    async fn get_by_email(&self, email: &str) -> BuglineResult<Option<User>>;

    /// Fails with `Conflict` when the email is already registered.
    async fn create(&self, user: NewUser) -> BuglineResult<User>;

    /// Partial update; absent fields keep their value.
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate)
        -> BuglineResult<Option<User>>;

    async fn list_summaries(&self) -> BuglineResult<Vec<UserSummary>>;
}
