use bugline_common::error::{BuglineError, BuglineResult};
use bugline_db::users::models::{ProfileUpdate, User, UserSummary};
use bugline_db::users::repositories::UserRepository;
use uuid::Uuid;

pub struct UserService<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    pub async fn list_users(&self) -> BuglineResult<Vec<UserSummary>> {
        let users = self.users.list_summaries().await?;
        tracing::debug!(count = users.len(), "listed users");
        Ok(users)
    }

    /// Update the caller's own display name and free-text role.
    pub async fn update_profile(&self, actor: Uuid, update: ProfileUpdate) -> BuglineResult<User> {
        let user = self
            .users
            .update_profile(actor, update)
            .await?
            .ok_or_else(|| BuglineError::NotFound(format!("user not found: {actor}")))?;
        tracing::info!(user_id = %actor, "profile updated");
        Ok(user)
    }
}
