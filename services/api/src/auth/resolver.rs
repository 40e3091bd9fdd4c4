//! Bearer session tokens and their resolution to a user.
//!
//! A token is handed to the client once at sign-in. Only its SHA-256 digest
//! is stored, so a leaked `sessions` table cannot be replayed.

use async_trait::async_trait;
use bugline_common::error::BuglineResult;
use bugline_db::sessions::repositories::SessionRepository;
use bugline_db::users::models::User;
use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// The principal behind `token`; `None` for unknown or expired tokens.
    async fn resolve(&self, token: &str) -> BuglineResult<Option<User>>;
}

pub fn issue_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Lowercase hex SHA-256 of the token.
pub fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[derive(Clone)]
pub struct SessionResolver<S: SessionRepository> {
    sessions: S,
}

impl<S: SessionRepository> SessionResolver<S> {
    pub fn new(sessions: S) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl<S: SessionRepository> IdentityResolver for SessionResolver<S> {
    async fn resolve(&self, token: &str) -> BuglineResult<Option<User>> {
        if token.is_empty() {
            return Ok(None);
        }
        self.sessions
            .find_user(&token_digest(token), Utc::now())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;
    use bugline_db::sessions::models::Session;
    use chrono::Duration;

    #[test]
    fn digest_is_stable_hex() {
        let digest = token_digest("abc");
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn issued_tokens_are_unique() {
        assert_ne!(issue_token(), issue_token());
    }

    #[tokio::test]
    async fn resolves_live_session_only() {
        let store = MemoryStore::new();
        let user = store.seed_user("ada@example.test");
        let now = Utc::now();

        for (token, expires_at) in [
            ("live", now + Duration::hours(1)),
            ("stale", now - Duration::hours(1)),
        ] {
            store.seed_session(Session {
                id: Uuid::new_v4(),
                user_id: user.id,
                token_hash: token_digest(token),
                expires_at,
                created_at: now,
            });
        }

        let resolver = SessionResolver::new(store.clone());
        let found = resolver.resolve("live").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(resolver.resolve("stale").await.unwrap().is_none());
        assert!(resolver.resolve("unknown").await.unwrap().is_none());
        assert!(resolver.resolve("").await.unwrap().is_none());
    }
}
