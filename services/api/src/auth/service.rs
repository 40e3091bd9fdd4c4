use bugline_common::error::{BuglineError, BuglineResult};
use bugline_db::sessions::models::Session;
use bugline_db::sessions::repositories::SessionRepository;
use bugline_db::users::models::{NewUser, User};
use bugline_db::users::repositories::UserRepository;
use chrono::{Duration, Utc};
use uuid::Uuid;

use super::password::{hash_password, verify_password};
use super::resolver::{issue_token, token_digest};
use super::responses::SessionResponse;

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const EMAIL_TAKEN: &str = "Email already exists";

pub struct AuthService<U: UserRepository, S: SessionRepository> {
    users: U,
    sessions: S,
    session_ttl: Duration,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub fn new(users: U, sessions: S, session_ttl: Duration) -> Self {
        Self {
            users,
            sessions,
            session_ttl,
        }
    }

    /// Register a password account. Inputs are expected to be validated.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> BuglineResult<User> {
        let email = email.trim().to_lowercase();
        if self.users.get_by_email(&email).await?.is_some() {
            tracing::warn!(%email, "sign-up with existing email");
            return Err(BuglineError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let user = self
            .users
            .create(NewUser {
                name: Some(name.trim().to_string()),
                email,
                image: None,
                password_hash: Some(hash_password(password)?),
            })
            .await
            .map_err(|e| match e {
                BuglineError::Conflict(_) => BuglineError::Conflict(EMAIL_TAKEN.to_string()),
                other => other,
            })?;

        tracing::info!(user_id = %user.id, "user signed up");
        Ok(user)
    }

    /// Check credentials and open a session. Every failure looks the same
    /// to the caller.
    pub async fn sign_in(&self, email: &str, password: &str) -> BuglineResult<SessionResponse> {
        let denied = || BuglineError::Unauthorized(INVALID_CREDENTIALS.to_string());

        let user = self
            .users
            .get_by_email(email.trim())
            .await?
            .ok_or_else(denied)?;
        let Some(hash) = user.password_hash.as_deref() else {
            tracing::warn!(user_id = %user.id, "password sign-in for account without password");
            return Err(denied());
        };
        if !verify_password(password, hash)? {
            tracing::warn!(user_id = %user.id, "sign-in with wrong password");
            return Err(denied());
        }

        let now = Utc::now();
        // A failed sweep of expired sessions does not block the sign-in.
        if let Err(e) = self.sessions.purge_expired(now).await {
            tracing::warn!(error = %e, "could not purge expired sessions");
        }

        let token = issue_token();
        let session = self
            .sessions
            .create(Session {
                id: Uuid::new_v4(),
                user_id: user.id,
                token_hash: token_digest(&token),
                expires_at: now + self.session_ttl,
                created_at: now,
            })
            .await?;

        tracing::info!(user_id = %user.id, "session opened");
        Ok(SessionResponse {
            token,
            expires_at: session.expires_at,
            user,
        })
    }

    pub async fn sign_out(&self, user_id: Uuid, token: &str) -> BuglineResult<()> {
        let removed = self.sessions.delete(&token_digest(token)).await?;
        tracing::info!(%user_id, removed, "session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::resolver::{IdentityResolver, SessionResolver};
    use crate::test_support::MemoryStore;

    fn service(store: &MemoryStore) -> AuthService<MemoryStore, MemoryStore> {
        AuthService::new(store.clone(), store.clone(), Duration::hours(1))
    }

    #[tokio::test]
    async fn sign_up_then_sign_in_resolves_session() {
        let store = MemoryStore::new();
        let auth = service(&store);

        let user = auth
            .sign_up("Ada", "Ada@Example.com", "password1")
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert!(user.password_hash.as_deref().unwrap().starts_with("$argon2id$"));

        let session = auth.sign_in("ada@example.com", "password1").await.unwrap();
        assert_eq!(session.user.id, user.id);

        let resolver = SessionResolver::new(store.clone());
        let resolved = resolver.resolve(&session.token).await.unwrap().unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn sign_in_sweeps_expired_sessions() {
        let store = MemoryStore::new();
        let auth = service(&store);
        let user = auth
            .sign_up("Ada", "ada@example.com", "password1")
            .await
            .unwrap();

        let expired_at = Utc::now() - Duration::hours(2);
        store.seed_session(Session {
            id: Uuid::new_v4(),
            user_id: user.id,
            token_hash: token_digest("stale"),
            expires_at: expired_at,
            created_at: expired_at - Duration::hours(1),
        });

        auth.sign_in("ada@example.com", "password1").await.unwrap();

        let before_expiry = expired_at - Duration::minutes(1);
        let stale = store
            .find_user(&token_digest("stale"), before_expiry)
            .await
            .unwrap();
        assert!(stale.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let store = MemoryStore::new();
        let auth = service(&store);
        auth.sign_up("Ada", "ada@example.com", "password1")
            .await
            .unwrap();

        let err = auth
            .sign_up("Other", "ada@example.com", "password2")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "conflict");
        assert_eq!(err.message(), "Email already exists");
    }

    #[tokio::test]
    async fn bad_credentials_are_indistinguishable() {
        let store = MemoryStore::new();
        let auth = service(&store);
        auth.sign_up("Ada", "ada@example.com", "password1")
            .await
            .unwrap();
        let oauth_only = store.seed_user("oauth@example.com");

        for (email, password) in [
            ("ada@example.com", "password2"),
            ("nobody@example.com", "password1"),
            (oauth_only.email.as_str(), "password1"),
        ] {
            let err = auth.sign_in(email, password).await.unwrap_err();
            assert_eq!(err.kind(), "unauthorized");
            assert_eq!(err.message(), "Invalid credentials");
        }
    }

    #[tokio::test]
    async fn sign_out_invalidates_token() {
        let store = MemoryStore::new();
        let auth = service(&store);
        let user = auth
            .sign_up("Ada", "ada@example.com", "password1")
            .await
            .unwrap();
        let session = auth.sign_in("ada@example.com", "password1").await.unwrap();

        auth.sign_out(user.id, &session.token).await.unwrap();

        let resolver = SessionResolver::new(store.clone());
        assert!(resolver.resolve(&session.token).await.unwrap().is_none());
    }
}
