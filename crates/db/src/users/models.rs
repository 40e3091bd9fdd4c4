use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    /// Argon2 PHC string; `None` for accounts created through an OAuth provider.
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub role: Option<String>,
    pub email_verified: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            image: self.image.clone(),
        }
    }
}

/// Public projection of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub role: Option<String>,
}
