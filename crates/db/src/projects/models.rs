use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bugs::models::Bug;
use crate::users::models::UserSummary;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(format!("unknown member role: {value}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership row keyed by `(user_id, project_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectMember {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub role: MemberRole,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub creator_id: Uuid,
    /// Additional members, inserted with the `member` role. The creator is
    /// always inserted as `admin` regardless of this list.
    pub member_ids: Vec<Uuid>,
}

impl NewProject {
    /// Extra member ids with the creator and repeats removed, order kept.
    pub fn additional_member_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = Vec::with_capacity(self.member_ids.len());
        for id in &self.member_ids {
            if *id != self.creator_id && !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }
}

/// Partial project update. `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

/// A project user as listed on the project page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    pub role: MemberRole,
}

/// A project loaded with what list and detail views derive from.
#[derive(Debug, Clone)]
pub struct ProjectOverview {
    pub project: Project,
    pub creator: UserSummary,
    pub members_count: i64,
    pub bugs: Vec<Bug>,
}

#[derive(Debug, Clone, Copy)]
pub enum ProjectScope {
    All,
    /// Projects the user created or is a member of.
    VisibleTo(Uuid),
}
