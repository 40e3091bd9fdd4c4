use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::projects::models::ProjectMember;
use crate::users::models::UserSummary;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BugStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl BugStatus {
    pub const ALL: [BugStatus; 4] = [
        Self::Open,
        Self::InProgress,
        Self::Resolved,
        Self::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
        }
    }
}

impl FromStr for BugStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "OPEN" => Ok(Self::Open),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "RESOLVED" => Ok(Self::Resolved),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(format!("unknown bug status: {value}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(format!("unknown priority: {value}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bug {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: BugStatus,
    pub priority: Priority,
    /// Owning project; never changes after creation.
    pub project_id: Uuid,
    pub reporter_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBug {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub project_id: Uuid,
    pub reporter_id: Uuid,
    pub assignee_id: Option<Uuid>,
}

/// Partial bug update. `assignee_id: None` leaves the assignee untouched;
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default)]
pub struct BugPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<BugStatus>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<Uuid>,
}

/// A bug together with the membership of its owning project.
#[derive(Debug, Clone)]
pub struct ScopedBug {
    pub bug: Bug,
    pub members: Vec<ProjectMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugDetail {
    #[serde(flatten)]
    pub bug: Bug,
    pub project: ProjectRef,
    pub reporter: UserSummary,
    pub assignee: Option<UserSummary>,
    pub labels: Vec<Label>,
    pub comments_count: i64,
}

#[derive(Debug, Clone, Copy)]
pub enum BugScope {
    All,
    /// Bugs the user reported or is assigned to.
    InvolvingUser(Uuid),
}
