use bugline_db::bugs::models::{Bug, BugStatus};
use serde::{Deserialize, Serialize};

/// Coarse project state shown on project cards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Inactive,
    Active,
    InProgress,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Active => "active",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

/// Percentage of bugs no longer OPEN, rounded half away from zero.
/// Zero when the project has no bugs.
pub fn project_progress(bugs: &[Bug]) -> u8 {
    let total = bugs.len();
    if total == 0 {
        return 0;
    }
    let open = bugs.iter().filter(|b| b.status == BugStatus::Open).count();
    (((total - open) as f64 / total as f64) * 100.0).round() as u8
}

/// `inactive` without bugs, `active` while any bug is OPEN, `completed`
/// once every bug is CLOSED, `in_progress` otherwise.
pub fn derive_project_status(bugs: &[Bug]) -> ProjectStatus {
    if bugs.is_empty() {
        ProjectStatus::Inactive
    } else if bugs.iter().any(|b| b.status == BugStatus::Open) {
        ProjectStatus::Active
    } else if bugs.iter().all(|b| b.status == BugStatus::Closed) {
        ProjectStatus::Completed
    } else {
        ProjectStatus::InProgress
    }
}
