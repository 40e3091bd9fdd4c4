use serde::{Deserialize, Serialize};

use crate::bugs::models::{BugStatus, Priority};

/// Raw grouped counts; statuses or priorities with no bugs are absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardCounts {
    pub by_status: Vec<(BugStatus, i64)>,
    pub by_priority: Vec<(Priority, i64)>,
    pub total_projects: i64,
    pub total_users: i64,
}
