use std::collections::BTreeMap;

use bugline_common::error::BuglineResult;
use bugline_db::bugs::models::{BugStatus, Priority};
use bugline_db::dashboard::repositories::DashboardRepository;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub bugs_by_status: BTreeMap<&'static str, i64>,
    pub bugs_by_priority: BTreeMap<&'static str, i64>,
    pub total_bugs: i64,
    pub total_projects: i64,
    pub total_users: i64,
}

pub struct DashboardService<D: DashboardRepository> {
    dashboard: D,
}

impl<D: DashboardRepository> DashboardService<D> {
    pub fn new(dashboard: D) -> Self {
        Self { dashboard }
    }

    /// Every status and priority is present, zero when no bug has it.
    pub async fn stats(&self) -> BuglineResult<DashboardStats> {
        let counts = self.dashboard.counts().await?;

        let bugs_by_status: BTreeMap<_, _> = BugStatus::ALL
            .iter()
            .map(|status| {
                let n = counts
                    .by_status
                    .iter()
                    .filter(|(s, _)| s == status)
                    .map(|(_, n)| n)
                    .sum::<i64>();
                (status.as_str(), n)
            })
            .collect();
        let bugs_by_priority: BTreeMap<_, _> = Priority::ALL
            .iter()
            .map(|priority| {
                let n = counts
                    .by_priority
                    .iter()
                    .filter(|(p, _)| p == priority)
                    .map(|(_, n)| n)
                    .sum::<i64>();
                (priority.as_str(), n)
            })
            .collect();

        let stats = DashboardStats {
            total_bugs: bugs_by_status.values().sum(),
            bugs_by_status,
            bugs_by_priority,
            total_projects: counts.total_projects,
            total_users: counts.total_users,
        };
        tracing::debug!(
            total_bugs = stats.total_bugs,
            total_projects = stats.total_projects,
            "computed dashboard stats"
        );
        Ok(stats)
    }
}
