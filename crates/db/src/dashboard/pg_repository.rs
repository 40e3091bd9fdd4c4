use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::bugs::models::{BugStatus, Priority};
use crate::dashboard::models::DashboardCounts;
use crate::dashboard::repositories::DashboardRepository;
use crate::map_db_error;
use bugline_common::error::{BuglineError, BuglineResult};

#[derive(Clone)]
pub struct PgDashboardRepository {
    pool: PgPool,
}

impl PgDashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn grouped(&self, column: &str) -> BuglineResult<Vec<(String, i64)>> {
        let rows = sqlx::query(&format!(
            "select {column} as key, count(*) as cnt from bugs group by {column}"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .iter()
            .map(|r| (r.get::<String, _>("key"), r.get::<i64, _>("cnt")))
            .collect())
    }

    async fn count(&self, table: &str) -> BuglineResult<i64> {
        sqlx::query_scalar::<_, i64>(&format!("select count(*) from {table}"))
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}

#[async_trait]
impl DashboardRepository for PgDashboardRepository {
    async fn counts(&self) -> BuglineResult<DashboardCounts> {
        let (statuses, priorities, total_projects, total_users) = tokio::try_join!(
            self.grouped("status"),
            self.grouped("priority"),
            self.count("projects"),
            self.count("users"),
        )?;

        let by_status = statuses
            .into_iter()
            .map(|(k, n)| Ok((BugStatus::from_str(&k).map_err(BuglineError::Internal)?, n)))
            .collect::<BuglineResult<Vec<_>>>()?;
        let by_priority = priorities
            .into_iter()
            .map(|(k, n)| Ok((Priority::from_str(&k).map_err(BuglineError::Internal)?, n)))
            .collect::<BuglineResult<Vec<_>>>()?;

        Ok(DashboardCounts {
            by_status,
            by_priority,
            total_projects,
            total_users,
        })
    }
}
