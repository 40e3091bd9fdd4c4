use async_trait::async_trait;

use crate::dashboard::models::DashboardCounts;
use bugline_common::error::BuglineResult;

#[async_trait]
pub trait DashboardRepository: Send + Sync {
    async fn counts(&self) -> BuglineResult<DashboardCounts>;
}
