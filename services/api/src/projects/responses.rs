use bugline_access::progress::{derive_project_status, project_progress, ProjectStatus};
use bugline_db::bugs::models::Bug;
use bugline_db::projects::models::{Project, ProjectMember, ProjectOverview};
use bugline_db::users::models::UserSummary;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    #[serde(flatten)]
    pub project: Project,
    pub creator: UserSummary,
    pub members_count: i64,
    pub bugs_count: usize,
    pub status: ProjectStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bugs: Option<Vec<Bug>>,
}

impl ProjectResponse {
    /// Status and progress are derived from the bugs on every call.
    fn build(overview: ProjectOverview, include_bugs: bool) -> Self {
        let status = derive_project_status(&overview.bugs);
        let progress = project_progress(&overview.bugs);
        Self {
            project: overview.project,
            creator: overview.creator,
            members_count: overview.members_count,
            bugs_count: overview.bugs.len(),
            status,
            progress,
            bugs: include_bugs.then_some(overview.bugs),
        }
    }

    pub fn detail(overview: ProjectOverview) -> Self {
        Self::build(overview, false)
    }

    pub fn listing(overview: ProjectOverview) -> Self {
        Self::build(overview, true)
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedProjectResponse {
    #[serde(flatten)]
    pub project: Project,
    pub members: Vec<ProjectMember>,
}
