use async_trait::async_trait;
use uuid::Uuid;

use crate::guard::MutationGuard;
use crate::projects::models::{
    MemberRole, NewProject, Project, ProjectMember, ProjectOverview, ProjectPatch, ProjectScope,
    ProjectUser,
};
use bugline_common::error::BuglineResult;

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert the project, its creator as admin and the extra members in one
    /// transaction. Duplicate member ids are ignored.
    async fn create_with_members(
        &self,
        project: NewProject,
    ) -> BuglineResult<(Project, Vec<ProjectMember>)>;

    async fn get_by_id(&self, id: Uuid) -> BuglineResult<Option<Project>>;
    async fn list_members(&self, project_id: Uuid) -> BuglineResult<Vec<ProjectMember>>;
    async fn list_users(&self, project_id: Uuid) -> BuglineResult<Vec<ProjectUser>>;
    async fn get_overview(&self, id: Uuid) -> BuglineResult<Option<ProjectOverview>>;
    async fn list_overviews(&self, scope: ProjectScope) -> BuglineResult<Vec<ProjectOverview>>;

    async fn update(
        &self,
        id: Uuid,
        patch: ProjectPatch,
        guard: MutationGuard,
    ) -> BuglineResult<Option<Project>>;

    async fn delete(&self, id: Uuid, guard: MutationGuard) -> BuglineResult<bool>;

    /// `None` when the guard fails or the user is already a member.
    async fn add_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
        guard: MutationGuard,
    ) -> BuglineResult<Option<ProjectMember>>;

    async fn remove_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        guard: MutationGuard,
    ) -> BuglineResult<bool>;
}
