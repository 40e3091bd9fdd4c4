//! Project and membership operations.
//!
//! Each mutation checks the caller's membership first so denials are
//! reported precisely, then writes through a guarded statement. When the
//! guarded write comes back empty the state changed in between, and the
//! outcome is re-derived from what is stored now.

use bugline_access::rules::{can_access_project, can_delete_project, can_manage_members};
use bugline_common::error::{BuglineError, BuglineResult};
use bugline_db::guard::MutationGuard;
use bugline_db::projects::models::{
    MemberRole, NewProject, Project, ProjectMember, ProjectOverview, ProjectPatch, ProjectScope,
    ProjectUser,
};
use bugline_db::projects::repositories::ProjectRepository;
use uuid::Uuid;

pub(crate) const NOT_MEMBER: &str = "You are not a member of this project";
const NOT_ADMIN: &str = "Only project admins can perform this action";
const ALREADY_MEMBER: &str = "User is already a member of this project";

fn not_a_member(user_id: Uuid) -> BuglineError {
    BuglineError::NotFound(format!("user {user_id} is not a member of this project"))
}

fn project_not_found(id: Uuid) -> BuglineError {
    BuglineError::NotFound(format!("project not found: {id}"))
}

pub struct ProjectService<P: ProjectRepository> {
    projects: P,
}

impl<P: ProjectRepository> ProjectService<P> {
    pub fn new(projects: P) -> Self {
        Self { projects }
    }

    /// Load the project's membership, failing with `NotFound` when the
    /// project does not exist.
    async fn members_of(&self, project_id: Uuid) -> BuglineResult<Vec<ProjectMember>> {
        self.projects
            .get_by_id(project_id)
            .await?
            .ok_or_else(|| project_not_found(project_id))?;
        self.projects.list_members(project_id).await
    }

    /// Outcome for a guarded write that touched nothing.
    async fn missed(&self, project_id: Uuid, denial: &str) -> BuglineError {
        match self.projects.get_by_id(project_id).await {
            Ok(Some(_)) => BuglineError::Unauthorized(denial.to_string()),
            Ok(None) => project_not_found(project_id),
            Err(e) => e,
        }
    }

    pub async fn create_project(
        &self,
        actor: Uuid,
        name: String,
        description: Option<String>,
        member_ids: Vec<Uuid>,
    ) -> BuglineResult<(Project, Vec<ProjectMember>)> {
        let (project, members) = self
            .projects
            .create_with_members(NewProject {
                name,
                description,
                creator_id: actor,
                member_ids,
            })
            .await?;

        tracing::info!(
            project_id = %project.id,
            user_id = %actor,
            members = members.len(),
            "project created"
        );
        Ok((project, members))
    }

    pub async fn update_project(
        &self,
        actor: Uuid,
        project_id: Uuid,
        patch: ProjectPatch,
    ) -> BuglineResult<Project> {
        let members = self.members_of(project_id).await?;
        if !can_access_project(actor, &members) {
            tracing::warn!(%project_id, user_id = %actor, "project update denied");
            return Err(BuglineError::Unauthorized(NOT_MEMBER.to_string()));
        }

        match self
            .projects
            .update(project_id, patch, MutationGuard::Member(actor))
            .await?
        {
            Some(project) => {
                tracing::info!(%project_id, user_id = %actor, "project updated");
                Ok(project)
            }
            None => Err(self.missed(project_id, NOT_MEMBER).await),
        }
    }

    pub async fn delete_project(&self, actor: Uuid, project_id: Uuid) -> BuglineResult<()> {
        let members = self.members_of(project_id).await?;
        if !can_delete_project(actor, &members) {
            tracing::warn!(%project_id, user_id = %actor, "project delete denied");
            return Err(BuglineError::Unauthorized(NOT_ADMIN.to_string()));
        }

        if self
            .projects
            .delete(project_id, MutationGuard::Admin(actor))
            .await?
        {
            tracing::info!(%project_id, user_id = %actor, "project deleted");
            Ok(())
        } else {
            Err(self.missed(project_id, NOT_ADMIN).await)
        }
    }

    /// Adding an existing member is declined with `Conflict` and changes
    /// nothing.
    pub async fn add_member(
        &self,
        actor: Uuid,
        project_id: Uuid,
        user_id: Uuid,
    ) -> BuglineResult<ProjectMember> {
        let members = self.members_of(project_id).await?;
        if !can_manage_members(actor, &members) {
            tracing::warn!(%project_id, user_id = %actor, "member add denied");
            return Err(BuglineError::Unauthorized(NOT_ADMIN.to_string()));
        }
        if can_access_project(user_id, &members) {
            tracing::info!(%project_id, member_id = %user_id, "member add declined, already a member");
            return Err(BuglineError::Conflict(ALREADY_MEMBER.to_string()));
        }

        match self
            .projects
            .add_member(
                project_id,
                user_id,
                MemberRole::Member,
                MutationGuard::Admin(actor),
            )
            .await?
        {
            Some(member) => {
                tracing::info!(%project_id, user_id = %actor, member_id = %user_id, "member added");
                Ok(member)
            }
            None => {
                let members = self.projects.list_members(project_id).await?;
                if can_access_project(user_id, &members) {
                    Err(BuglineError::Conflict(ALREADY_MEMBER.to_string()))
                } else {
                    Err(self.missed(project_id, NOT_ADMIN).await)
                }
            }
        }
    }

    /// Any member, including the caller or the last admin, may be removed
    /// by an admin.
    pub async fn remove_member(
        &self,
        actor: Uuid,
        project_id: Uuid,
        user_id: Uuid,
    ) -> BuglineResult<()> {
        let members = self.members_of(project_id).await?;
        if !can_manage_members(actor, &members) {
            tracing::warn!(%project_id, user_id = %actor, "member removal denied");
            return Err(BuglineError::Unauthorized(NOT_ADMIN.to_string()));
        }
        if !can_access_project(user_id, &members) {
            return Err(not_a_member(user_id));
        }

        if self
            .projects
            .remove_member(project_id, user_id, MutationGuard::Admin(actor))
            .await?
        {
            tracing::info!(%project_id, user_id = %actor, member_id = %user_id, "member removed");
            Ok(())
        } else {
            let members = self.projects.list_members(project_id).await?;
            if can_manage_members(actor, &members) && !can_access_project(user_id, &members) {
                Err(not_a_member(user_id))
            } else {
                Err(self.missed(project_id, NOT_ADMIN).await)
            }
        }
    }

    /// Open to any signed-in user.
    pub async fn project_users(&self, project_id: Uuid) -> BuglineResult<Vec<ProjectUser>> {
        self.projects
            .get_by_id(project_id)
            .await?
            .ok_or_else(|| project_not_found(project_id))?;
        let users = self.projects.list_users(project_id).await?;
        tracing::debug!(%project_id, count = users.len(), "listed project users");
        Ok(users)
    }

    pub async fn get_project(&self, project_id: Uuid) -> BuglineResult<ProjectOverview> {
        self.projects
            .get_overview(project_id)
            .await?
            .ok_or_else(|| project_not_found(project_id))
    }

    pub async fn list_projects(&self) -> BuglineResult<Vec<ProjectOverview>> {
        let projects = self.projects.list_overviews(ProjectScope::All).await?;
        tracing::debug!(count = projects.len(), "listed projects");
        Ok(projects)
    }

    /// Projects the user created or belongs to.
    pub async fn list_user_projects(&self, user_id: Uuid) -> BuglineResult<Vec<ProjectOverview>> {
        let projects = self
            .projects
            .list_overviews(ProjectScope::VisibleTo(user_id))
            .await?;
        tracing::debug!(%user_id, count = projects.len(), "listed user projects");
        Ok(projects)
    }
}
