//! Bug operations. Membership in the owning project is the only gate;
//! reporters, assignees and admins get no extra rights.

use bugline_access::rules::can_access_project;
use bugline_common::error::{BuglineError, BuglineResult};
use bugline_db::bugs::models::{Bug, BugDetail, BugPatch, BugScope, NewBug, Priority};
use bugline_db::bugs::repositories::BugRepository;
use bugline_db::guard::MutationGuard;
use bugline_db::projects::repositories::ProjectRepository;
use uuid::Uuid;

use crate::projects::service::NOT_MEMBER;

pub(crate) fn bug_not_found(id: Uuid) -> BuglineError {
    BuglineError::NotFound(format!("bug not found: {id}"))
}

/// Validated input for filing a bug.
#[derive(Debug, Clone)]
pub struct BugInput {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub assignee_id: Option<Uuid>,
}

pub struct BugService<B: BugRepository, P: ProjectRepository> {
    bugs: B,
    projects: P,
}

impl<B: BugRepository, P: ProjectRepository> BugService<B, P> {
    pub fn new(bugs: B, projects: P) -> Self {
        Self { bugs, projects }
    }

    async fn missed(&self, bug_id: Uuid) -> BuglineError {
        match self.bugs.get_by_id(bug_id).await {
            Ok(Some(_)) => BuglineError::Unauthorized(NOT_MEMBER.to_string()),
            Ok(None) => bug_not_found(bug_id),
            Err(e) => e,
        }
    }

    /// The caller is always the reporter.
    pub async fn create_bug(
        &self,
        actor: Uuid,
        project_id: Uuid,
        input: BugInput,
    ) -> BuglineResult<Bug> {
        self.projects
            .get_by_id(project_id)
            .await?
            .ok_or_else(|| BuglineError::NotFound(format!("project not found: {project_id}")))?;
        let members = self.projects.list_members(project_id).await?;
        if !can_access_project(actor, &members) {
            tracing::warn!(%project_id, user_id = %actor, "bug creation denied");
            return Err(BuglineError::Unauthorized(NOT_MEMBER.to_string()));
        }

        let created = self
            .bugs
            .create(
                NewBug {
                    title: input.title,
                    description: input.description,
                    priority: input.priority,
                    project_id,
                    reporter_id: actor,
                    assignee_id: input.assignee_id,
                },
                MutationGuard::Member(actor),
            )
            .await?;

        match created {
            Some(bug) => {
                tracing::info!(%project_id, bug_id = %bug.id, user_id = %actor, "bug created");
                Ok(bug)
            }
            None => match self.projects.get_by_id(project_id).await? {
                Some(_) => Err(BuglineError::Unauthorized(NOT_MEMBER.to_string())),
                None => Err(BuglineError::NotFound(format!(
                    "project not found: {project_id}"
                ))),
            },
        }
    }

    /// Partial update. An absent assignee leaves the current one in place.
    pub async fn update_bug(&self, actor: Uuid, bug_id: Uuid, patch: BugPatch) -> BuglineResult<Bug> {
        let scoped = self
            .bugs
            .get_scoped(bug_id)
            .await?
            .ok_or_else(|| bug_not_found(bug_id))?;
        if !can_access_project(actor, &scoped.members) {
            tracing::warn!(%bug_id, user_id = %actor, "bug update denied");
            return Err(BuglineError::Unauthorized(NOT_MEMBER.to_string()));
        }

        match self
            .bugs
            .update(bug_id, patch, MutationGuard::Member(actor))
            .await?
        {
            Some(bug) => {
                tracing::info!(project_id = %bug.project_id, %bug_id, user_id = %actor, "bug updated");
                Ok(bug)
            }
            None => Err(self.missed(bug_id).await),
        }
    }

    pub async fn delete_bug(&self, actor: Uuid, bug_id: Uuid) -> BuglineResult<()> {
        let scoped = self
            .bugs
            .get_scoped(bug_id)
            .await?
            .ok_or_else(|| bug_not_found(bug_id))?;
        if !can_access_project(actor, &scoped.members) {
            tracing::warn!(%bug_id, user_id = %actor, "bug delete denied");
            return Err(BuglineError::Unauthorized(NOT_MEMBER.to_string()));
        }

        if self
            .bugs
            .delete(bug_id, MutationGuard::Member(actor))
            .await?
        {
            tracing::info!(project_id = %scoped.bug.project_id, %bug_id, user_id = %actor, "bug deleted");
            Ok(())
        } else {
            Err(self.missed(bug_id).await)
        }
    }

    pub async fn get_bug(&self, bug_id: Uuid) -> BuglineResult<BugDetail> {
        self.bugs
            .get_detail(bug_id)
            .await?
            .ok_or_else(|| bug_not_found(bug_id))
    }

    pub async fn list_bugs(&self) -> BuglineResult<Vec<BugDetail>> {
        let bugs = self.bugs.list_details(BugScope::All).await?;
        tracing::debug!(count = bugs.len(), "listed bugs");
        Ok(bugs)
    }

    /// Bugs the user reported or is assigned to.
    pub async fn list_user_bugs(&self, user_id: Uuid) -> BuglineResult<Vec<BugDetail>> {
        let bugs = self
            .bugs
            .list_details(BugScope::InvolvingUser(user_id))
            .await?;
        tracing::debug!(%user_id, count = bugs.len(), "listed user bugs");
        Ok(bugs)
    }
}
