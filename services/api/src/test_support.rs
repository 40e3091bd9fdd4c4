//! In-memory repositories for service tests.
//!
//! Guarded writes evaluate the same predicate as the Postgres statements,
//! via `bugline_access::rules::guard_permits`, so authorization outcomes
//! match the database implementations.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bugline_access::rules::guard_permits;
use bugline_common::error::{BuglineError, BuglineResult};
use bugline_db::bugs::models::{
    Bug, BugDetail, BugPatch, BugScope, BugStatus, NewBug, ProjectRef, ScopedBug,
};
use bugline_db::bugs::repositories::BugRepository;
use bugline_db::comments::models::{Comment, CommentAuthor, CommentWithAuthor, NewComment};
use bugline_db::comments::repositories::CommentRepository;
use bugline_db::dashboard::models::DashboardCounts;
use bugline_db::dashboard::repositories::DashboardRepository;
use bugline_db::guard::MutationGuard;
use bugline_db::projects::models::{
    MemberRole, NewProject, Project, ProjectMember, ProjectOverview, ProjectPatch, ProjectScope,
    ProjectUser,
};
use bugline_db::projects::repositories::ProjectRepository;
use bugline_db::sessions::models::Session;
use bugline_db::sessions::repositories::SessionRepository;
use bugline_db::users::models::{NewUser, ProfileUpdate, User, UserSummary};
use bugline_db::users::repositories::UserRepository;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    sessions: Vec<Session>,
    projects: Vec<Project>,
    members: Vec<ProjectMember>,
    bugs: Vec<Bug>,
    comments: Vec<Comment>,
    /// Memberships dropped right before the next guarded write.
    pending_revocations: Vec<(Uuid, Uuid)>,
}

fn missing(what: &str, id: Uuid) -> BuglineError {
    BuglineError::NotFound(format!("referenced record does not exist ({what} {id})"))
}

impl Tables {
    fn members_of(&self, project_id: Uuid) -> Vec<ProjectMember> {
        self.members
            .iter()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect()
    }

    fn apply_revocations(&mut self) {
        for (user_id, project_id) in std::mem::take(&mut self.pending_revocations) {
            self.members
                .retain(|m| !(m.user_id == user_id && m.project_id == project_id));
        }
    }

    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn require_user(&self, id: Uuid) -> BuglineResult<()> {
        self.user(id).map(|_| ()).ok_or_else(|| missing("user", id))
    }

    fn summary(&self, id: Uuid) -> BuglineResult<UserSummary> {
        self.user(id)
            .map(User::summary)
            .ok_or_else(|| missing("user", id))
    }

    fn detail(&self, bug: &Bug) -> BuglineResult<BugDetail> {
        let project = self
            .projects
            .iter()
            .find(|p| p.id == bug.project_id)
            .ok_or_else(|| missing("project", bug.project_id))?;
        Ok(BugDetail {
            bug: bug.clone(),
            project: ProjectRef {
                id: project.id,
                name: project.name.clone(),
                description: project.description.clone(),
            },
            reporter: self.summary(bug.reporter_id)?,
            assignee: bug.assignee_id.map(|id| self.summary(id)).transpose()?,
            labels: Vec::new(),
            comments_count: self.comments.iter().filter(|c| c.bug_id == bug.id).count() as i64,
        })
    }

    fn overview(&self, project: &Project) -> BuglineResult<ProjectOverview> {
        let mut bugs: Vec<Bug> = self
            .bugs
            .iter()
            .filter(|b| b.project_id == project.id)
            .cloned()
            .collect();
        bugs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(ProjectOverview {
            project: project.clone(),
            creator: self.summary(project.creator_id)?,
            members_count: self.members_of(project.id).len() as i64,
            bugs,
        })
    }

    fn drop_bug(&mut self, bug_id: Uuid) {
        self.bugs.retain(|b| b.id != bug_id);
        self.comments.retain(|c| c.bug_id != bug_id);
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    /// A user without a password, as created through an OAuth provider.
    pub fn seed_user(&self, email: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: email.split('@').next().map(str::to_string),
            email: email.to_string(),
            image: None,
            password_hash: None,
            role: None,
            email_verified: None,
            created_at: now,
            updated_at: now,
        };
        self.lock().users.push(user.clone());
        user
    }

    pub fn seed_session(&self, session: Session) {
        self.lock().sessions.push(session);
    }

    /// Simulate a concurrent removal landing between a service's check and
    /// its guarded write.
    pub fn revoke_before_write(&self, user_id: Uuid, project_id: Uuid) {
        self.lock().pending_revocations.push((user_id, project_id));
    }
}

// ── Users / sessions ────────────────────────────────────────────────

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_by_id(&self, id: Uuid) -> BuglineResult<Option<User>> {
        Ok(self.lock().user(id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> BuglineResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> BuglineResult<User> {
        let mut t = self.lock();
        if t.users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(BuglineError::Conflict("duplicate record (users_email_key)".into()));
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            image: user.image,
            password_hash: user.password_hash,
            role: None,
            email_verified: None,
            created_at: now,
            updated_at: now,
        };
        t.users.push(created.clone());
        Ok(created)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> BuglineResult<Option<User>> {
        let mut t = self.lock();
        let Some(user) = t.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            user.name = Some(name);
        }
        if let Some(role) = update.role {
            user.role = Some(role);
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn list_summaries(&self) -> BuglineResult<Vec<UserSummary>> {
        Ok(self.lock().users.iter().map(User::summary).collect())
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn create(&self, session: Session) -> BuglineResult<Session> {
        let mut t = self.lock();
        t.require_user(session.user_id)?;
        t.sessions.push(session.clone());
        Ok(session)
    }

    async fn find_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> BuglineResult<Option<User>> {
        let t = self.lock();
        Ok(t.sessions
            .iter()
            .find(|s| s.token_hash == token_hash && s.expires_at > now)
            .and_then(|s| t.user(s.user_id).cloned()))
    }

    async fn delete(&self, token_hash: &str) -> BuglineResult<bool> {
        let mut t = self.lock();
        let before = t.sessions.len();
        t.sessions.retain(|s| s.token_hash != token_hash);
        Ok(t.sessions.len() < before)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> BuglineResult<u64> {
        let mut t = self.lock();
        let before = t.sessions.len();
        t.sessions.retain(|s| s.expires_at > now);
        Ok((before - t.sessions.len()) as u64)
    }
}

// ── Projects ────────────────────────────────────────────────────────

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn create_with_members(
        &self,
        project: NewProject,
    ) -> BuglineResult<(Project, Vec<ProjectMember>)> {
        let mut t = self.lock();
        let extra = project.additional_member_ids();
        t.require_user(project.creator_id)?;
        for id in &extra {
            t.require_user(*id)?;
        }

        let now = Utc::now();
        let created = Project {
            id: Uuid::new_v4(),
            name: project.name,
            description: project.description,
            creator_id: project.creator_id,
            created_at: now,
            updated_at: now,
        };
        let mut members = vec![ProjectMember {
            user_id: created.creator_id,
            project_id: created.id,
            role: MemberRole::Admin,
        }];
        members.extend(extra.into_iter().map(|user_id| ProjectMember {
            user_id,
            project_id: created.id,
            role: MemberRole::Member,
        }));

        t.projects.push(created.clone());
        t.members.extend(members.iter().cloned());
        Ok((created, members))
    }

    async fn get_by_id(&self, id: Uuid) -> BuglineResult<Option<Project>> {
        Ok(self.lock().projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_members(&self, project_id: Uuid) -> BuglineResult<Vec<ProjectMember>> {
        Ok(self.lock().members_of(project_id))
    }

    async fn list_users(&self, project_id: Uuid) -> BuglineResult<Vec<ProjectUser>> {
        let t = self.lock();
        Ok(t.members_of(project_id)
            .into_iter()
            .filter_map(|m| {
                t.user(m.user_id).map(|u| ProjectUser {
                    id: u.id,
                    name: u.name.clone(),
                    email: u.email.clone(),
                    image: u.image.clone(),
                    role: m.role,
                })
            })
            .collect())
    }

    async fn get_overview(&self, id: Uuid) -> BuglineResult<Option<ProjectOverview>> {
        let t = self.lock();
        t.projects
            .iter()
            .find(|p| p.id == id)
            .map(|p| t.overview(p))
            .transpose()
    }

    async fn list_overviews(&self, scope: ProjectScope) -> BuglineResult<Vec<ProjectOverview>> {
        let t = self.lock();
        let mut projects: Vec<&Project> = t
            .projects
            .iter()
            .filter(|p| match scope {
                ProjectScope::All => true,
                ProjectScope::VisibleTo(user_id) => {
                    p.creator_id == user_id
                        || t.members
                            .iter()
                            .any(|m| m.project_id == p.id && m.user_id == user_id)
                }
            })
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        projects.into_iter().map(|p| t.overview(p)).collect()
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ProjectPatch,
        guard: MutationGuard,
    ) -> BuglineResult<Option<Project>> {
        let mut t = self.lock();
        t.apply_revocations();
        let members = t.members_of(id);
        if !guard_permits(guard, &members, None) {
            return Ok(None);
        }
        let Some(project) = t.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            project.name = name;
        }
        if let Some(description) = patch.description {
            project.description = description;
        }
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete(&self, id: Uuid, guard: MutationGuard) -> BuglineResult<bool> {
        let mut t = self.lock();
        t.apply_revocations();
        let members = t.members_of(id);
        if !guard_permits(guard, &members, None) || !t.projects.iter().any(|p| p.id == id) {
            return Ok(false);
        }
        t.projects.retain(|p| p.id != id);
        t.members.retain(|m| m.project_id != id);
        let bug_ids: Vec<Uuid> = t
            .bugs
            .iter()
            .filter(|b| b.project_id == id)
            .map(|b| b.id)
            .collect();
        for bug_id in bug_ids {
            t.drop_bug(bug_id);
        }
        Ok(true)
    }

    async fn add_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
        guard: MutationGuard,
    ) -> BuglineResult<Option<ProjectMember>> {
        let mut t = self.lock();
        t.apply_revocations();
        let members = t.members_of(project_id);
        if !guard_permits(guard, &members, None) {
            return Ok(None);
        }
        t.require_user(user_id)?;
        if members.iter().any(|m| m.user_id == user_id) {
            return Ok(None);
        }
        let member = ProjectMember {
            user_id,
            project_id,
            role,
        };
        t.members.push(member.clone());
        Ok(Some(member))
    }

    async fn remove_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        guard: MutationGuard,
    ) -> BuglineResult<bool> {
        let mut t = self.lock();
        t.apply_revocations();
        let members = t.members_of(project_id);
        if !guard_permits(guard, &members, None) {
            return Ok(false);
        }
        let before = t.members.len();
        t.members
            .retain(|m| !(m.project_id == project_id && m.user_id == user_id));
        Ok(t.members.len() < before)
    }
}

// ── Bugs ────────────────────────────────────────────────────────────

#[async_trait]
impl BugRepository for MemoryStore {
    async fn create(&self, bug: NewBug, guard: MutationGuard) -> BuglineResult<Option<Bug>> {
        let mut t = self.lock();
        t.apply_revocations();
        let members = t.members_of(bug.project_id);
        if !guard_permits(guard, &members, None) {
            return Ok(None);
        }
        t.require_user(bug.reporter_id)?;
        if let Some(assignee) = bug.assignee_id {
            t.require_user(assignee)?;
        }
        let now = Utc::now();
        let created = Bug {
            id: Uuid::new_v4(),
            title: bug.title,
            description: bug.description,
            status: BugStatus::Open,
            priority: bug.priority,
            project_id: bug.project_id,
            reporter_id: bug.reporter_id,
            assignee_id: bug.assignee_id,
            created_at: now,
            updated_at: now,
        };
        t.bugs.push(created.clone());
        Ok(Some(created))
    }

    async fn get_by_id(&self, id: Uuid) -> BuglineResult<Option<Bug>> {
        Ok(self.lock().bugs.iter().find(|b| b.id == id).cloned())
    }

    async fn get_scoped(&self, id: Uuid) -> BuglineResult<Option<ScopedBug>> {
        let t = self.lock();
        Ok(t.bugs.iter().find(|b| b.id == id).map(|bug| ScopedBug {
            bug: bug.clone(),
            members: t.members_of(bug.project_id),
        }))
    }

    async fn get_detail(&self, id: Uuid) -> BuglineResult<Option<BugDetail>> {
        let t = self.lock();
        t.bugs
            .iter()
            .find(|b| b.id == id)
            .map(|b| t.detail(b))
            .transpose()
    }

    async fn list_details(&self, scope: BugScope) -> BuglineResult<Vec<BugDetail>> {
        let t = self.lock();
        let mut bugs: Vec<&Bug> = t
            .bugs
            .iter()
            .filter(|b| match scope {
                BugScope::All => true,
                BugScope::InvolvingUser(user_id) => {
                    b.reporter_id == user_id || b.assignee_id == Some(user_id)
                }
            })
            .collect();
        bugs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bugs.into_iter().map(|b| t.detail(b)).collect()
    }

    async fn update(
        &self,
        id: Uuid,
        patch: BugPatch,
        guard: MutationGuard,
    ) -> BuglineResult<Option<Bug>> {
        let mut t = self.lock();
        t.apply_revocations();
        let Some(project_id) = t.bugs.iter().find(|b| b.id == id).map(|b| b.project_id) else {
            return Ok(None);
        };
        let members = t.members_of(project_id);
        if !guard_permits(guard, &members, None) {
            return Ok(None);
        }
        if let Some(assignee) = patch.assignee_id {
            t.require_user(assignee)?;
        }
        let Some(bug) = t.bugs.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            bug.title = title;
        }
        if let Some(description) = patch.description {
            bug.description = description;
        }
        if let Some(status) = patch.status {
            bug.status = status;
        }
        if let Some(priority) = patch.priority {
            bug.priority = priority;
        }
        if let Some(assignee) = patch.assignee_id {
            bug.assignee_id = Some(assignee);
        }
        bug.updated_at = Utc::now();
        Ok(Some(bug.clone()))
    }

    async fn delete(&self, id: Uuid, guard: MutationGuard) -> BuglineResult<bool> {
        let mut t = self.lock();
        t.apply_revocations();
        let Some(project_id) = t.bugs.iter().find(|b| b.id == id).map(|b| b.project_id) else {
            return Ok(false);
        };
        let members = t.members_of(project_id);
        if !guard_permits(guard, &members, None) {
            return Ok(false);
        }
        t.drop_bug(id);
        Ok(true)
    }
}

// ── Comments ────────────────────────────────────────────────────────

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(
        &self,
        comment: NewComment,
        guard: MutationGuard,
    ) -> BuglineResult<Option<Comment>> {
        let mut t = self.lock();
        t.apply_revocations();
        let Some(project_id) = t
            .bugs
            .iter()
            .find(|b| b.id == comment.bug_id)
            .map(|b| b.project_id)
        else {
            return Ok(None);
        };
        let members = t.members_of(project_id);
        if !guard_permits(guard, &members, None) {
            return Ok(None);
        }
        t.require_user(comment.user_id)?;
        let now = Utc::now();
        let created = Comment {
            id: Uuid::new_v4(),
            content: comment.content,
            bug_id: comment.bug_id,
            user_id: comment.user_id,
            created_at: now,
            updated_at: now,
        };
        t.comments.push(created.clone());
        Ok(Some(created))
    }

    async fn get_by_id(&self, id: Uuid) -> BuglineResult<Option<Comment>> {
        Ok(self.lock().comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_for_bug(&self, bug_id: Uuid) -> BuglineResult<Vec<CommentWithAuthor>> {
        let t = self.lock();
        let mut comments: Vec<&Comment> =
            t.comments.iter().filter(|c| c.bug_id == bug_id).collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments
            .into_iter()
            .map(|c| {
                let author = t.user(c.user_id);
                CommentWithAuthor {
                    comment: c.clone(),
                    user: CommentAuthor {
                        name: author.and_then(|u| u.name.clone()),
                        image: author.and_then(|u| u.image.clone()),
                    },
                }
            })
            .collect())
    }

    async fn update(
        &self,
        id: Uuid,
        content: String,
        guard: MutationGuard,
    ) -> BuglineResult<Option<Comment>> {
        let mut t = self.lock();
        let Some(comment) = t.comments.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if !guard_permits(guard, &[], Some(comment.user_id)) {
            return Ok(None);
        }
        comment.content = content;
        comment.updated_at = Utc::now();
        Ok(Some(comment.clone()))
    }

    async fn delete(&self, id: Uuid, guard: MutationGuard) -> BuglineResult<bool> {
        let mut t = self.lock();
        let Some(author) = t.comments.iter().find(|c| c.id == id).map(|c| c.user_id) else {
            return Ok(false);
        };
        if !guard_permits(guard, &[], Some(author)) {
            return Ok(false);
        }
        t.comments.retain(|c| c.id != id);
        Ok(true)
    }
}

// ── Dashboard ───────────────────────────────────────────────────────

#[async_trait]
impl DashboardRepository for MemoryStore {
    async fn counts(&self) -> BuglineResult<DashboardCounts> {
        let t = self.lock();
        let mut counts = DashboardCounts {
            total_projects: t.projects.len() as i64,
            total_users: t.users.len() as i64,
            ..Default::default()
        };
        for bug in &t.bugs {
            match counts.by_status.iter_mut().find(|(s, _)| *s == bug.status) {
                Some((_, n)) => *n += 1,
                None => counts.by_status.push((bug.status, 1)),
            }
            match counts.by_priority.iter_mut().find(|(p, _)| *p == bug.priority) {
                Some((_, n)) => *n += 1,
                None => counts.by_priority.push((bug.priority, 1)),
            }
        }
        Ok(counts)
    }
}
