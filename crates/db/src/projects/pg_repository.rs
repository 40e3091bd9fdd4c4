use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, QueryBuilder, Row};
use uuid::Uuid;

use crate::bugs::models::Bug;
use crate::bugs::pg_repository::{map_bug_row, BUG_COLUMNS};
use crate::guard::{MutationGuard, ProjectRef};
use crate::map_db_error;
use crate::projects::models::{
    MemberRole, NewProject, Project, ProjectMember, ProjectOverview, ProjectPatch, ProjectScope,
    ProjectUser,
};
use crate::projects::repositories::ProjectRepository;
use crate::users::pg_repository::map_summary_prefixed;
use bugline_common::error::{BuglineError, BuglineResult};

const PROJECT_COLUMNS: &str = "id, name, description, creator_id, created_at, updated_at";

const OVERVIEW_SELECT: &str = "select p.id, p.name, p.description, p.creator_id, p.created_at, p.updated_at, \
     c.name as creator_name, c.email as creator_email, c.image as creator_image \
     from projects p join users c on c.id = p.creator_id";

pub(crate) fn map_member_row(row: &PgRow) -> BuglineResult<ProjectMember> {
    let role_raw: String = row.get("role");
    let role = MemberRole::from_str(&role_raw).map_err(BuglineError::Internal)?;
    Ok(ProjectMember {
        user_id: row.get("user_id"),
        project_id: row.get("project_id"),
        role,
    })
}

pub(crate) async fn fetch_members(
    pool: &PgPool,
    project_id: Uuid,
) -> BuglineResult<Vec<ProjectMember>> {
    let rows = sqlx::query(
        "select user_id, project_id, role from project_members where project_id = $1",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)?;

    rows.iter().map(map_member_row).collect()
}

#[derive(Clone)]
pub struct PgProjectRepository {
    pool: PgPool,
}

impl PgProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_project_row(row: &PgRow) -> Project {
        Project {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            creator_id: row.get("creator_id"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    /// Attach member counts and bugs to already-fetched project rows.
    async fn hydrate(&self, rows: Vec<PgRow>) -> BuglineResult<Vec<ProjectOverview>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.get("id")).collect();

        let count_rows = sqlx::query(
            "select project_id, count(*) as cnt from project_members \
             where project_id = any($1) group by project_id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let counts: HashMap<Uuid, i64> = count_rows
            .into_iter()
            .map(|r| (r.get("project_id"), r.get("cnt")))
            .collect();

        let bug_rows = sqlx::query(&format!(
            "select {BUG_COLUMNS} from bugs where project_id = any($1) order by created_at desc"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut bugs_by_project: HashMap<Uuid, Vec<Bug>> = HashMap::new();
        for row in &bug_rows {
            let bug = map_bug_row(row)?;
            bugs_by_project.entry(bug.project_id).or_default().push(bug);
        }

        Ok(rows
            .iter()
            .map(|row| {
                let project = Self::map_project_row(row);
                ProjectOverview {
                    creator: map_summary_prefixed(row, "creator"),
                    members_count: counts.get(&project.id).copied().unwrap_or(0),
                    bugs: bugs_by_project.remove(&project.id).unwrap_or_default(),
                    project,
                }
            })
            .collect())
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn create_with_members(
        &self,
        project: NewProject,
    ) -> BuglineResult<(Project, Vec<ProjectMember>)> {
        let additional = project.additional_member_ids();
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let row = sqlx::query(&format!(
            "insert into projects (id, name, description, creator_id, created_at, updated_at)
             values ($1, $2, $3, $4, $5, $5)
             returning {PROJECT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.creator_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;
        let created = Self::map_project_row(&row);

        sqlx::query(
            "insert into project_members (user_id, project_id, role, created_at)
             values ($1, $2, 'admin', $3)",
        )
        .bind(project.creator_id)
        .bind(created.id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if !additional.is_empty() {
            sqlx::query(
                "insert into project_members (user_id, project_id, role, created_at)
                 select m, $1, 'member', $2 from unnest($3::uuid[]) as m
                 on conflict (user_id, project_id) do nothing",
            )
            .bind(created.id)
            .bind(now)
            .bind(&additional)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        let member_rows = sqlx::query(
            "select user_id, project_id, role from project_members
             where project_id = $1 order by created_at, user_id",
        )
        .bind(created.id)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        let members = member_rows
            .iter()
            .map(map_member_row)
            .collect::<BuglineResult<Vec<_>>>()?;
        Ok((created, members))
    }

    async fn get_by_id(&self, id: Uuid) -> BuglineResult<Option<Project>> {
        let row = sqlx::query(&format!("select {PROJECT_COLUMNS} from projects where id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.as_ref().map(Self::map_project_row))
    }

    async fn list_members(&self, project_id: Uuid) -> BuglineResult<Vec<ProjectMember>> {
        fetch_members(&self.pool, project_id).await
    }

    async fn list_users(&self, project_id: Uuid) -> BuglineResult<Vec<ProjectUser>> {
        let rows = sqlx::query(
            "select u.id, u.name, u.email, u.image, pm.role
             from project_members pm
             join users u on u.id = pm.user_id
             where pm.project_id = $1
             order by pm.role = 'admin' desc, u.name nulls last, u.email",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.iter()
            .map(|row| {
                let role_raw: String = row.get("role");
                Ok(ProjectUser {
                    id: row.get("id"),
                    name: row.get("name"),
                    email: row.get("email"),
                    image: row.get("image"),
                    role: MemberRole::from_str(&role_raw).map_err(BuglineError::Internal)?,
                })
            })
            .collect()
    }

    async fn get_overview(&self, id: Uuid) -> BuglineResult<Option<ProjectOverview>> {
        let row = sqlx::query(&format!("{OVERVIEW_SELECT} where p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn list_overviews(&self, scope: ProjectScope) -> BuglineResult<Vec<ProjectOverview>> {
        let mut qb = QueryBuilder::new(OVERVIEW_SELECT);
        if let ProjectScope::VisibleTo(user_id) = scope {
            qb.push(" where p.creator_id = ").push_bind(user_id);
            qb.push(" or exists (select 1 from project_members pm where pm.project_id = p.id and pm.user_id = ")
                .push_bind(user_id)
                .push(")");
        }
        qb.push(" order by p.created_at desc");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        self.hydrate(rows).await
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ProjectPatch,
        guard: MutationGuard,
    ) -> BuglineResult<Option<Project>> {
        let mut qb = QueryBuilder::new("update projects set updated_at = ");
        qb.push_bind(Utc::now());
        if let Some(name) = patch.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(description) = patch.description {
            qb.push(", description = ").push_bind(description);
        }
        qb.push(" where id = ").push_bind(id);
        guard.push_condition(&mut qb, ProjectRef::Column("projects.id"), None);
        qb.push(" returning ").push(PROJECT_COLUMNS);

        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.as_ref().map(Self::map_project_row))
    }

    async fn delete(&self, id: Uuid, guard: MutationGuard) -> BuglineResult<bool> {
        let mut qb = QueryBuilder::new("delete from projects where id = ");
        qb.push_bind(id);
        guard.push_condition(&mut qb, ProjectRef::Column("projects.id"), None);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
        guard: MutationGuard,
    ) -> BuglineResult<Option<ProjectMember>> {
        let mut qb = QueryBuilder::new(
            "insert into project_members (user_id, project_id, role, created_at) select ",
        );
        qb.push_bind(user_id)
            .push(", ")
            .push_bind(project_id)
            .push(", ")
            .push_bind(role.as_str())
            .push(", ")
            .push_bind(Utc::now())
            .push(" where true");
        guard.push_condition(&mut qb, ProjectRef::Id(project_id), None);
        qb.push(" on conflict (user_id, project_id) do nothing returning user_id, project_id, role");

        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.as_ref().map(map_member_row).transpose()
    }

    async fn remove_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        guard: MutationGuard,
    ) -> BuglineResult<bool> {
        let mut qb = QueryBuilder::new("delete from project_members where project_id = ");
        qb.push_bind(project_id)
            .push(" and user_id = ")
            .push_bind(user_id);
        guard.push_condition(
            &mut qb,
            ProjectRef::Column("project_members.project_id"),
            None,
        );

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
