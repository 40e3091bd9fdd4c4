use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, QueryBuilder, Row};
use uuid::Uuid;

use crate::bugs::models::{
    Bug, BugDetail, BugPatch, BugScope, BugStatus, Label, NewBug, Priority, ProjectRef as BugProject,
    ScopedBug,
};
use crate::bugs::repositories::BugRepository;
use crate::guard::{MutationGuard, ProjectRef};
use crate::map_db_error;
use crate::projects::pg_repository::fetch_members;
use crate::users::models::UserSummary;
use crate::users::pg_repository::map_summary_prefixed;
use bugline_common::error::{BuglineError, BuglineResult};

pub(crate) const BUG_COLUMNS: &str =
    "id, title, description, status, priority, project_id, reporter_id, assignee_id, created_at, updated_at";

const DETAIL_SELECT: &str = "select b.id, b.title, b.description, b.status, b.priority, \
     b.project_id, b.reporter_id, b.assignee_id, b.created_at, b.updated_at, \
     p.name as project_name, p.description as project_description, \
     r.name as reporter_name, r.email as reporter_email, r.image as reporter_image, \
     a.name as assignee_name, a.email as assignee_email, a.image as assignee_image, \
     (select count(*) from comments c where c.bug_id = b.id) as comments_count \
     from bugs b \
     join projects p on p.id = b.project_id \
     join users r on r.id = b.reporter_id \
     left join users a on a.id = b.assignee_id";

pub(crate) fn map_bug_row(row: &PgRow) -> BuglineResult<Bug> {
    let status_raw: String = row.get("status");
    let priority_raw: String = row.get("priority");

    Ok(Bug {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        status: BugStatus::from_str(&status_raw).map_err(BuglineError::Internal)?,
        priority: Priority::from_str(&priority_raw).map_err(BuglineError::Internal)?,
        project_id: row.get("project_id"),
        reporter_id: row.get("reporter_id"),
        assignee_id: row.get("assignee_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[derive(Clone)]
pub struct PgBugRepository {
    pool: PgPool,
}

impl PgBugRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_detail_row(row: &PgRow) -> BuglineResult<BugDetail> {
        let bug = map_bug_row(row)?;
        let assignee_email: Option<String> = row.get("assignee_email");
        let assignee = match (bug.assignee_id, assignee_email) {
            (Some(id), Some(email)) => Some(UserSummary {
                id,
                name: row.get("assignee_name"),
                email,
                image: row.get("assignee_image"),
            }),
            _ => None,
        };

        Ok(BugDetail {
            project: BugProject {
                id: bug.project_id,
                name: row.get("project_name"),
                description: row.get("project_description"),
            },
            reporter: map_summary_prefixed(row, "reporter"),
            assignee,
            labels: Vec::new(),
            comments_count: row.get("comments_count"),
            bug,
        })
    }

    async fn attach_labels(&self, details: &mut [BugDetail]) -> BuglineResult<()> {
        if details.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = details.iter().map(|d| d.bug.id).collect();

        let rows = sqlx::query(
            "select bl.bug_id, l.id, l.name from bug_labels bl
             join labels l on l.id = bl.label_id
             where bl.bug_id = any($1)
             order by l.name",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut by_bug: HashMap<Uuid, Vec<Label>> = HashMap::new();
        for row in rows {
            by_bug.entry(row.get("bug_id")).or_default().push(Label {
                id: row.get("id"),
                name: row.get("name"),
            });
        }
        for detail in details.iter_mut() {
            detail.labels = by_bug.remove(&detail.bug.id).unwrap_or_default();
        }
        Ok(())
    }
}

#[async_trait]
impl BugRepository for PgBugRepository {
    async fn create(&self, bug: NewBug, guard: MutationGuard) -> BuglineResult<Option<Bug>> {
        let now = Utc::now();
        let mut qb = QueryBuilder::new(
            "insert into bugs (id, title, description, status, priority, project_id, \
             reporter_id, assignee_id, created_at, updated_at) select ",
        );
        {
            let mut values = qb.separated(", ");
            values.push_bind(Uuid::new_v4());
            values.push_bind(bug.title);
            values.push_bind(bug.description);
            values.push_bind(BugStatus::Open.as_str());
            values.push_bind(bug.priority.as_str());
            values.push_bind(bug.project_id);
            values.push_bind(bug.reporter_id);
            values.push_bind(bug.assignee_id);
            values.push_bind(now);
            values.push_bind(now);
        }
        qb.push(" where true");
        guard.push_condition(&mut qb, ProjectRef::Id(bug.project_id), None);
        qb.push(" returning ").push(BUG_COLUMNS);

        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.as_ref().map(map_bug_row).transpose()
    }

    async fn get_by_id(&self, id: Uuid) -> BuglineResult<Option<Bug>> {
        let row = sqlx::query(&format!("select {BUG_COLUMNS} from bugs where id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.as_ref().map(map_bug_row).transpose()
    }

    async fn get_scoped(&self, id: Uuid) -> BuglineResult<Option<ScopedBug>> {
        let bug = match self.get_by_id(id).await? {
            Some(bug) => bug,
            None => return Ok(None),
        };

        let members = fetch_members(&self.pool, bug.project_id).await?;
        Ok(Some(ScopedBug { bug, members }))
    }

    async fn get_detail(&self, id: Uuid) -> BuglineResult<Option<BugDetail>> {
        let row = sqlx::query(&format!("{DETAIL_SELECT} where b.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        let mut detail = match row {
            Some(row) => vec![Self::map_detail_row(&row)?],
            None => return Ok(None),
        };
        self.attach_labels(&mut detail).await?;
        Ok(detail.pop())
    }

    async fn list_details(&self, scope: BugScope) -> BuglineResult<Vec<BugDetail>> {
        let mut qb = QueryBuilder::new(DETAIL_SELECT);
        if let BugScope::InvolvingUser(user_id) = scope {
            qb.push(" where b.reporter_id = ")
                .push_bind(user_id)
                .push(" or b.assignee_id = ")
                .push_bind(user_id);
        }
        qb.push(" order by b.created_at desc");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let mut details = rows
            .iter()
            .map(Self::map_detail_row)
            .collect::<BuglineResult<Vec<_>>>()?;
        self.attach_labels(&mut details).await?;
        Ok(details)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: BugPatch,
        guard: MutationGuard,
    ) -> BuglineResult<Option<Bug>> {
        let mut qb = QueryBuilder::new("update bugs set updated_at = ");
        qb.push_bind(Utc::now());
        if let Some(title) = patch.title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(description) = patch.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(status) = patch.status {
            qb.push(", status = ").push_bind(status.as_str());
        }
        if let Some(priority) = patch.priority {
            qb.push(", priority = ").push_bind(priority.as_str());
        }
        if let Some(assignee_id) = patch.assignee_id {
            qb.push(", assignee_id = ").push_bind(assignee_id);
        }
        qb.push(" where id = ").push_bind(id);
        guard.push_condition(&mut qb, ProjectRef::Column("bugs.project_id"), None);
        qb.push(" returning ").push(BUG_COLUMNS);

        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.as_ref().map(map_bug_row).transpose()
    }

    async fn delete(&self, id: Uuid, guard: MutationGuard) -> BuglineResult<bool> {
        let mut qb = QueryBuilder::new("delete from bugs where id = ");
        qb.push_bind(id);
        guard.push_condition(&mut qb, ProjectRef::Column("bugs.project_id"), None);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
