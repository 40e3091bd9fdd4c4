//! Authorization predicates compiled into mutation statements.
//!
//! A guarded statement only touches rows while the acting user still holds
//! the required relationship, so the check and the write happen atomically.

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationGuard {
    /// Acting user must be a member (any role) of the owning project.
    Member(Uuid),
    /// Acting user must hold the `admin` role in the owning project.
    Admin(Uuid),
    /// Acting user must be the author of the row.
    Author(Uuid),
}

impl MutationGuard {
    pub fn actor(&self) -> Uuid {
        match self {
            Self::Member(id) | Self::Admin(id) | Self::Author(id) => *id,
        }
    }
}

/// How the guarded statement locates the owning project.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ProjectRef<'a> {
    /// A column of the row being mutated, e.g. `bugs.project_id`.
    Column(&'a str),
    /// A project id known up front (inserts).
    Id(Uuid),
    /// The project owning the given bug.
    OfBug(Uuid),
}

impl MutationGuard {
    /// Append ` and <predicate>` to `qb`.
    ///
    /// `author_column` is required for `Author` guards; without it the
    /// predicate is `false` and the statement affects nothing.
    pub(crate) fn push_condition(
        &self,
        qb: &mut QueryBuilder<'_, Postgres>,
        project: ProjectRef<'_>,
        author_column: Option<&str>,
    ) {
        match self {
            Self::Member(user_id) | Self::Admin(user_id) => {
                qb.push(" and exists (select 1 from project_members pm where pm.project_id = ");
                match project {
                    ProjectRef::Column(column) => {
                        qb.push(column);
                    }
                    ProjectRef::Id(id) => {
                        qb.push_bind(id);
                    }
                    ProjectRef::OfBug(bug_id) => {
                        qb.push("(select b.project_id from bugs b where b.id = ");
                        qb.push_bind(bug_id);
                        qb.push(")");
                    }
                }
                qb.push(" and pm.user_id = ").push_bind(*user_id);
                if matches!(self, Self::Admin(_)) {
                    qb.push(" and pm.role = 'admin'");
                }
                qb.push(")");
            }
            Self::Author(user_id) => match author_column {
                Some(column) => {
                    qb.push(" and ").push(column).push(" = ").push_bind(*user_id);
                }
                None => {
                    qb.push(" and false");
                }
            },
        }
    }
}
