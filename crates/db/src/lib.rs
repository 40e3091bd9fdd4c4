pub mod bugs;
pub mod comments;
pub mod dashboard;
pub mod guard;
pub mod projects;
pub mod sessions;
pub mod users;

use bugline_common::error::{BuglineError, BuglineResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Create a Postgres connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> BuglineResult<PgPool> {
    tracing::info!("connecting to database");
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| BuglineError::Database(e.to_string()))
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> BuglineResult<()> {
    tracing::info!("running migrations");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| BuglineError::Database(format!("migration failed: {e}")))
}

/// Translate driver errors into the error taxonomy.
///
/// Unique violations become `Conflict`, foreign-key violations become
/// `NotFound` (a referenced user, project or bug does not exist).
pub(crate) fn map_db_error(err: sqlx::Error) -> BuglineError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return BuglineError::Conflict(format!(
                "duplicate record ({})",
                db.constraint().unwrap_or("unique")
            ));
        }
        if db.is_foreign_key_violation() {
            return BuglineError::NotFound(format!(
                "referenced record does not exist ({})",
                db.constraint().unwrap_or("foreign key")
            ));
        }
    }
    BuglineError::Database(err.to_string())
}
