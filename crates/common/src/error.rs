use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuglineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    /// No session, not a member, not an admin, or not the comment author.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl BuglineError {
    /// Stable taxonomy tag surfaced to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Database(_) => "database",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::Unauthorized(_) => "unauthorized",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal",
        }
    }

    /// The message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Config(m)
            | Self::Database(m)
            | Self::NotFound(m)
            | Self::Validation(m)
            | Self::Unauthorized(m)
            | Self::Conflict(m)
            | Self::Internal(m) => m,
        }
    }
}

pub type BuglineResult<T> = Result<T, BuglineError>;
