use bugline_common::error::{BuglineError, BuglineResult};
use bugline_db::projects::models::ProjectPatch;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub member_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: String,
}

pub(crate) fn parse_user_id(value: &str) -> BuglineResult<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| BuglineError::Validation(format!("invalid user id: {value}")))
}

fn validate_name(name: &str) -> BuglineResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BuglineError::Validation(
            "Project name is required".to_string(),
        ));
    }
    if name.chars().count() > 50 {
        return Err(BuglineError::Validation(
            "Project name must be at most 50 characters".to_string(),
        ));
    }
    Ok(name.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validated input for project creation.
#[derive(Debug)]
pub struct ProjectInput {
    pub name: String,
    pub description: Option<String>,
    pub member_ids: Vec<Uuid>,
}

impl CreateProjectRequest {
    pub fn validate(self) -> BuglineResult<ProjectInput> {
        let member_ids = self
            .member_ids
            .iter()
            .map(|id| parse_user_id(id))
            .collect::<BuglineResult<Vec<_>>>()?;
        Ok(ProjectInput {
            name: validate_name(&self.name)?,
            description: non_blank(self.description),
            member_ids,
        })
    }
}

impl UpdateProjectRequest {
    pub fn validate(self) -> BuglineResult<ProjectPatch> {
        let name = self.name.as_deref().map(validate_name).transpose()?;
        Ok(ProjectPatch {
            name,
            description: self.description.map(|d| non_blank(Some(d))),
        })
    }
}
