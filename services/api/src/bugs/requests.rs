use std::str::FromStr;

use bugline_common::error::{BuglineError, BuglineResult};
use bugline_db::bugs::models::{BugPatch, BugStatus, Priority};
use serde::Deserialize;
use uuid::Uuid;

use super::service::BugInput;

#[derive(Debug, Deserialize)]
pub struct CreateBugRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub assignee_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBugRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee_id: Option<String>,
}

fn parse<T: FromStr<Err = String>>(value: &str) -> BuglineResult<T> {
    T::from_str(value.trim()).map_err(BuglineError::Validation)
}

fn validate_title(title: &str) -> BuglineResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(BuglineError::Validation("Title is required".to_string()));
    }
    Ok(title.to_string())
}

/// An empty assignee means "none".
fn parse_assignee(value: Option<&str>) -> BuglineResult<Option<Uuid>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Uuid::parse_str(v)
            .map(Some)
            .map_err(|_| BuglineError::Validation(format!("invalid assignee id: {v}"))),
        None => Ok(None),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CreateBugRequest {
    pub fn validate(self) -> BuglineResult<BugInput> {
        Ok(BugInput {
            title: validate_title(&self.title)?,
            description: non_blank(self.description),
            priority: self
                .priority
                .as_deref()
                .map(parse::<Priority>)
                .transpose()?
                .unwrap_or_default(),
            assignee_id: parse_assignee(self.assignee_id.as_deref())?,
        })
    }
}

impl UpdateBugRequest {
    pub fn validate(self) -> BuglineResult<BugPatch> {
        Ok(BugPatch {
            title: self.title.as_deref().map(validate_title).transpose()?,
            description: self.description.map(|d| non_blank(Some(d))),
            status: self.status.as_deref().map(parse::<BugStatus>).transpose()?,
            priority: self.priority.as_deref().map(parse::<Priority>).transpose()?,
            assignee_id: parse_assignee(self.assignee_id.as_deref())?,
        })
    }
}
