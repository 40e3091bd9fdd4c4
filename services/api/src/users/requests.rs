use bugline_common::error::{BuglineError, BuglineResult};
use bugline_db::users::models::ProfileUpdate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub role: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(self) -> BuglineResult<ProfileUpdate> {
        let name = match self.name.map(|n| n.trim().to_string()) {
            Some(n) if n.is_empty() => {
                return Err(BuglineError::Validation("Name is required".to_string()))
            }
            Some(n) if n.chars().count() > 50 => {
                return Err(BuglineError::Validation(
                    "Name must be at most 50 characters".to_string(),
                ))
            }
            other => other,
        };
        Ok(ProfileUpdate {
            name,
            role: self.role.map(|r| r.trim().to_string()),
        })
    }
}
