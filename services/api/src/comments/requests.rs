use bugline_common::error::{BuglineError, BuglineResult};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

impl CommentRequest {
    pub fn validate(self) -> BuglineResult<String> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err(BuglineError::Validation(
                "Comment cannot be empty".to_string(),
            ));
        }
        Ok(content.to_string())
    }
}
