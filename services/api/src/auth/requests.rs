use bugline_common::error::{BuglineError, BuglineResult};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

fn invalid(msg: &str) -> BuglineError {
    BuglineError::Validation(msg.to_string())
}

pub(crate) fn validate_email(email: &str) -> BuglineResult<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(invalid("Invalid email address"));
    }
    Ok(())
}

fn validate_password(password: &str) -> BuglineResult<()> {
    let len = password.chars().count();
    if len < 8 {
        return Err(invalid("Password must be at least 8 characters"));
    }
    if len > 32 {
        return Err(invalid("Password must be at most 32 characters"));
    }
    Ok(())
}

impl SignUpRequest {
    pub fn validate(&self) -> BuglineResult<()> {
        let name_len = self.name.trim().chars().count();
        if name_len == 0 {
            return Err(invalid("Name is required"));
        }
        if name_len > 50 {
            return Err(invalid("Name must be at most 50 characters"));
        }
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        if self.password != self.confirm_password {
            return Err(invalid("Passwords do not match"));
        }
        Ok(())
    }
}

impl SignInRequest {
    pub fn validate(&self) -> BuglineResult<()> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}
