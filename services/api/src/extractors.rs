use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bugline_common::error::BuglineError;
use bugline_db::users::models::User;

use crate::auth::resolver::{IdentityResolver, SessionResolver};
use crate::error::{error_body, ApiError};
use crate::AppState;

/// The signed-in principal, resolved from `Authorization: Bearer <token>`.
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

#[derive(Debug)]
pub enum AuthRejection {
    MissingToken,
    InvalidSession,
    Lookup(BuglineError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let message = match self {
            Self::MissingToken => "missing bearer token",
            Self::InvalidSession => "invalid or expired session",
            Self::Lookup(err) => return ApiError(err).into_response(),
        };
        (StatusCode::UNAUTHORIZED, error_body("unauthorized", message)).into_response()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or(AuthRejection::MissingToken)?
            .to_string();

        let app = AppState::from_ref(state);
        let user = SessionResolver::new(app.sessions)
            .resolve(&token)
            .await
            .map_err(AuthRejection::Lookup)?
            .ok_or(AuthRejection::InvalidSession)?;

        Ok(CurrentUser { user, token })
    }
}
