//! # Authentication Module
//!
//! Bearer-token authentication for the API. Token issuance belongs to
//! the external SSO collaborator; this module only resolves an incoming
//! token to a [`Session`] through the store and checks roles. Role
//! claims never come from the request body.

use axum::http::{header, HeaderMap};
use tutorsync_core::errors::{TutorError, TutorResult};
use tutorsync_core::models::session::{Role, Session};

use crate::ApiState;

/// Resolve the calling user from the `Authorization: Bearer` header.
pub async fn authenticate(state: &ApiState, headers: &HeaderMap) -> TutorResult<Session> {
    let token = bearer_token(headers)?;
    state
        .store
        .resolve_session(token)
        .await?
        .ok_or_else(|| TutorError::Authentication("invalid or expired token".into()))
}

/// Check the session against the required role. Admins pass every gate.
pub fn require_role(session: &Session, required: Role) -> TutorResult<()> {
    if session.role == required || session.role == Role::Admin {
        return Ok(());
    }
    Err(TutorError::Authorization(format!(
        "requires {required:?} role"
    )))
}

fn bearer_token(headers: &HeaderMap) -> TutorResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| TutorError::Authentication("missing Authorization header".into()))?;
    let value = value
        .to_str()
        .map_err(|_| TutorError::Authentication("malformed Authorization header".into()))?;
    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| TutorError::Authentication("expected a bearer token".into()))
}
