use sqlx::{Pool, Postgres};
use tutorsync_core::errors::TutorResult;
use tutorsync_core::models::session::Session;

use crate::models::DbSession;

use super::db_err;

/// Look up the session behind a bearer token. Token issuance belongs to
/// the external SSO integration; rows appear here when a user signs in.
pub async fn resolve_session(
    pool: &Pool<Postgres>,
    token: &str,
) -> TutorResult<Option<Session>> {
    let row = sqlx::query_as::<_, DbSession>(
        "SELECT token, user_id, role, created_at FROM sessions WHERE token = $1",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
    .map_err(db_err)?;

    match row {
        Some(row) => Ok(Some(row.into_session()?)),
        None => Ok(None),
    }
}
