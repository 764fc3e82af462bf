use sqlx::{Pool, Postgres};
use tutorsync_core::engine;
use tutorsync_core::errors::{TutorError, TutorResult};
use tutorsync_core::models::appointment::{Appointment, FeedbackEntry, SessionReport};
use uuid::Uuid;

use super::appointment::{fetch_row, hydrate};
use super::db_err;

/// Attach or replace the post-session attendance report.
pub async fn attach_report(
    pool: &Pool<Postgres>,
    id: Uuid,
    report: &SessionReport,
) -> TutorResult<Appointment> {
    tracing::debug!("Attaching report to appointment {}", id);

    let row = fetch_row(pool, id)
        .await?
        .ok_or_else(|| TutorError::NotFound(format!("appointment {id} does not exist")))?;

    sqlx::query(
        r#"
        INSERT INTO session_reports (appointment_id, present, capacity, notes, created_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (appointment_id) DO UPDATE
        SET present = EXCLUDED.present,
            capacity = EXCLUDED.capacity,
            notes = EXCLUDED.notes,
            created_at = EXCLUDED.created_at
        "#,
    )
    .bind(id)
    .bind(report.present as i32)
    .bind(report.capacity as i32)
    .bind(&report.notes)
    .bind(report.created_at)
    .execute(pool)
    .await
    .map_err(db_err)?;

    hydrate(pool, row).await
}

/// Append one occupant's feedback. The `(appointment_id, student_id)`
/// primary key backs up the precondition check, so a concurrent double
/// submission still resolves to exactly one stored entry.
pub async fn submit_feedback(
    pool: &Pool<Postgres>,
    id: Uuid,
    entry: &FeedbackEntry,
) -> TutorResult<FeedbackEntry> {
    tracing::debug!(
        "Feedback for appointment {} from user {}",
        id,
        entry.student_id
    );

    let row = fetch_row(pool, id)
        .await?
        .ok_or_else(|| TutorError::NotFound(format!("appointment {id} does not exist")))?;
    let apt = hydrate(pool, row).await?;
    engine::validate_feedback(&apt, entry)?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO feedback (appointment_id, student_id, rating, comment, created_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (appointment_id, student_id) DO NOTHING
        "#,
    )
    .bind(id)
    .bind(&entry.student_id)
    .bind(entry.rating as i16)
    .bind(&entry.comment)
    .bind(entry.created_at)
    .execute(pool)
    .await
    .map_err(db_err)?;

    if inserted.rows_affected() == 0 {
        return Err(TutorError::AlreadySubmitted(format!(
            "user {} already rated this session",
            entry.student_id
        )));
    }

    Ok(entry.clone())
}
