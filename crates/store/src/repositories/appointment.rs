use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use tutorsync_core::engine;
use tutorsync_core::errors::{TutorError, TutorResult};
use tutorsync_core::models::appointment::Appointment;
use uuid::Uuid;

use crate::models::{status_str, DbAppointment, DbFeedback, DbSessionReport};

use super::db_err;

/// How many times a guarded update is retried when the re-read snapshot
/// says it should have matched (a concurrent mutation slipped in between
/// the update and the classification read).
const CAS_RETRIES: u32 = 3;

const APPOINTMENT_COLUMNS: &str =
    "id, tutor_id, name, place, start_time, end_time, max_slot, current_slots, status, version, created_at";

pub async fn create_appointment(
    pool: &Pool<Postgres>,
    apt: &Appointment,
) -> TutorResult<Appointment> {
    tracing::debug!(
        "Creating appointment: id={}, tutor={}, max_slot={}",
        apt.id,
        apt.tutor_id,
        apt.max_slot
    );

    let row = sqlx::query_as::<_, DbAppointment>(
        r#"
        INSERT INTO appointments (id, tutor_id, name, place, start_time, end_time, max_slot, current_slots, status, version, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, $10)
        RETURNING id, tutor_id, name, place, start_time, end_time, max_slot, current_slots, status, version, created_at
        "#,
    )
    .bind(apt.id)
    .bind(&apt.tutor_id)
    .bind(&apt.name)
    .bind(&apt.place)
    .bind(apt.start_time)
    .bind(apt.end_time)
    .bind(apt.max_slot as i32)
    .bind(&apt.current_slots)
    .bind(status_str(apt.status))
    .bind(apt.created_at)
    .fetch_one(pool)
    .await
    .map_err(db_err)?;

    row.into_appointment(None, Vec::new())
}

pub async fn get_appointment(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> TutorResult<Option<Appointment>> {
    let row = fetch_row(pool, id).await?;
    match row {
        Some(row) => Ok(Some(hydrate(pool, row).await?)),
        None => Ok(None),
    }
}

pub async fn list_appointments(
    pool: &Pool<Postgres>,
    tutor_id: Option<&str>,
) -> TutorResult<Vec<Appointment>> {
    let rows = match tutor_id {
        Some(tutor_id) => {
            sqlx::query_as::<_, DbAppointment>(&format!(
                "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE tutor_id = $1 ORDER BY start_time ASC"
            ))
            .bind(tutor_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, DbAppointment>(&format!(
                "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY start_time ASC"
            ))
            .fetch_all(pool)
            .await
        }
    }
    .map_err(db_err)?;

    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

    let mut reports: HashMap<Uuid, DbSessionReport> = sqlx::query_as::<_, DbSessionReport>(
        "SELECT appointment_id, present, capacity, notes, created_at FROM session_reports WHERE appointment_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await
    .map_err(db_err)?
    .into_iter()
    .map(|report| (report.appointment_id, report))
    .collect();

    let mut feedback: HashMap<Uuid, Vec<DbFeedback>> = HashMap::new();
    let feedback_rows = sqlx::query_as::<_, DbFeedback>(
        "SELECT appointment_id, student_id, rating, comment, created_at FROM feedback WHERE appointment_id = ANY($1) ORDER BY created_at ASC",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;
    for row in feedback_rows {
        feedback.entry(row.appointment_id).or_default().push(row);
    }

    rows.into_iter()
        .map(|row| {
            let report = reports.remove(&row.id);
            let entries = feedback.remove(&row.id).unwrap_or_default();
            row.into_appointment(report, entries)
        })
        .collect()
}

/// Add `user_id` to the occupant set under compare-and-swap.
///
/// The guarded UPDATE re-checks every booking precondition in the same
/// statement that mutates the row; when it matches nothing, the row is
/// re-read and the pure transition classifies the failure. A snapshot
/// that says the booking should have succeeded means a concurrent cancel
/// raced in between, so the update is retried.
pub async fn book(pool: &Pool<Postgres>, id: Uuid, user_id: &str) -> TutorResult<Appointment> {
    tracing::debug!("Booking appointment {} for user {}", id, user_id);

    for _ in 0..CAS_RETRIES {
        let updated = sqlx::query_as::<_, DbAppointment>(
            r#"
            UPDATE appointments
            SET current_slots = array_append(current_slots, $2),
                status = CASE
                    WHEN cardinality(current_slots) + 1 >= max_slot THEN 'FULL'
                    ELSE 'OPEN'
                END,
                version = version + 1
            WHERE id = $1
              AND status = 'OPEN'
              AND NOT (current_slots @> ARRAY[$2])
              AND cardinality(current_slots) < max_slot
            RETURNING id, tutor_id, name, place, start_time, end_time, max_slot, current_slots, status, version, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(db_err)?;

        if let Some(row) = updated {
            return hydrate(pool, row).await;
        }

        let row = fetch_row(pool, id)
            .await?
            .ok_or_else(|| TutorError::NotFound(format!("appointment {id} does not exist")))?;
        let mut apt = row.into_appointment(None, Vec::new())?;
        match engine::apply_book(&mut apt, user_id) {
            Ok(()) => continue,
            Err(err) => return Err(err),
        }
    }

    tracing::warn!("Booking retries exhausted for appointment {}", id);
    Err(TutorError::Database(eyre::eyre!(
        "compare-and-swap retries exhausted for appointment {id}"
    )))
}

/// Remove `user_id` from the occupant set (student self-cancel).
pub async fn cancel_booking(
    pool: &Pool<Postgres>,
    id: Uuid,
    user_id: &str,
    now: DateTime<Utc>,
) -> TutorResult<Appointment> {
    tracing::debug!("Cancelling booking in {} for user {}", id, user_id);

    for _ in 0..CAS_RETRIES {
        let updated = sqlx::query_as::<_, DbAppointment>(
            r#"
            UPDATE appointments
            SET current_slots = array_remove(current_slots, $2),
                status = 'OPEN',
                version = version + 1
            WHERE id = $1
              AND status <> 'CLOSED'
              AND current_slots @> ARRAY[$2]
              AND start_time > $3
            RETURNING id, tutor_id, name, place, start_time, end_time, max_slot, current_slots, status, version, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(pool)
        .await
        .map_err(db_err)?;

        if let Some(row) = updated {
            return hydrate(pool, row).await;
        }

        let row = fetch_row(pool, id)
            .await?
            .ok_or_else(|| TutorError::NotFound(format!("appointment {id} does not exist")))?;
        let mut apt = row.into_appointment(None, Vec::new())?;
        match engine::apply_cancel_booking(&mut apt, user_id, now) {
            Ok(()) => continue,
            Err(err) => return Err(err),
        }
    }

    tracing::warn!("Cancel retries exhausted for appointment {}", id);
    Err(TutorError::Database(eyre::eyre!(
        "compare-and-swap retries exhausted for appointment {id}"
    )))
}

/// Tutor cancellation: the appointment is closed for all occupants.
/// Idempotent; closing an already closed appointment is a no-op.
pub async fn close_appointment(pool: &Pool<Postgres>, id: Uuid) -> TutorResult<Appointment> {
    tracing::debug!("Closing appointment {}", id);

    let row = sqlx::query_as::<_, DbAppointment>(
        r#"
        UPDATE appointments
        SET status = 'CLOSED',
            version = version + 1
        WHERE id = $1
        RETURNING id, tutor_id, name, place, start_time, end_time, max_slot, current_slots, status, version, created_at
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(db_err)?
    .ok_or_else(|| TutorError::NotFound(format!("appointment {id} does not exist")))?;

    hydrate(pool, row).await
}

/// Atomic reschedule: both occupant sets change in one transaction, or
/// neither does. Rows are locked in id order so two concurrent moves
/// cannot deadlock.
pub async fn move_occupant(
    pool: &Pool<Postgres>,
    from: Uuid,
    to: Uuid,
    user_id: &str,
    now: DateTime<Utc>,
) -> TutorResult<Appointment> {
    if from == to {
        return Err(TutorError::Validation(
            "cannot reschedule into the same appointment".into(),
        ));
    }

    tracing::debug!("Moving user {} from {} to {}", user_id, from, to);

    let mut tx = pool.begin().await.map_err(db_err)?;

    let (first_id, second_id) = if from < to { (from, to) } else { (to, from) };
    let first = lock_row(&mut tx, first_id).await?;
    let second = lock_row(&mut tx, second_id).await?;
    let (from_row, to_row) = if first.id == from {
        (first, second)
    } else {
        (second, first)
    };

    let mut from_apt = from_row.into_appointment(None, Vec::new())?;
    let mut to_apt = to_row.into_appointment(None, Vec::new())?;

    // Either transition failing aborts the transaction before any write.
    engine::apply_cancel_booking(&mut from_apt, user_id, now)?;
    engine::apply_book(&mut to_apt, user_id)?;

    for apt in [&from_apt, &to_apt] {
        sqlx::query(
            "UPDATE appointments SET current_slots = $2, status = $3, version = version + 1 WHERE id = $1",
        )
        .bind(apt.id)
        .bind(&apt.current_slots)
        .bind(status_str(apt.status))
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
    }

    tx.commit().await.map_err(db_err)?;

    get_appointment(pool, to)
        .await?
        .ok_or_else(|| TutorError::NotFound(format!("appointment {to} does not exist")))
}

async fn lock_row(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    id: Uuid,
) -> TutorResult<DbAppointment> {
    sqlx::query_as::<_, DbAppointment>(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(db_err)?
    .ok_or_else(|| TutorError::NotFound(format!("appointment {id} does not exist")))
}

pub(crate) async fn fetch_row(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> TutorResult<Option<DbAppointment>> {
    sqlx::query_as::<_, DbAppointment>(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(db_err)
}

pub(crate) async fn hydrate(
    pool: &Pool<Postgres>,
    row: DbAppointment,
) -> TutorResult<Appointment> {
    let report = sqlx::query_as::<_, DbSessionReport>(
        "SELECT appointment_id, present, capacity, notes, created_at FROM session_reports WHERE appointment_id = $1",
    )
    .bind(row.id)
    .fetch_optional(pool)
    .await
    .map_err(db_err)?;

    let feedback = sqlx::query_as::<_, DbFeedback>(
        "SELECT appointment_id, student_id, rating, comment, created_at FROM feedback WHERE appointment_id = $1 ORDER BY created_at ASC",
    )
    .bind(row.id)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    row.into_appointment(report, feedback)
}
