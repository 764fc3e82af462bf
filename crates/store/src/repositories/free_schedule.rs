use sqlx::{Pool, Postgres};
use tutorsync_core::errors::TutorResult;
use tutorsync_core::models::free_schedule::{FreeCell, FreeSchedule};

use crate::models::DbFreeScheduleCell;

use super::db_err;

pub async fn get_free_schedule(
    pool: &Pool<Postgres>,
    tutor_id: &str,
    week: i32,
) -> TutorResult<FreeSchedule> {
    tracing::debug!("Loading free schedule for tutor {} week {}", tutor_id, week);

    let note: Option<(String, chrono::DateTime<chrono::Utc>)> = sqlx::query_as(
        "SELECT note, updated_at FROM free_schedules WHERE tutor_id = $1 AND week = $2",
    )
    .bind(tutor_id)
    .bind(week)
    .fetch_optional(pool)
    .await
    .map_err(db_err)?;

    let Some((note, updated_at)) = note else {
        return Ok(FreeSchedule::empty(tutor_id, week));
    };

    let cells = sqlx::query_as::<_, DbFreeScheduleCell>(
        r#"
        SELECT tutor_id, week, day, period
        FROM free_schedule_cells
        WHERE tutor_id = $1 AND week = $2
        ORDER BY day ASC, period ASC
        "#,
    )
    .bind(tutor_id)
    .bind(week)
    .fetch_all(pool)
    .await
    .map_err(db_err)?
    .into_iter()
    .map(|cell| FreeCell {
        day: cell.day as u8,
        period: cell.period as u8,
    })
    .collect();

    Ok(FreeSchedule {
        tutor_id: tutor_id.to_string(),
        week,
        cells,
        note,
        updated_at,
    })
}

/// Wholesale replace for one `(tutor, week)`: the note row is upserted,
/// existing cells are deleted, and the new set is inserted, all in one
/// transaction.
pub async fn replace_free_schedule(
    pool: &Pool<Postgres>,
    schedule: &FreeSchedule,
) -> TutorResult<()> {
    tracing::debug!(
        "Replacing free schedule for tutor {} week {} ({} cells)",
        schedule.tutor_id,
        schedule.week,
        schedule.cells.len()
    );

    let mut tx = pool.begin().await.map_err(db_err)?;

    sqlx::query(
        r#"
        INSERT INTO free_schedules (tutor_id, week, note, updated_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (tutor_id, week) DO UPDATE
        SET note = EXCLUDED.note, updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(&schedule.tutor_id)
    .bind(schedule.week)
    .bind(&schedule.note)
    .bind(schedule.updated_at)
    .execute(&mut *tx)
    .await
    .map_err(db_err)?;

    sqlx::query("DELETE FROM free_schedule_cells WHERE tutor_id = $1 AND week = $2")
        .bind(&schedule.tutor_id)
        .bind(schedule.week)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

    for cell in &schedule.cells {
        sqlx::query(
            "INSERT INTO free_schedule_cells (tutor_id, week, day, period) VALUES ($1, $2, $3, $4)",
        )
        .bind(&schedule.tutor_id)
        .bind(schedule.week)
        .bind(cell.day as i16)
        .bind(cell.period as i16)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
    }

    tx.commit().await.map_err(db_err)?;
    Ok(())
}
