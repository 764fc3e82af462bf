use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create appointments table. Occupants live in a TEXT[] column so the
    // guarded UPDATEs in the repository can check membership and capacity
    // in the same statement that mutates them.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id UUID PRIMARY KEY,
            tutor_id VARCHAR(255) NOT NULL,
            name VARCHAR(255) NOT NULL,
            place VARCHAR(255) NOT NULL,
            start_time TIMESTAMP WITH TIME ZONE NOT NULL,
            end_time TIMESTAMP WITH TIME ZONE NOT NULL,
            max_slot INTEGER NOT NULL CHECK (max_slot > 0),
            current_slots TEXT[] NOT NULL DEFAULT '{}',
            status VARCHAR(16) NOT NULL DEFAULT 'OPEN',
            version BIGINT NOT NULL DEFAULT 0,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_time_range CHECK (end_time > start_time),
            CONSTRAINT within_capacity CHECK (cardinality(current_slots) <= max_slot)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create session_reports table (one report per appointment)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS session_reports (
            appointment_id UUID PRIMARY KEY REFERENCES appointments(id) ON DELETE CASCADE,
            present INTEGER NOT NULL,
            capacity INTEGER NOT NULL,
            notes TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create feedback table; the primary key enforces one entry per
    // occupant per appointment.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feedback (
            appointment_id UUID NOT NULL REFERENCES appointments(id) ON DELETE CASCADE,
            student_id VARCHAR(255) NOT NULL,
            rating SMALLINT NOT NULL CHECK (rating BETWEEN 1 AND 5),
            comment TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            PRIMARY KEY (appointment_id, student_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create free_schedules table (per-week note)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS free_schedules (
            tutor_id VARCHAR(255) NOT NULL,
            week INTEGER NOT NULL,
            note TEXT NOT NULL DEFAULT '',
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            PRIMARY KEY (tutor_id, week)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create free_schedule_cells table (selected = free)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS free_schedule_cells (
            tutor_id VARCHAR(255) NOT NULL,
            week INTEGER NOT NULL,
            day SMALLINT NOT NULL CHECK (day BETWEEN 0 AND 6),
            period SMALLINT NOT NULL CHECK (period BETWEEN 1 AND 15),
            PRIMARY KEY (tutor_id, week, day, period)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create sessions table; rows are written by the external SSO
    // integration, this service only reads them.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token VARCHAR(255) PRIMARY KEY,
            user_id VARCHAR(255) NOT NULL,
            role VARCHAR(32) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_appointments_tutor_id ON appointments(tutor_id);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_appointments_start_time ON appointments(start_time);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized");
    Ok(())
}
