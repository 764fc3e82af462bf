use async_trait::async_trait;
use chrono::Utc;
use tutorsync_core::engine::AppointmentStore;
use tutorsync_core::errors::TutorResult;
use tutorsync_core::models::appointment::{Appointment, FeedbackEntry, SessionReport};
use tutorsync_core::models::free_schedule::FreeSchedule;
use tutorsync_core::models::session::Session;
use uuid::Uuid;

use crate::repositories::{appointment, feedback, free_schedule, session};
use crate::DbPool;

/// Production store backed by PostgreSQL. A thin shell over the
/// repository functions; all concurrency control lives in their guarded
/// statements.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl AppointmentStore for PgStore {
    async fn create_appointment(&self, apt: Appointment) -> TutorResult<Appointment> {
        appointment::create_appointment(&self.pool, &apt).await
    }

    async fn get_appointment(&self, id: Uuid) -> TutorResult<Option<Appointment>> {
        appointment::get_appointment(&self.pool, id).await
    }

    async fn list_appointments(&self, tutor_id: Option<&str>) -> TutorResult<Vec<Appointment>> {
        appointment::list_appointments(&self.pool, tutor_id).await
    }

    async fn book(&self, id: Uuid, user_id: &str) -> TutorResult<Appointment> {
        appointment::book(&self.pool, id, user_id).await
    }

    async fn cancel_booking(&self, id: Uuid, user_id: &str) -> TutorResult<Appointment> {
        appointment::cancel_booking(&self.pool, id, user_id, Utc::now()).await
    }

    async fn close_appointment(&self, id: Uuid) -> TutorResult<Appointment> {
        appointment::close_appointment(&self.pool, id).await
    }

    async fn move_occupant(
        &self,
        from: Uuid,
        to: Uuid,
        user_id: &str,
    ) -> TutorResult<Appointment> {
        appointment::move_occupant(&self.pool, from, to, user_id, Utc::now()).await
    }

    async fn attach_report(&self, id: Uuid, report: SessionReport) -> TutorResult<Appointment> {
        feedback::attach_report(&self.pool, id, &report).await
    }

    async fn submit_feedback(&self, id: Uuid, entry: FeedbackEntry) -> TutorResult<FeedbackEntry> {
        feedback::submit_feedback(&self.pool, id, &entry).await
    }

    async fn get_free_schedule(&self, tutor_id: &str, week: i32) -> TutorResult<FreeSchedule> {
        free_schedule::get_free_schedule(&self.pool, tutor_id, week).await
    }

    async fn replace_free_schedule(&self, schedule: FreeSchedule) -> TutorResult<()> {
        free_schedule::replace_free_schedule(&self.pool, &schedule).await
    }

    async fn resolve_session(&self, token: &str) -> TutorResult<Option<Session>> {
        session::resolve_session(&self.pool, token).await
    }
}
