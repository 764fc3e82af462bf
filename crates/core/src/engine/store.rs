use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::TutorResult;
use crate::models::appointment::{Appointment, FeedbackEntry, SessionReport};
use crate::models::free_schedule::FreeSchedule;
use crate::models::session::Session;

/// Contract the booking engine requires from an appointment store.
///
/// Every occupancy mutation (`book`, `cancel_booking`, `close_appointment`,
/// `move_occupant`) must be atomic per appointment id: read the current
/// state, apply the transition, and fail — never partially apply — if the
/// record changed since it was read. Implementations report failures using
/// the domain taxonomy so callers can tell a lost race (`Full`) from a
/// stale reference (`NotFound`).
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn create_appointment(&self, apt: Appointment) -> TutorResult<Appointment>;

    async fn get_appointment(&self, id: Uuid) -> TutorResult<Option<Appointment>>;

    /// List appointments, optionally filtered by owning tutor. Filtering
    /// is part of the store contract; clients never rely on list-then-filter.
    async fn list_appointments(&self, tutor_id: Option<&str>) -> TutorResult<Vec<Appointment>>;

    async fn book(&self, id: Uuid, user_id: &str) -> TutorResult<Appointment>;

    async fn cancel_booking(&self, id: Uuid, user_id: &str) -> TutorResult<Appointment>;

    /// Tutor cancellation: the appointment becomes `Closed` for everyone.
    async fn close_appointment(&self, id: Uuid) -> TutorResult<Appointment>;

    /// Atomic cancel-in-`from` + book-in-`to`. When either precondition
    /// fails, neither appointment is mutated. This is the strengthened
    /// alternative to [`reschedule`](crate::engine::reschedule); returns
    /// the updated destination appointment.
    async fn move_occupant(&self, from: Uuid, to: Uuid, user_id: &str)
        -> TutorResult<Appointment>;

    /// Attach (or replace) the post-session attendance report.
    async fn attach_report(&self, id: Uuid, report: SessionReport) -> TutorResult<Appointment>;

    /// Append one occupant's feedback; a second entry from the same
    /// author is rejected with `AlreadySubmitted`.
    async fn submit_feedback(&self, id: Uuid, entry: FeedbackEntry) -> TutorResult<FeedbackEntry>;

    /// The saved grid for `(tutor, week)`, or an empty grid when the week
    /// has never been saved.
    async fn get_free_schedule(&self, tutor_id: &str, week: i32) -> TutorResult<FreeSchedule>;

    /// Wholesale replace of the cell set and note for one week.
    async fn replace_free_schedule(&self, schedule: FreeSchedule) -> TutorResult<()>;

    /// Resolve a bearer token to the acting session. Token issuance lives
    /// in the external identity service; this is only the lookup.
    async fn resolve_session(&self, token: &str) -> TutorResult<Option<Session>>;
}
