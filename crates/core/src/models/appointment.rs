use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of an appointment slot.
///
/// `Closed` is sticky: a tutor cancellation invalidates the appointment
/// for all occupants. `Open` and `Full` are derived from occupancy and
/// recomputed after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Open,
    Full,
    Closed,
}

/// A tutoring session slot with bounded capacity.
///
/// Occupant ids are opaque strings issued by the external identity
/// provider; appointment ids are generated here. `current_slots` never
/// contains duplicates and never exceeds `max_slot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub tutor_id: String,
    pub name: String,
    pub place: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_slot: u32,
    pub current_slots: Vec<String>,
    pub status: AppointmentStatus,
    pub report: Option<SessionReport>,
    #[serde(default)]
    pub feedback: Vec<FeedbackEntry>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn is_occupant(&self, user_id: &str) -> bool {
        self.current_slots.iter().any(|id| id == user_id)
    }

    pub fn is_full(&self) -> bool {
        self.current_slots.len() as u32 >= self.max_slot
    }

    /// Half-open interval overlap test: `[start, end)` ranges touch iff
    /// each starts before the other ends.
    pub fn overlaps(&self, other: &Appointment) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }
}

/// Attendance record a tutor attaches after the session took place.
/// `capacity` snapshots `max_slot` at attachment time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub present: u32,
    pub capacity: u32,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// One occupant's rating of a session, at most one per occupant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub student_id: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub name: String,
    pub place: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_slot: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRequest {
    /// Appointment to move into; the caller's booking in the path
    /// appointment is released first.
    pub to_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachReportRequest {
    pub present: u32,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentResponse {
    pub id: Uuid,
    pub tutor_id: String,
    pub name: String,
    pub place: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_slot: u32,
    pub current_slots: Vec<String>,
    pub status: AppointmentStatus,
    pub report: Option<SessionReport>,
    pub feedback: Vec<FeedbackEntry>,
}

impl From<Appointment> for AppointmentResponse {
    fn from(apt: Appointment) -> Self {
        Self {
            id: apt.id,
            tutor_id: apt.tutor_id,
            name: apt.name,
            place: apt.place,
            start_time: apt.start_time,
            end_time: apt.end_time,
            max_slot: apt.max_slot,
            current_slots: apt.current_slots,
            status: apt.status,
            report: apt.report,
            feedback: apt.feedback,
        }
    }
}
