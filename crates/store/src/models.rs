use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tutorsync_core::errors::{TutorError, TutorResult};
use tutorsync_core::models::appointment::{
    Appointment, AppointmentStatus, FeedbackEntry, SessionReport,
};
use tutorsync_core::models::session::{Role, Session};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub tutor_id: String,
    pub name: String,
    pub place: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_slot: i32,
    pub current_slots: Vec<String>,
    pub status: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl DbAppointment {
    /// Assemble the domain appointment from its row plus the attached
    /// report and feedback rows.
    pub fn into_appointment(
        self,
        report: Option<DbSessionReport>,
        feedback: Vec<DbFeedback>,
    ) -> TutorResult<Appointment> {
        Ok(Appointment {
            id: self.id,
            tutor_id: self.tutor_id,
            name: self.name,
            place: self.place,
            start_time: self.start_time,
            end_time: self.end_time,
            max_slot: self.max_slot as u32,
            current_slots: self.current_slots,
            status: parse_status(&self.status)?,
            report: report.map(DbSessionReport::into_report),
            feedback: feedback.into_iter().map(DbFeedback::into_entry).collect(),
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSessionReport {
    pub appointment_id: Uuid,
    pub present: i32,
    pub capacity: i32,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl DbSessionReport {
    pub fn into_report(self) -> SessionReport {
        SessionReport {
            present: self.present as u32,
            capacity: self.capacity as u32,
            notes: self.notes,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbFeedback {
    pub appointment_id: Uuid,
    pub student_id: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl DbFeedback {
    pub fn into_entry(self) -> FeedbackEntry {
        FeedbackEntry {
            student_id: self.student_id,
            rating: self.rating as u8,
            comment: self.comment,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbFreeScheduleCell {
    pub tutor_id: String,
    pub week: i32,
    pub day: i16,
    pub period: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSession {
    pub token: String,
    pub user_id: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl DbSession {
    pub fn into_session(self) -> TutorResult<Session> {
        let role = match self.role.as_str() {
            "STUDENT" => Role::Student,
            "TUTOR" => Role::Tutor,
            "ADMIN" => Role::Admin,
            other => {
                return Err(TutorError::Internal(
                    format!("unknown role in sessions table: {other}").into(),
                ))
            }
        };
        Ok(Session {
            user_id: self.user_id,
            role,
        })
    }
}

pub fn parse_status(raw: &str) -> TutorResult<AppointmentStatus> {
    match raw {
        "OPEN" => Ok(AppointmentStatus::Open),
        "FULL" => Ok(AppointmentStatus::Full),
        "CLOSED" => Ok(AppointmentStatus::Closed),
        other => Err(TutorError::Internal(
            format!("unknown appointment status in store: {other}").into(),
        )),
    }
}

pub fn status_str(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Open => "OPEN",
        AppointmentStatus::Full => "FULL",
        AppointmentStatus::Closed => "CLOSED",
    }
}
