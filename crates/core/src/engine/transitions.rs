use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::{TutorError, TutorResult};
use crate::models::appointment::{
    Appointment, AppointmentStatus, CreateAppointmentRequest, FeedbackEntry,
};
use crate::models::free_schedule::{FreeCell, GRID_DAYS, GRID_PERIODS};

/// Validate a creation request and build the new appointment value.
/// The caller persists it; nothing is mutated here.
pub fn prepare_appointment(
    tutor_id: &str,
    req: &CreateAppointmentRequest,
) -> TutorResult<Appointment> {
    if req.name.trim().is_empty() {
        return Err(TutorError::Validation("name must not be empty".into()));
    }
    if req.place.trim().is_empty() {
        return Err(TutorError::Validation("place must not be empty".into()));
    }
    if req.start_time >= req.end_time {
        return Err(TutorError::Validation(
            "end time must be after start time".into(),
        ));
    }
    if req.max_slot == 0 {
        return Err(TutorError::Validation(
            "max_slot must be greater than zero".into(),
        ));
    }

    Ok(Appointment {
        id: Uuid::new_v4(),
        tutor_id: tutor_id.to_string(),
        name: req.name.clone(),
        place: req.place.clone(),
        start_time: req.start_time,
        end_time: req.end_time,
        max_slot: req.max_slot,
        current_slots: Vec::new(),
        status: AppointmentStatus::Open,
        report: None,
        feedback: Vec::new(),
        created_at: Utc::now(),
    })
}

/// A tutor cannot hold two sessions at once: reject a candidate that
/// overlaps any of the tutor's other non-closed appointments.
pub fn check_tutor_overlap(candidate: &Appointment, existing: &[Appointment]) -> TutorResult<()> {
    for other in existing {
        if other.id == candidate.id || other.status == AppointmentStatus::Closed {
            continue;
        }
        if other.tutor_id == candidate.tutor_id && candidate.overlaps(other) {
            return Err(TutorError::Overlap(format!(
                "overlaps existing session '{}'",
                other.name
            )));
        }
    }
    Ok(())
}

/// A student cannot occupy two sessions at once: reject a booking that
/// overlaps another non-closed appointment the user already occupies.
pub fn check_student_overlap(
    candidate: &Appointment,
    user_id: &str,
    booked: &[Appointment],
) -> TutorResult<()> {
    for other in booked {
        if other.id == candidate.id || other.status == AppointmentStatus::Closed {
            continue;
        }
        if other.is_occupant(user_id) && candidate.overlaps(other) {
            return Err(TutorError::Overlap(format!(
                "overlaps your booking in '{}'",
                other.name
            )));
        }
    }
    Ok(())
}

/// Recompute the derived status after an occupancy change. `Closed` is
/// sticky; otherwise the appointment is `Full` exactly at capacity.
pub fn recompute_status(apt: &mut Appointment) {
    if apt.status == AppointmentStatus::Closed {
        return;
    }
    apt.status = if apt.is_full() {
        AppointmentStatus::Full
    } else {
        AppointmentStatus::Open
    };
}

/// Add `user_id` to the occupant set.
///
/// Precondition order matters for the error surface: a closed
/// appointment reads as gone, a repeat booking is reported before a
/// capacity miss.
pub fn apply_book(apt: &mut Appointment, user_id: &str) -> TutorResult<()> {
    if apt.status == AppointmentStatus::Closed {
        return Err(TutorError::NotFound(format!(
            "appointment {} has been cancelled",
            apt.id
        )));
    }
    if apt.is_occupant(user_id) {
        return Err(TutorError::AlreadyBooked(format!(
            "user {user_id} already holds a slot"
        )));
    }
    if apt.is_full() {
        return Err(TutorError::Full(format!(
            "all {} slots are taken",
            apt.max_slot
        )));
    }
    apt.current_slots.push(user_id.to_string());
    recompute_status(apt);
    Ok(())
}

/// Remove `user_id` from the occupant set (student self-cancel).
/// Not allowed once the session has started.
pub fn apply_cancel_booking(
    apt: &mut Appointment,
    user_id: &str,
    now: DateTime<Utc>,
) -> TutorResult<()> {
    if apt.status == AppointmentStatus::Closed {
        return Err(TutorError::NotFound(format!(
            "appointment {} has been cancelled",
            apt.id
        )));
    }
    if !apt.is_occupant(user_id) {
        return Err(TutorError::NotBooked(format!(
            "user {user_id} holds no slot here"
        )));
    }
    if now >= apt.start_time {
        return Err(TutorError::Validation(
            "cannot cancel after the session has started".into(),
        ));
    }
    apt.current_slots.retain(|id| id != user_id);
    recompute_status(apt);
    Ok(())
}

/// Tutor cancellation: mark the appointment closed for everyone.
/// Idempotent; occupants are kept for history and feedback eligibility.
pub fn apply_close(apt: &mut Appointment) {
    apt.status = AppointmentStatus::Closed;
}

/// Slots a student can switch into from `current`: open, not the slot
/// being left, and not already occupied by the user. Callers list by the
/// current appointment's tutor first; same-tutor is a listing
/// convenience, not a rule enforced here.
pub fn reschedule_candidates<'a>(
    all: &'a [Appointment],
    current: &Appointment,
    user_id: &str,
) -> Vec<&'a Appointment> {
    all.iter()
        .filter(|apt| {
            apt.status == AppointmentStatus::Open
                && apt.id != current.id
                && !apt.is_occupant(user_id)
        })
        .collect()
}

/// Feedback preconditions: the author occupies a slot, the rating is in
/// range, and no entry from the author exists yet (enforce-unique).
pub fn validate_feedback(apt: &Appointment, entry: &FeedbackEntry) -> TutorResult<()> {
    if !apt.is_occupant(&entry.student_id) {
        return Err(TutorError::NotBooked(
            "only occupants can rate this session".into(),
        ));
    }
    if !(1..=5).contains(&entry.rating) {
        return Err(TutorError::Validation(
            "rating must be between 1 and 5".into(),
        ));
    }
    if apt
        .feedback
        .iter()
        .any(|f| f.student_id == entry.student_id)
    {
        return Err(TutorError::AlreadySubmitted(format!(
            "user {} already rated this session",
            entry.student_id
        )));
    }
    Ok(())
}

/// An attendance report cannot claim more present students than the
/// appointment had capacity for.
pub fn validate_report(apt: &Appointment, present: u32) -> TutorResult<()> {
    if present > apt.max_slot {
        return Err(TutorError::Validation(format!(
            "present count {present} exceeds capacity {}",
            apt.max_slot
        )));
    }
    Ok(())
}

/// Every saved cell must fall inside the weekly grid.
pub fn validate_free_schedule(cells: &[FreeCell]) -> TutorResult<()> {
    for cell in cells {
        if !cell.in_grid() {
            return Err(TutorError::Validation(format!(
                "cell ({}, {}) outside the {GRID_DAYS}x{GRID_PERIODS} grid",
                cell.day, cell.period
            )));
        }
    }
    Ok(())
}
