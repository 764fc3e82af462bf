//! # Appointment Booking Engine
//!
//! The rules that keep appointment slots consistent: capacity is never
//! exceeded, an occupant appears at most once, and status follows
//! occupancy. All occupancy changes are expressed as pure transitions on
//! an [`Appointment`](crate::models::appointment::Appointment) snapshot;
//! store implementations apply them under per-appointment
//! compare-and-swap, which is the sole serialization point. The engine
//! itself holds no shared mutable state.

mod reschedule;
mod store;
mod transitions;

pub use reschedule::reschedule;
pub use store::AppointmentStore;
pub use transitions::{
    apply_book, apply_cancel_booking, apply_close, check_student_overlap, check_tutor_overlap,
    prepare_appointment, recompute_status, reschedule_candidates, validate_feedback,
    validate_free_schedule, validate_report,
};
