use uuid::Uuid;

use crate::errors::{TutorError, TutorResult};
use crate::models::appointment::Appointment;

use super::store::AppointmentStore;

/// Move a student from appointment `from` to appointment `to`.
///
/// This is the two-step protocol: cancel the old booking, then book the
/// new one. The two calls are issued strictly in order, and there is no
/// rollback of step 1 — if the second booking loses a race (the slot
/// filled, or the tutor cancelled it), the user is left in neither
/// appointment. That partial-failure state is surfaced as
/// [`TutorError::RescheduleBookFailed`] carrying the vacated id, so the
/// caller can send the user back to slot selection rather than imply
/// nothing happened.
///
/// Callers that need the all-or-nothing guarantee should use
/// [`AppointmentStore::move_occupant`] instead, which holds both
/// precondition checks in one transaction.
pub async fn reschedule<S>(
    store: &S,
    from: Uuid,
    to: Uuid,
    user_id: &str,
) -> TutorResult<Appointment>
where
    S: AppointmentStore + ?Sized,
{
    if from == to {
        return Err(TutorError::Validation(
            "cannot reschedule into the same appointment".into(),
        ));
    }

    store.cancel_booking(from, user_id).await?;

    match store.book(to, user_id).await {
        Ok(apt) => Ok(apt),
        Err(source) => {
            tracing::warn!(
                vacated = %from,
                target = %to,
                user = user_id,
                "reschedule lost step 2, old slot already released"
            );
            Err(TutorError::RescheduleBookFailed {
                vacated: from,
                source: Box::new(source),
            })
        }
    }
}
