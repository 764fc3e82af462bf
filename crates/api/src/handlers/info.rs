//! Read-side listings for staff plus post-session attachments. The
//! feedback endpoint lives under `/info` because it is consumed by the
//! reporting pages, not the booking flow.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tutorsync_core::{
    engine,
    errors::TutorError,
    models::appointment::{
        AppointmentResponse, AttachReportRequest, FeedbackEntry, SessionReport,
        SubmitFeedbackRequest,
    },
    models::session::Role,
};
use uuid::Uuid;

use crate::{
    middleware::{auth, error_handling::AppError},
    ApiState,
};

/// Full listing for administrators.
#[axum::debug_handler]
pub async fn list_all_appointments(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    let session = auth::authenticate(&state, &headers).await?;
    auth::require_role(&session, Role::Admin)?;

    let appointments = state.store.list_appointments(None).await?;
    Ok(Json(appointments.into_iter().map(Into::into).collect()))
}

/// Appointments the calling user currently occupies.
#[axum::debug_handler]
pub async fn my_appointments(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    let session = auth::authenticate(&state, &headers).await?;

    let appointments = state.store.list_appointments(None).await?;
    let mine = appointments
        .into_iter()
        .filter(|apt| apt.is_occupant(&session.user_id))
        .map(Into::into)
        .collect();
    Ok(Json(mine))
}

#[axum::debug_handler]
pub async fn submit_feedback(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackEntry>), AppError> {
    let session = auth::authenticate(&state, &headers).await?;
    auth::require_role(&session, Role::Student)?;

    let entry = FeedbackEntry {
        student_id: session.user_id,
        rating: payload.rating,
        comment: payload.comment,
        created_at: Utc::now(),
    };
    let stored = state.store.submit_feedback(id, entry).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Attach the attendance report after the session took place. Owner-only;
/// re-attaching replaces the previous report.
#[axum::debug_handler]
pub async fn attach_report(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachReportRequest>,
) -> Result<Json<AppointmentResponse>, AppError> {
    let session = auth::authenticate(&state, &headers).await?;
    auth::require_role(&session, Role::Tutor)?;

    let apt = state
        .store
        .get_appointment(id)
        .await?
        .ok_or_else(|| TutorError::NotFound(format!("appointment {id} does not exist")))?;
    if session.role != Role::Admin && apt.tutor_id != session.user_id {
        return Err(AppError(TutorError::Authorization(
            "only the owning tutor can report on this session".into(),
        )));
    }
    engine::validate_report(&apt, payload.present)?;

    let report = SessionReport {
        present: payload.present,
        capacity: apt.max_slot,
        notes: payload.notes,
        created_at: Utc::now(),
    };
    let updated = state.store.attach_report(id, report).await?;
    Ok(Json(updated.into()))
}
